//! Markdown rendering for the block model.

use crate::error::Result;
use crate::model::{Block, Document, Frontmatter, ListBlock, Table};

use super::{CleanupPipeline, ExtractionStats, OrderedListNumbering, RenderOptions, RenderResult};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    let mut options = options.clone();
    options.collect_stats = true;
    let renderer = MarkdownRenderer::new(options);
    renderer.render_with_stats(doc)
}

/// Run only the post-processors over an already-Markdown body and prepend
/// the frontmatter.
pub fn finish_markdown(
    frontmatter: Option<&Frontmatter>,
    body: &str,
    options: &RenderOptions,
) -> Result<String> {
    let pipeline = CleanupPipeline::new(options.cleanup.clone())?;
    let cleaned = pipeline.process(body);

    match frontmatter {
        Some(fm) if options.include_frontmatter => {
            let mut output = fm.to_yaml_block()?;
            output.push_str(&cleaned);
            Ok(output)
        }
        _ => Ok(cleaned),
    }
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        self.render_internal(doc)
    }

    /// Render a document to Markdown with extraction statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> Result<RenderResult> {
        self.options.collect_stats = true;
        let content = self.render_internal(doc)?;

        self.stats.count_text(&content);

        Ok(RenderResult::new(content, doc.frontmatter.clone(), self.stats))
    }

    fn render_internal(&mut self, doc: &Document) -> Result<String> {
        let mut body = String::new();
        for block in &doc.blocks {
            self.render_block(&mut body, block);
        }

        // Frontmatter goes on after cleanup so patterns never touch it.
        finish_markdown(doc.frontmatter.as_ref(), &body, &self.options)
    }

    fn render_block(&mut self, output: &mut String, block: &Block) {
        match block {
            Block::Heading { level, text } => {
                if self.options.collect_stats {
                    self.stats.add_heading();
                }
                output.push_str(&"#".repeat((*level).clamp(1, 6) as usize));
                output.push(' ');
                output.push_str(text);
                output.push_str("\n\n");
            }
            Block::Paragraph { text } => {
                if self.options.collect_stats {
                    self.stats.add_paragraph();
                }
                output.push_str(text);
                output.push_str("\n\n");
            }
            Block::CodeBlock { language, body } => {
                if self.options.collect_stats {
                    self.stats.add_code_block();
                }
                output.push_str("```");
                output.push_str(language.as_deref().unwrap_or(""));
                output.push('\n');
                output.push_str(body);
                output.push_str("\n```\n\n");
            }
            Block::List(list) => {
                if self.options.collect_stats {
                    self.stats.add_list(list.item_count());
                }
                self.render_list(output, list);
                output.push('\n');
            }
            Block::Table(table) => {
                if self.options.collect_stats {
                    self.stats.add_table();
                }
                self.render_table(output, table);
            }
            Block::Blockquote { text } => {
                if self.options.collect_stats {
                    self.stats.add_blockquote();
                }
                let quoted: Vec<String> = text.split('\n').map(|l| format!("> {}", l)).collect();
                output.push_str(&quoted.join("\n"));
                output.push_str("\n\n");
            }
            Block::Rule => {
                if self.options.collect_stats {
                    self.stats.add_horizontal_rule();
                }
                output.push_str("---\n\n");
            }
        }
    }

    fn render_list(&self, output: &mut String, list: &ListBlock) {
        write_list(output, list, self.options.ordered_numbering, 0);
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        if table.headers.is_empty() {
            return;
        }
        if table.is_ragged() {
            log::debug!(
                "Table with {} columns has rows of other widths; rows kept as found",
                table.column_count()
            );
        }
        write_table(output, table);
        output.push('\n');
    }
}

/// Write list items, one per line, nested lists indented by two spaces.
pub(crate) fn write_list(
    output: &mut String,
    list: &ListBlock,
    numbering: OrderedListNumbering,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    for (i, item) in list.items.iter().enumerate() {
        output.push_str(&indent);
        if list.ordered {
            match numbering {
                OrderedListNumbering::Literal => output.push_str("1."),
                OrderedListNumbering::Sequential => output.push_str(&format!("{}.", i + 1)),
            }
        } else {
            output.push('-');
        }
        output.push(' ');
        output.push_str(&item.text);
        output.push('\n');

        if let Some(nested) = &item.nested {
            write_list(output, nested, numbering, depth + 1);
        }
    }
}

/// Write a pipe table. Rows keep their own cell count; the separator
/// follows the header.
pub(crate) fn write_table(output: &mut String, table: &Table) {
    if table.headers.is_empty() {
        return;
    }
    write_table_row(output, &table.headers);
    let separator = vec!["---".to_string(); table.column_count()];
    write_table_row(output, &separator);
    for row in &table.rows {
        write_table_row(output, row);
    }
}

fn write_table_row(output: &mut String, cells: &[String]) {
    output.push('|');
    for cell in cells {
        output.push(' ');
        output.push_str(&escape_cell(cell));
        output.push_str(" |");
    }
    output.push('\n');
}

/// Keep a cell on one line and stop it from closing the column early.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListItem;
    use serde_yaml::{Mapping, Value};

    fn render(blocks: Vec<Block>) -> String {
        to_markdown(&Document::from_blocks(blocks), &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_render_heading_and_paragraph() {
        let md = render(vec![Block::heading(1, "A"), Block::heading(2, "B"), Block::paragraph("text")]);
        assert_eq!(md, "# A\n\n## B\n\ntext\n\n");
    }

    #[test]
    fn test_render_code_block() {
        let md = render(vec![Block::code(Some("python".into()), "x=1")]);
        assert_eq!(md, "```python\nx=1\n```\n\n");

        let md = render(vec![Block::code(None, "plain")]);
        assert_eq!(md, "```\nplain\n```\n\n");
    }

    #[test]
    fn test_render_nested_list() {
        let mut inner = ListBlock::unordered();
        inner.push(ListItem::new("inner"));
        let mut list = ListBlock::unordered();
        list.push(ListItem::new("one").with_nested(inner));
        list.push(ListItem::new("two"));

        let md = render(vec![Block::List(list), Block::paragraph("after")]);
        assert_eq!(md, "- one\n  - inner\n- two\n\nafter\n\n");
    }

    #[test]
    fn test_ordered_list_numbering() {
        let mut list = ListBlock::ordered();
        list.push(ListItem::new("a"));
        list.push(ListItem::new("b"));
        let doc = Document::from_blocks(vec![Block::List(list)]);

        let literal = to_markdown(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(literal, "1. a\n1. b\n\n");

        let options = RenderOptions::new().with_ordered_numbering(OrderedListNumbering::Sequential);
        let sequential = to_markdown(&doc, &options).unwrap();
        assert_eq!(sequential, "1. a\n2. b\n\n");
    }

    #[test]
    fn test_render_table() {
        let mut table = Table::new(vec!["h1".to_string(), "h2".to_string()]);
        table.add_row(vec!["c1".to_string(), "c|2".to_string()]);
        let md = render(vec![Block::Table(table)]);
        assert_eq!(md, "| h1 | h2 |\n| --- | --- |\n| c1 | c\\|2 |\n\n");
    }

    #[test]
    fn test_render_ragged_table() {
        let mut table = Table::new(["a", "b"]);
        table.add_row(["1", "2", "3"]);
        table.add_row(["4"]);
        let md = render(vec![Block::Table(table)]);
        assert_eq!(md, "| a | b |\n| --- | --- |\n| 1 | 2 | 3 |\n| 4 |\n\n");
    }

    #[test]
    fn test_render_blockquote_and_rule() {
        let md = render(vec![Block::blockquote("a\nb"), Block::Rule]);
        assert_eq!(md, "> a\n> b\n\n---\n\n");
    }

    #[test]
    fn test_render_with_frontmatter() {
        let mut m = Mapping::new();
        m.insert(Value::from("title"), Value::from("X"));
        let doc = Document::from_blocks(vec![Block::paragraph("Body")])
            .with_frontmatter(Some(Frontmatter::new(m)));

        let md = to_markdown(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(md, "---\ntitle: X\n---\n\nBody\n\n");

        let md = to_markdown(&doc, &RenderOptions::new().with_frontmatter(false)).unwrap();
        assert_eq!(md, "Body\n\n");
    }

    #[test]
    fn test_cleanup_never_touches_frontmatter() {
        let mut m = Mapping::new();
        m.insert(Value::from("title"), Value::from("Feedback"));
        let doc = Document::from_blocks(vec![Block::paragraph("Feedback welcome")])
            .with_frontmatter(Some(Frontmatter::new(m)));
        let options = RenderOptions::new()
            .with_cleanup(crate::render::CleanupOptions::new().add_pattern("Feedback ?"));

        let md = to_markdown(&doc, &options).unwrap();
        assert_eq!(md, "---\ntitle: Feedback\n---\n\nwelcome\n\n");
    }

    #[test]
    fn test_render_with_stats() {
        let mut list = ListBlock::unordered();
        list.push(ListItem::new("x"));
        list.push(ListItem::new("y"));
        let doc = Document::from_blocks(vec![
            Block::heading(1, "T"),
            Block::paragraph("p"),
            Block::List(list),
            Block::code(None, "c"),
        ]);

        let result = to_markdown_with_stats(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result.stats.heading_count, 1);
        assert_eq!(result.stats.paragraph_count, 1);
        assert_eq!(result.stats.list_count, 1);
        assert_eq!(result.stats.list_item_count, 2);
        assert_eq!(result.stats.code_block_count, 1);
        assert!(result.stats.word_count > 0);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(vec![]), "");
    }
}
