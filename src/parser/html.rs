//! HTML structure walker.
//!
//! Walks a parsed DOM in document order and emits [`Block`]s. Inline
//! markup inside paragraphs, list items and table cells is rewritten to
//! Markdown on the fly; heading levels go through a [`HeadingLevelStack`].

use scraper::{ElementRef, Html, Node};

use super::heading::HeadingLevelStack;
use super::language::language_from_class;
use super::options::ParseOptions;
use crate::model::{Block, ListBlock, ListItem, Table};
use crate::render::{write_list, write_table, OrderedListNumbering};

/// Elements whose content never reaches the output.
const SKIPPED: &[&str] = &[
    "script", "style", "head", "noscript", "template", "iframe", "object", "svg",
];

/// Elements rendered as inline Markdown rather than walked as blocks.
const INLINE: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "font",
    "i", "img", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike",
    "strong", "sub", "sup", "time", "tt", "u", "var",
];

/// Parse an HTML document or fragment into blocks.
pub fn parse_html(html: &str, options: &ParseOptions) -> Vec<Block> {
    HtmlWalker::new(options).walk(html)
}

/// Single-use walker holding the state of one document.
pub struct HtmlWalker<'o> {
    options: &'o ParseOptions,
    headings: HeadingLevelStack,
    blocks: Vec<Block>,
    pending: String,
}

impl<'o> HtmlWalker<'o> {
    /// Create a walker with the given options.
    pub fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            headings: HeadingLevelStack::new(),
            blocks: Vec::new(),
            pending: String::new(),
        }
    }

    /// Parse `html` and return the blocks found in it.
    pub fn walk(mut self, html: &str) -> Vec<Block> {
        let dom = Html::parse_document(html);
        self.walk_children(dom.root_element());
        self.flush_paragraph();
        log::debug!("HTML walk produced {} blocks", self.blocks.len());
        self.blocks
    }

    fn walk_children(&mut self, el: ElementRef<'_>) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.pending.push_str(&text_node(text)),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.walk_element(child_el);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        if SKIPPED.contains(&name) {
            return;
        }
        if INLINE.contains(&name) {
            render_inline_element(el, &mut self.pending);
            return;
        }

        self.flush_paragraph();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let raw = name[1..].parse::<u8>().unwrap_or(1);
                let text = inline_text(el).replace('\n', " ");
                if !text.is_empty() {
                    let level = self.headings.adjust(raw);
                    self.blocks.push(Block::heading(level, text));
                }
            }
            "p" => {
                let text = escape_block_starts(&inline_text(el));
                if !text.is_empty() {
                    self.blocks.push(Block::paragraph(text));
                }
            }
            "pre" => {
                let body: String = el.text().collect();
                let body = body.trim_matches(|c| c == '\r' || c == '\n');
                if !body.is_empty() {
                    self.blocks.push(Block::code(self.code_language(el), body));
                }
            }
            "ul" | "ol" => {
                let list = parse_list(el);
                if !list.is_empty() {
                    self.blocks.push(Block::List(list));
                }
            }
            "table" => {
                if let Some(table) = parse_table(el) {
                    self.blocks.push(Block::Table(table));
                }
            }
            "blockquote" => {
                let text = self.quote_text(el);
                if !text.is_empty() {
                    self.blocks.push(Block::blockquote(text));
                }
            }
            "hr" => self.blocks.push(Block::Rule),
            _ => {
                self.walk_children(el);
                self.flush_paragraph();
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = escape_block_starts(&normalize_inline(&self.pending));
        self.pending.clear();
        if !text.is_empty() {
            self.blocks.push(Block::paragraph(text));
        }
    }

    fn code_language(&self, pre: ElementRef<'_>) -> Option<String> {
        let code = pre
            .children()
            .filter_map(ElementRef::wrap)
            .find(|c| c.value().name() == "code");

        [code, Some(pre)]
            .into_iter()
            .flatten()
            .find_map(|e| {
                e.value()
                    .attr("data-lang")
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .or_else(|| e.value().attr("class").and_then(language_from_class))
            })
            .map(|hint| self.options.languages.resolve(hint))
    }

    /// Quoted blocks as Markdown lines, without the `> ` prefix.
    fn quote_text(&self, el: ElementRef<'_>) -> String {
        let mut inner = HtmlWalker::new(self.options);
        inner.walk_children(el);
        inner.flush_paragraph();

        inner
            .blocks
            .iter()
            .map(quoted_markdown)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Markdown for a block nested in a quote.
///
/// The quote is stored as text, so ordered lists in it keep literal `1.`
/// markers, and rules use `***` so they cannot turn the line above into a
/// setext heading.
fn quoted_markdown(block: &Block) -> String {
    let mut out = String::new();
    match block {
        Block::Paragraph { text } | Block::Heading { text, .. } => out.push_str(text),
        Block::CodeBlock { language, body } => {
            out.push_str("```");
            out.push_str(language.as_deref().unwrap_or(""));
            out.push('\n');
            out.push_str(body);
            out.push_str("\n```");
        }
        Block::List(list) => write_list(&mut out, list, OrderedListNumbering::Literal, 0),
        Block::Table(table) => write_table(&mut out, table),
        Block::Blockquote { text } => {
            let nested: Vec<String> = text.split('\n').map(|l| format!("> {}", l)).collect();
            out.push_str(&nested.join("\n"));
        }
        Block::Rule => out.push_str("***"),
    }
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}

fn parse_list(el: ElementRef<'_>) -> ListBlock {
    let mut list = if el.value().name() == "ol" {
        ListBlock::ordered()
    } else {
        ListBlock::unordered()
    };

    for li in el
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "li")
    {
        let mut raw = String::new();
        let mut nested: Option<ListBlock> = None;

        for child in li.children() {
            match child.value() {
                Node::Text(text) => raw.push_str(&text_node(text)),
                Node::Element(_) => {
                    let Some(child_el) = ElementRef::wrap(child) else {
                        continue;
                    };
                    match child_el.value().name() {
                        "ul" | "ol" => {
                            let sub = parse_list(child_el);
                            match nested.as_mut() {
                                Some(existing) => existing.items.extend(sub.items),
                                None => nested = Some(sub),
                            }
                        }
                        "p" | "div" => {
                            raw.push(' ');
                            render_inline_children(child_el, &mut raw);
                            raw.push(' ');
                        }
                        _ => render_inline_element(child_el, &mut raw),
                    }
                }
                _ => {}
            }
        }

        let text = escape_block_starts(&normalize_inline(&raw));
        let nested = nested.filter(|n| !n.is_empty());
        if text.is_empty() && nested.is_none() {
            continue;
        }
        let mut item = ListItem::new(text);
        item.nested = nested;
        list.push(item);
    }

    list
}

fn parse_table(el: ElementRef<'_>) -> Option<Table> {
    let mut rows = el
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
        .map(|tr| {
            tr.children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "th" | "td"))
                .map(inline_text)
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty());

    let mut table = Table::new(rows.next()?);
    for row in rows {
        table.add_row(row);
    }
    Some(table)
}

/// Inline Markdown for the children of `el`, whitespace normalized.
pub(crate) fn inline_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_inline_children(el, &mut out);
    normalize_inline(&out)
}

fn render_inline_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text_node(text)),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    render_inline_element(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn render_inline_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    match name {
        "strong" | "b" => wrap_inline(el, "**", out),
        "em" | "i" => wrap_inline(el, "*", out),
        "del" | "s" | "strike" => wrap_inline(el, "~~", out),
        "code" | "kbd" | "tt" => {
            let text: String = el.text().collect();
            let text = normalize_inline(&collapse_whitespace(&text));
            if !text.is_empty() {
                out.push('`');
                out.push_str(&text);
                out.push('`');
            }
        }
        "a" => {
            let text = inline_text(el);
            match el.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() && !text.is_empty() => {
                    out.push_str(&format!("[{}]({})", text, href));
                }
                _ => out.push_str(&text),
            }
        }
        "img" => {
            if let Some(src) = el.value().attr("src").map(str::trim).filter(|s| !s.is_empty()) {
                let alt = el.value().attr("alt").unwrap_or("").trim();
                out.push_str(&format!("![{}]({})", alt, src));
            }
        }
        "br" => out.push('\n'),
        _ if SKIPPED.contains(&name) => {}
        _ => render_inline_children(el, out),
    }
}

fn wrap_inline(el: ElementRef<'_>, marker: &str, out: &mut String) {
    let mut raw = String::new();
    render_inline_children(el, &mut raw);

    // Keep surrounding spaces outside the markers.
    let leading = raw.starts_with(' ');
    let trailing = raw.ends_with(' ');
    let inner = normalize_inline(&raw);
    if inner.is_empty() {
        out.push_str(&raw);
        return;
    }
    if leading {
        out.push(' ');
    }
    out.push_str(marker);
    out.push_str(&inner);
    out.push_str(marker);
    if trailing {
        out.push(' ');
    }
}

/// Text node content as inline Markdown: whitespace collapsed, markup
/// characters escaped.
fn text_node(text: &str) -> String {
    escape_inline(&collapse_whitespace(text))
}

/// Escape characters that would otherwise start emphasis, code spans or
/// links. Intraword underscores stay as they are.
fn escape_inline(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let escape = match c {
            '*' | '`' | '[' | ']' => true,
            '_' => {
                let intraword = prev.is_some_and(char::is_alphanumeric)
                    && next.is_some_and(char::is_alphanumeric);
                !intraword
            }
            '\\' => next.is_some_and(|n| n.is_ascii_punctuation()),
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape line starts that Markdown would read as block markers.
fn escape_block_starts(text: &str) -> String {
    text.split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_line_start(line: &str) -> String {
    let mut chars = line.chars();
    let first = chars.next();
    let spaced = matches!(chars.next(), None | Some(' '));
    let repeated = |marker: char| line.trim_end().chars().all(|c| c == marker);

    match first {
        Some('#') | Some('>') => format!("\\{}", line),
        Some('-') if spaced || repeated('-') => format!("\\{}", line),
        Some('+') if spaced => format!("\\{}", line),
        Some('=') if repeated('=') => format!("\\{}", line),
        Some(c) if c.is_ascii_digit() => {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            let (number, rest) = line.split_at(digits);
            let marker = rest.starts_with(['.', ')']);
            if digits <= 9 && marker && matches!(rest.chars().nth(1), None | Some(' ')) {
                format!("{}\\{}", number, rest)
            } else {
                line.to_string()
            }
        }
        _ => line.to_string(),
    }
}

/// Replace every whitespace run in a text node with one space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Collapse spaces on each line, keeping explicit line breaks.
fn normalize_inline(raw: &str) -> String {
    raw.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(html: &str) -> Vec<Block> {
        parse_html(html, &ParseOptions::default())
    }

    #[test]
    fn test_heading_levels_reconciled() {
        let out = blocks("<h1>A</h1><h3>B</h3><h3>C</h3>");
        assert_eq!(
            out,
            vec![
                Block::heading(1, "A"),
                Block::heading(2, "B"),
                Block::heading(2, "C"),
            ]
        );
    }

    #[test]
    fn test_inline_substitution() {
        let out = blocks(r#"<p>Some <strong>bold</strong> and <em>soft</em> <a href=" /x ">link</a></p>"#);
        assert_eq!(
            out,
            vec![Block::paragraph("Some **bold** and *soft* [link](/x)")]
        );
    }

    #[test]
    fn test_code_block_language_alias() {
        let out = blocks("<pre><code class=\"language-py\">\nprint(1)\n</code></pre>");
        assert_eq!(out, vec![Block::code(Some("python".into()), "print(1)")]);
    }

    #[test]
    fn test_code_block_preserves_indentation() {
        let out = blocks("<pre data-lang=\"rust\">fn main() {\n    let x = 1;\n}</pre>");
        assert_eq!(
            out,
            vec![Block::code(
                Some("rust".into()),
                "fn main() {\n    let x = 1;\n}"
            )]
        );
    }

    #[test]
    fn test_nested_list() {
        let out = blocks("<ul><li>one<ul><li>inner</li></ul></li><li>two</li></ul>");
        let Block::List(list) = &out[0] else {
            panic!("expected list, got {:?}", out);
        };
        assert!(!list.ordered);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].text, "one");
        let nested = list.items[0].nested.as_ref().unwrap();
        assert_eq!(nested.items[0].text, "inner");
        assert_eq!(list.item_count(), 3);
    }

    #[test]
    fn test_table_header_and_rows() {
        let out = blocks(
            "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ann</td><td>3</td></tr></table>",
        );
        let Block::Table(table) = &out[0] else {
            panic!("expected table, got {:?}", out);
        };
        assert_eq!(table.headers, vec!["Name", "Age"]);
        assert_eq!(table.rows, vec![vec!["Ann".to_string(), "3".to_string()]]);
    }

    #[test]
    fn test_scripts_and_styles_skipped() {
        let out = blocks(
            "<html><head><title>T</title><style>p{}</style></head>\
             <body><script>var x;</script><p>kept</p></body></html>",
        );
        assert_eq!(out, vec![Block::paragraph("kept")]);
    }

    #[test]
    fn test_loose_text_becomes_paragraphs() {
        let out = blocks("<div>first <b>bit</b></div><div>second</div>");
        assert_eq!(
            out,
            vec![Block::paragraph("first **bit**"), Block::paragraph("second")]
        );
    }

    #[test]
    fn test_blockquote_and_rule() {
        let out = blocks("<blockquote><p>one</p><p>two</p></blockquote><hr>");
        assert_eq!(out, vec![Block::blockquote("one\ntwo"), Block::Rule]);
    }

    #[test]
    fn test_blockquote_keeps_lists_tables_and_rules() {
        let out = blocks("<blockquote><ul><li>keep me</li><li>and me</li></ul></blockquote>");
        assert_eq!(out, vec![Block::blockquote("- keep me\n- and me")]);

        let out = blocks(
            "<blockquote><p>intro</p><ol><li>a</li><li>b</li></ol><hr>\
             <table><tr><th>x</th></tr><tr><td>1</td></tr></table>\
             <blockquote><p>inner</p></blockquote></blockquote>",
        );
        assert_eq!(
            out,
            vec![Block::blockquote(
                "intro\n1. a\n1. b\n***\n| x |\n| --- |\n| 1 |\n> inner"
            )]
        );
    }

    #[test]
    fn test_blockquote_keeps_code_fence() {
        let out = blocks("<blockquote><pre><code class=\"language-py\">print(1)</code></pre></blockquote>");
        assert_eq!(out, vec![Block::blockquote("```python\nprint(1)\n```")]);
    }

    #[test]
    fn test_heading_keeps_inline_markup() {
        let out = blocks(r#"<h1>Use <code>foo</code> <a href="http://x">link</a><br>now</h1>"#);
        assert_eq!(out, vec![Block::heading(1, "Use `foo` [link](http://x) now")]);
    }

    #[test]
    fn test_literal_markup_characters_escaped() {
        let out = blocks("<p>literal *stars* and [box] `tick` _under_ snake_case</p>");
        assert_eq!(
            out,
            vec![Block::paragraph(
                r"literal \*stars\* and \[box\] \`tick\` \_under\_ snake_case"
            )]
        );
    }

    #[test]
    fn test_block_markers_escaped_at_line_start() {
        let out = blocks("<p># not a heading</p><p>- not<br>&gt; quoted<br>2. item</p><div>+ plus</div>");
        assert_eq!(
            out,
            vec![
                Block::paragraph(r"\# not a heading"),
                Block::paragraph("\\- not\n\\> quoted\n2\\. item"),
                Block::paragraph(r"\+ plus"),
            ]
        );

        let out = blocks("<p>a - b # c 2024. year</p><p>-5 degrees</p>");
        assert_eq!(
            out,
            vec![
                Block::paragraph("a - b # c 2024. year"),
                Block::paragraph("-5 degrees"),
            ]
        );
    }

    #[test]
    fn test_ragged_table_kept_as_found() {
        let out = blocks(
            "<table><tr><th>a</th><th>b</th></tr>\
             <tr><td>1</td><td>2</td><td>3</td></tr><tr><td>4</td></tr></table>",
        );
        let Block::Table(table) = &out[0] else {
            panic!("expected table, got {:?}", out);
        };
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2", "3"], vec!["4"]]);
        assert!(table.is_ragged());
    }

    #[test]
    fn test_line_break_and_image() {
        let out = blocks(r#"<p>a<br>b <img src="p.png" alt="pic"></p>"#);
        assert_eq!(out, vec![Block::paragraph("a\nb ![pic](p.png)")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(blocks("").is_empty());
    }
}
