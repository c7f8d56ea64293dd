//! Markdown document converter.

use crate::error::Result;
use crate::model::Document;
use crate::parser::parse_markdown;

use super::{
    clean_only, normalize_newlines, render_document, split_input, ConvertOptions, ConvertResult,
    DocumentConverter,
};

/// Markdown document converter.
///
/// Re-normalizes existing Markdown: frontmatter is preserved, heading
/// levels are reconciled and code fences get canonical language tags.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    _private: (),
}

impl MarkdownConverter {
    /// Create a new Markdown converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for MarkdownConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn convert_str(&self, text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
        if options.single_pass {
            return clean_only(text, options);
        }

        let text = normalize_newlines(text);
        let (frontmatter, body) = split_input(&text, &options.parse)?;
        let doc = Document::from_blocks(parse_markdown(body, &options.parse))
            .with_frontmatter(frontmatter);
        render_document(doc, options)
    }
}
