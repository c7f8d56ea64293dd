//! HTML document converter.

use crate::error::Result;
use crate::model::Document;
use crate::parser::parse_html;

use super::{
    clean_only, normalize_newlines, render_document, split_input, ConvertOptions, ConvertResult,
    DocumentConverter,
};

/// HTML document converter.
///
/// Walks the DOM into blocks and renders them as Markdown.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    _private: (),
}

impl HtmlConverter {
    /// Create a new HTML converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for HtmlConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm", "xhtml"]
    }

    fn name(&self) -> &str {
        "html"
    }

    fn convert_str(&self, text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
        if options.single_pass {
            return clean_only(text, options);
        }

        let text = normalize_newlines(text);
        let (frontmatter, body) = split_input(&text, &options.parse)?;
        let doc = Document::from_blocks(parse_html(body, &options.parse))
            .with_frontmatter(frontmatter);
        render_document(doc, options)
    }
}
