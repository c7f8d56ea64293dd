//! Raw extracted text converter.

use crate::error::Result;
use crate::model::Document;
use crate::parser::{format_plain_text, parse_markdown};
use crate::render::finish_markdown;

use super::{
    clean_only, finalize_text, normalize_newlines, render_document, split_input, ConvertOptions,
    ConvertResult, DocumentConverter, OutputFormat,
};

/// Converter for plain text pulled out of PDFs.
///
/// Applies the ALL-CAPS heading and dash-list heuristics; the formatted
/// text bypasses the block renderer so its layout is kept as produced.
#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    _private: (),
}

impl TextConverter {
    /// Create a new text converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for TextConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn convert_str(&self, text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
        if options.single_pass {
            return clean_only(text, options);
        }

        let text = normalize_newlines(text);
        let (frontmatter, body) = split_input(&text, &options.parse)?;
        let formatted = format_plain_text(body);

        match options.output_format {
            OutputFormat::Json => {
                let doc = Document::from_blocks(parse_markdown(&formatted, &options.parse))
                    .with_frontmatter(frontmatter);
                render_document(doc, options)
            }
            OutputFormat::Markdown => {
                let content = finish_markdown(frontmatter.as_ref(), &formatted, &options.render)?;
                finalize_text(content, frontmatter, options)
            }
        }
    }
}
