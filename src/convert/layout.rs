//! Font-tagged text run converter.

use crate::error::Result;
use crate::model::Document;
use crate::parser::{parse_text_runs, TextRun};

use super::{render_document, ConvertOptions, ConvertResult, DocumentConverter};

/// Converter for JSON arrays of `{text, fontSize, verticalPosition}` runs.
///
/// Runs carry no Markdown of their own, so single-pass mode does not apply
/// and the layout analysis always runs.
#[derive(Debug, Clone, Default)]
pub struct LayoutConverter {
    _private: (),
}

impl LayoutConverter {
    /// Create a new text-run converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for LayoutConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "runs"
    }

    fn convert_str(&self, text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
        if options.single_pass {
            log::debug!("Single-pass mode ignored for text runs");
        }

        let runs: Vec<TextRun> = serde_json::from_str(text)?;
        log::debug!("Analyzing {} text runs", runs.len());
        let doc = Document::from_blocks(parse_text_runs(&runs, &options.parse));
        render_document(doc, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_convert_runs() {
        let json = r#"[
            {"text": "Title", "fontSize": 20, "verticalPosition": 800},
            {"text": "Body text.", "fontSize": 11, "verticalPosition": 770},
            {"text": "More body.", "fontSize": 11, "verticalPosition": 757}
        ]"#;
        let result = LayoutConverter::new()
            .convert_str(json, &ConvertOptions::default())
            .unwrap();
        assert_eq!(result.content, "# Title\n\nBody text. More body.\n\n");
    }

    #[test]
    fn test_invalid_json() {
        let err = LayoutConverter::new()
            .convert_str("not json", &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
