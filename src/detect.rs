//! Input format detection.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Input flavours understood by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// HTML documents and fragments
    Html,
    /// Markdown, possibly with frontmatter
    Markdown,
    /// Raw text extracted from a PDF
    Text,
    /// JSON array of font-tagged text runs
    TextRuns,
}

impl InputFormat {
    /// Canonical converter name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Html => "html",
            InputFormat::Markdown => "markdown",
            InputFormat::Text => "text",
            InputFormat::TextRuns => "runs",
        }
    }

    /// Format for a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" | "xhtml" => Some(InputFormat::Html),
            "md" | "markdown" => Some(InputFormat::Markdown),
            "txt" | "text" => Some(InputFormat::Text),
            "json" => Some(InputFormat::TextRuns),
            _ => None,
        }
    }

    /// Guess the format from the first non-blank character of the content.
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('[') | Some('{') => InputFormat::TextRuns,
            Some('<') => InputFormat::Html,
            _ => InputFormat::Markdown,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(InputFormat::Html),
            "markdown" | "md" => Ok(InputFormat::Markdown),
            "text" | "txt" => Ok(InputFormat::Text),
            "runs" | "json" => Ok(InputFormat::TextRuns),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Detect the format of a file from its extension.
///
/// # Example
/// ```
/// use mdrecon::detect::{detect_format_from_path, InputFormat};
///
/// assert_eq!(detect_format_from_path("page.HTM").unwrap(), InputFormat::Html);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let path = path.as_ref();
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::from_extension)
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))
}

/// Detect the format from the extension, falling back to the content.
pub fn detect_format<P: AsRef<Path>>(path: P, content: &str) -> InputFormat {
    detect_format_from_path(path).unwrap_or_else(|_| InputFormat::sniff(content))
}

/// Check if a path has an extension some converter handles.
pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}
