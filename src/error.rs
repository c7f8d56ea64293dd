//! Error types for mdrecon.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for mdrecon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing Markdown.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not exist.
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input cannot be read or the output cannot be written.
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// A leading `---` block was found but is not a valid YAML mapping.
    #[error("Malformed frontmatter: {0}")]
    MalformedFrontmatter(String),

    /// Catch-all for parse/transform errors on one document.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// The input is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// No converter handles the input.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// A configured boilerplate pattern failed to compile.
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern text
        pattern: String,
        /// Compilation error
        #[source]
        source: regex::Error,
    },

    /// The configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error decoding a text-run stream.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(err: io::Error, path: impl AsRef<Path>) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::InputNotFound(path.as_ref().to_path_buf()),
            io::ErrorKind::PermissionDenied => {
                Error::PermissionDenied(path.as_ref().to_path_buf())
            }
            _ => Error::Io(err),
        }
    }

    /// Whether this error must abort the whole process rather than one document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InputNotFound(_) | Error::PermissionDenied(_))
    }
}
