//! Document converters with a registry dispatching on file extension.
//!
//! Every converter runs the same two stages: a structural walk that turns
//! the input into blocks, then rendering plus post-processing. With
//! `single_pass` set, the first stage is skipped and the input body only
//! goes through the post-processors.
//!
//! # Example
//!
//! ```no_run
//! use mdrecon::convert::{ConverterRegistry, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> mdrecon::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let result = registry.convert(Path::new("page.html"), &ConvertOptions::default())?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod html;
mod layout;
mod markdown;
mod text;

pub use html::HtmlConverter;
pub use layout::LayoutConverter;
pub use markdown::MarkdownConverter;
pub use text::TextConverter;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::detect::{self, InputFormat};
use crate::error::{Error, Result};
use crate::model::{Document, Frontmatter};
use crate::parser::{extract_frontmatter, split_frontmatter, ErrorMode, ParseOptions};
use crate::render::{
    finish_markdown, to_json, to_markdown, to_markdown_with_stats, ExtractionStats, JsonFormat,
    RenderOptions,
};

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Structural walk options
    pub parse: ParseOptions,

    /// Rendering and post-processing options
    pub render: RenderOptions,

    /// Skip the structural walk; only split frontmatter and post-process
    pub single_pass: bool,

    /// Whether to collect statistics during conversion
    pub collect_stats: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Only run the post-processors.
    pub fn with_single_pass(mut self, single_pass: bool) -> Self {
        self.single_pass = single_pass;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown
    #[default]
    Markdown,

    /// The block model as JSON
    Json,
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted content
    pub content: String,

    /// Frontmatter found in the source
    pub frontmatter: Option<Frontmatter>,

    /// Extraction statistics (if collected)
    pub stats: Option<ExtractionStats>,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: String, frontmatter: Option<Frontmatter>) -> Self {
        Self {
            content,
            frontmatter,
            stats: None,
            mime_type: "text/markdown",
        }
    }

    /// Set extraction statistics.
    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new input flavour. Only
/// [`convert_str`](DocumentConverter::convert_str) is required; reading
/// files and decoding bytes are shared.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["html"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert decoded text.
    fn convert_str(&self, text: &str, options: &ConvertOptions) -> Result<ConvertResult>;

    /// Convert from bytes. The input must be UTF-8.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::Encoding(e.to_string()))?;
        self.convert_str(text, options)
    }

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let bytes = fs::read(path).map_err(|e| Error::from_io(e, path))?;
        self.convert_bytes(&bytes, options)
            .map_err(|e| match e {
                Error::Encoding(msg) => Error::Encoding(format!("{}: {}", path.display(), msg)),
                other => other,
            })
    }

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the HTML, Markdown, text and text-run converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HtmlConverter::new()));
        registry.register(Arc::new(MarkdownConverter::new()));
        registry.register(Arc::new(TextConverter::new()));
        registry.register(Arc::new(LayoutConverter::new()));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Get the converter for an input format.
    pub fn get_by_format(&self, format: InputFormat) -> Option<Arc<dyn DocumentConverter>> {
        self.get_by_name(format.name())
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Check if a path has a supported extension.
    pub fn supports_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.supports(ext))
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Convert a file using the appropriate converter.
    ///
    /// Files without a known extension are read and their format is
    /// guessed from the content.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        if let Some(converter) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext))
        {
            log::debug!("Converting {} with {}", path.display(), converter.name());
            return converter.convert(path, options);
        }

        let bytes = fs::read(path).map_err(|e| Error::from_io(e, path))?;
        let text = std::str::from_utf8(&bytes).map_err(|e| Error::Encoding(e.to_string()))?;
        let format = detect::detect_format(path, text);
        let converter = self
            .get_by_format(format)
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        log::debug!("Converting {} as sniffed {}", path.display(), format);
        converter.convert_str(text, options)
    }

    /// Convert a file with an explicitly chosen format.
    pub fn convert_as(
        &self,
        path: &Path,
        format: InputFormat,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_format(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;
        converter.convert(path, options)
    }

    /// Convert bytes using the specified extension to determine the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))?;

        converter.convert_bytes(bytes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Normalize CRLF and lone CR line endings to LF.
pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Split leading frontmatter according to the error mode.
pub(crate) fn split_input<'t>(
    text: &'t str,
    options: &ParseOptions,
) -> Result<(Option<Frontmatter>, &'t str)> {
    match options.error_mode {
        ErrorMode::Lenient => Ok(extract_frontmatter(text)),
        ErrorMode::Strict => Ok(match split_frontmatter(text)? {
            Some((fm, rest)) => (Some(fm), rest),
            None => (None, text),
        }),
    }
}

/// Post-process an already-Markdown body without walking it.
pub(crate) fn clean_only(text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
    let text = normalize_newlines(text);
    let (frontmatter, body) = split_input(&text, &options.parse)?;
    let content = finish_markdown(frontmatter.as_ref(), body, &options.render)?;
    finalize_text(content, frontmatter, options)
}

/// Render a walked document according to the output options.
pub(crate) fn render_document(doc: Document, options: &ConvertOptions) -> Result<ConvertResult> {
    match options.output_format {
        OutputFormat::Markdown => {
            if options.collect_stats {
                let render_result = to_markdown_with_stats(&doc, &options.render)?;
                Ok(ConvertResult::new(render_result.content, render_result.frontmatter)
                    .with_stats(render_result.stats))
            } else {
                let content = to_markdown(&doc, &options.render)?;
                Ok(ConvertResult::new(content, doc.frontmatter))
            }
        }
        OutputFormat::Json => {
            let content = to_json(&doc, JsonFormat::Pretty)?;
            Ok(ConvertResult::new(content, doc.frontmatter).with_mime_type("application/json"))
        }
    }
}

/// Wrap Markdown produced outside the block renderer.
pub(crate) fn finalize_text(
    content: String,
    frontmatter: Option<Frontmatter>,
    options: &ConvertOptions,
) -> Result<ConvertResult> {
    let mut result = ConvertResult::new(content, frontmatter);
    if options.collect_stats {
        let mut stats = ExtractionStats::new();
        stats.count_text(&result.content);
        result = result.with_stats(stats);
    }
    Ok(result)
}
