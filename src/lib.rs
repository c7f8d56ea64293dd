//! # mdrecon
//!
//! Markdown reconstruction from HTML, Markdown and text extracted from PDFs.
//!
//! Input goes through two stages. A structural walk turns the source into
//! headings, paragraphs, code blocks, lists, tables and quotes, repairing
//! heading levels on the way. The blocks are then rendered as Markdown and
//! post-processed: links and images are normalized, configured boilerplate
//! is removed and runs of blank lines are collapsed.
//!
//! ## Quick Start
//!
//! ```
//! let markdown = mdrecon::html_to_markdown("<h1>A</h1><h3>B</h3>")?;
//! assert_eq!(markdown, "# A\n\n## B\n\n");
//! # Ok::<(), mdrecon::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Several inputs**: HTML, Markdown with frontmatter, raw PDF text,
//!   font-tagged PDF text runs
//! - **Heading repair**: skipped levels are closed up, depth capped at six
//! - **Code blocks**: language hints normalized through an alias table
//! - **Cleanup pipeline**: configurable boilerplate and line removal
//! - **Batch mode**: parallel conversion with a failure log

pub mod batch;
pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{BatchConverter, BatchEvent, BatchOptions, BatchReport};
pub use config::Config;
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, OutputFormat,
};
pub use detect::{detect_format, detect_format_from_path, InputFormat};
pub use error::{Error, Result};
pub use model::{Block, Document, Frontmatter, ListBlock, ListItem, Table};
pub use parser::{LanguageAliases, LayoutOptions, ParseOptions, TextRun};
pub use render::{
    CleanupOptions, CleanupPipeline, JsonFormat, OrderedListNumbering, RenderOptions,
};

use std::path::Path;

/// Parse HTML into a document, splitting off any leading frontmatter.
pub fn parse_html_document(html: &str, options: &ParseOptions) -> Document {
    let (frontmatter, body) = parser::extract_frontmatter(html);
    Document::from_blocks(parser::parse_html(body, options)).with_frontmatter(frontmatter)
}

/// Parse Markdown into a document, splitting off any leading frontmatter.
pub fn parse_markdown_document(markdown: &str, options: &ParseOptions) -> Document {
    let (frontmatter, body) = parser::extract_frontmatter(markdown);
    Document::from_blocks(parser::parse_markdown(body, options)).with_frontmatter(frontmatter)
}

/// Convert HTML to Markdown with default options.
///
/// # Example
///
/// ```
/// let md = mdrecon::html_to_markdown("<p>Some <b>bold</b> text</p>").unwrap();
/// assert_eq!(md, "Some **bold** text\n\n");
/// ```
pub fn html_to_markdown(html: &str) -> Result<String> {
    convert_str(html, InputFormat::Html, &ConvertOptions::default())
}

/// Re-normalize Markdown with default options.
pub fn markdown_to_markdown(markdown: &str) -> Result<String> {
    convert_str(markdown, InputFormat::Markdown, &ConvertOptions::default())
}

/// Format raw extracted text as Markdown with default options.
pub fn text_to_markdown(text: &str) -> Result<String> {
    convert_str(text, InputFormat::Text, &ConvertOptions::default())
}

/// Convert font-tagged text runs to Markdown.
pub fn runs_to_markdown(runs: &[TextRun], options: &ConvertOptions) -> Result<String> {
    let doc = Document::from_blocks(parser::parse_text_runs(runs, &options.parse));
    render::to_markdown(&doc, &options.render)
}

/// Only run the post-processors over Markdown, keeping its frontmatter.
///
/// # Example
///
/// ```
/// use mdrecon::{clean_markdown, CleanupOptions, RenderOptions};
///
/// let options = RenderOptions::new()
///     .with_cleanup(CleanupOptions::new().add_pattern("Feedback"));
/// let md = clean_markdown("Text\n\n\n\nFeedback", &options).unwrap();
/// assert_eq!(md, "Text\n\n");
/// ```
pub fn clean_markdown(markdown: &str, options: &RenderOptions) -> Result<String> {
    let (frontmatter, body) = parser::extract_frontmatter(markdown);
    render::finish_markdown(frontmatter.as_ref(), body, options)
}

/// Convert text of a known format.
pub fn convert_str(text: &str, format: InputFormat, options: &ConvertOptions) -> Result<String> {
    let registry = ConverterRegistry::with_defaults();
    let converter = registry
        .get_by_format(format)
        .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;
    Ok(converter.convert_str(text, options)?.content)
}

/// Convert a file to Markdown, choosing the converter from its extension.
///
/// # Example
///
/// ```no_run
/// let markdown = mdrecon::convert_file("page.html").unwrap();
/// std::fs::write("page.md", markdown).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<String> {
    convert_file_with_options(path, &ConvertOptions::default())
}

/// Convert a file with custom options.
pub fn convert_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<String> {
    let registry = ConverterRegistry::with_defaults();
    Ok(registry.convert(path.as_ref(), options)?.content)
}

/// Builder for configuring and running conversions.
///
/// # Example
///
/// ```no_run
/// use mdrecon::Mdrecon;
///
/// let markdown = Mdrecon::new()
///     .with_config_file("cleaning_config.yaml")?
///     .strict()
///     .convert("page.html")?
///     .content;
/// # Ok::<(), mdrecon::Error>(())
/// ```
pub struct Mdrecon {
    options: ConvertOptions,
    registry: ConverterRegistry,
}

impl Mdrecon {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            registry: ConverterRegistry::with_defaults(),
        }
    }

    /// Apply a configuration.
    pub fn with_config(mut self, config: &Config) -> Self {
        let configured = config.to_convert_options();
        self.options.parse.languages = configured.parse.languages;
        self.options.parse.layout = configured.parse.layout;
        self.options.render.ordered_numbering = configured.render.ordered_numbering;
        self.options.render.cleanup = configured.render.cleanup;
        self
    }

    /// Load and apply a configuration file.
    pub fn with_config_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let config = Config::load(path.as_ref())?;
        Ok(self.with_config(&config))
    }

    /// Fail on malformed frontmatter.
    pub fn strict(mut self) -> Self {
        self.options.parse = self.options.parse.strict();
        self
    }

    /// Only run the post-processors.
    pub fn single_pass(mut self) -> Self {
        self.options.single_pass = true;
        self
    }

    /// Collect statistics.
    pub fn with_stats(mut self) -> Self {
        self.options.collect_stats = true;
        self
    }

    /// Emit the block model as JSON instead of Markdown.
    pub fn json(mut self) -> Self {
        self.options.output_format = OutputFormat::Json;
        self
    }

    /// Conversion options built so far.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a file.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<ConvertResult> {
        self.registry.convert(path.as_ref(), &self.options)
    }

    /// Convert text of a known format.
    pub fn convert_str(&self, text: &str, format: InputFormat) -> Result<ConvertResult> {
        let converter = self
            .registry
            .get_by_format(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;
        converter.convert_str(text, &self.options)
    }
}

impl Default for Mdrecon {
    fn default() -> Self {
        Self::new()
    }
}
