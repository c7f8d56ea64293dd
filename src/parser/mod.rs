//! Structural walkers.
//!
//! Each input flavour has its own walker producing the shared block model:
//!
//! - [`html`]: DOM walk over HTML documents
//! - [`markdown`]: Markdown rendered to HTML and walked the same way
//! - [`layout`]: font-tagged text runs from PDF extractors
//! - [`plain`]: heuristics for raw extracted text
//!
//! All heading levels pass through [`HeadingLevelStack`].

pub mod frontmatter;
pub mod heading;
pub mod html;
pub mod language;
pub mod layout;
pub mod markdown;
mod options;
pub mod plain;

pub use frontmatter::{extract_frontmatter, split_frontmatter};
pub use heading::{HeadingLevelStack, MAX_HEADING_LEVEL};
pub use html::{parse_html, HtmlWalker};
pub use language::{language_from_class, LanguageAliases};
pub use layout::{parse_text_runs, FontSizeHistogram, LayoutAnalyzer, TextLine, TextRun};
pub use markdown::{markdown_to_html, parse_markdown};
pub use options::{ErrorMode, LayoutOptions, ParseOptions};
pub use plain::format_plain_text;
