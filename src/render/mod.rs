//! Rendering of the block model to Markdown, plus post-processing.

mod cleanup;
mod json;
mod markdown;
mod options;
mod result;

pub use cleanup::{CleanupOptions, CleanupPipeline};
pub use json::{to_json, JsonFormat};
pub use markdown::{finish_markdown, to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub(crate) use markdown::{write_list, write_table};
pub use options::{OrderedListNumbering, RenderOptions};
pub use result::{ExtractionStats, RenderResult};
