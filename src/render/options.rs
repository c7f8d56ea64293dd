//! Rendering options and configuration.

use serde::{Deserialize, Serialize};

use super::CleanupOptions;

/// Options for rendering the block model as Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How ordered list items are numbered
    pub ordered_numbering: OrderedListNumbering,

    /// Re-emit the source frontmatter at the top of the output
    pub include_frontmatter: bool,

    /// Post-processing passes applied to the rendered body
    pub cleanup: CleanupOptions,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ordered list numbering style.
    pub fn with_ordered_numbering(mut self, numbering: OrderedListNumbering) -> Self {
        self.ordered_numbering = numbering;
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ordered_numbering: OrderedListNumbering::Literal,
            include_frontmatter: true,
            cleanup: CleanupOptions::default(),
            collect_stats: false,
        }
    }
}

/// Numbering of ordered list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderedListNumbering {
    /// Every item is `1.`; Markdown viewers renumber on display
    #[default]
    Literal,
    /// Items are numbered `1.`, `2.`, `3.`, ...
    Sequential,
}
