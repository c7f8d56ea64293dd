//! Parsing options and configuration.

use serde::{Deserialize, Serialize};

use super::LanguageAliases;

/// Options for the structural walkers.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Code-block language aliases
    pub languages: LanguageAliases,

    /// Font-run layout analysis settings
    pub layout: LayoutOptions,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on malformed frontmatter instead of recovering.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the language alias table.
    pub fn with_languages(mut self, languages: LanguageAliases) -> Self {
        self.languages = languages;
        self
    }

    /// Set layout analysis options.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Malformed frontmatter is an error
    Strict,
    /// Malformed frontmatter is logged and treated as body text
    #[default]
    Lenient,
}

/// Settings for turning font-tagged text runs into blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOptions {
    /// Vertical delta above which a run starts a new line
    pub line_threshold: f32,

    /// Gap, as a multiple of the average line spacing, that ends a paragraph
    pub paragraph_gap_factor: f32,

    /// How many of the largest font sizes map to heading levels (1-6)
    pub max_heading_levels: u8,

    /// Apply NFC normalization and ligature expansion to run text
    pub normalize_text: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_threshold: 5.0,
            paragraph_gap_factor: 1.5,
            max_heading_levels: 6,
            normalize_text: true,
        }
    }
}
