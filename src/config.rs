//! YAML configuration file.
//!
//! ```yaml
//! patterns_to_remove:
//!   - 'Was this page helpful\?.*?No'
//! line_patterns_to_remove:
//!   - '^\s*[\d\W]*Provide product feedback.*$'
//! language_aliases:
//!   sh: bash
//! ordered_list_numbering: sequential
//! layout:
//!   line_threshold: 4.0
//! ```
//!
//! Every key is optional. Unknown keys are rejected so typos surface as
//! errors instead of silently doing nothing.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::convert::ConvertOptions;
use crate::error::{Error, Result};
use crate::parser::{LanguageAliases, LayoutOptions, ParseOptions};
use crate::render::{CleanupOptions, OrderedListNumbering, RenderOptions};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "cleaning_config.yaml";

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Boilerplate regexes removed from the rendered body, in order
    pub patterns_to_remove: Vec<String>,

    /// Regexes selecting whole lines to drop
    pub line_patterns_to_remove: Vec<String>,

    /// Extra language aliases, merged over the built-in table
    pub language_aliases: BTreeMap<String, String>,

    /// Ordered list numbering style
    pub ordered_list_numbering: OrderedListNumbering,

    /// Layout analysis settings for text runs
    pub layout: LayoutOptions,
}

impl Config {
    /// Parse configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from an explicit path. Any failure is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Load an explicit path, or the default file when present.
    ///
    /// A missing default file means default settings.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        match fs::read_to_string(default_path) {
            Ok(content) => {
                log::info!("Using configuration from {}", default_path.display());
                Self::from_yaml(&content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!(
                "Failed to read config {}: {e}",
                default_path.display()
            ))),
        }
    }

    /// Language alias table with the configured additions.
    pub fn language_table(&self) -> LanguageAliases {
        let mut aliases = LanguageAliases::new();
        aliases.extend(self.language_aliases.iter().map(|(k, v)| (k, v.clone())));
        aliases
    }

    /// Post-processing options from the configured patterns.
    pub fn cleanup_options(&self) -> CleanupOptions {
        CleanupOptions::new()
            .with_patterns(self.patterns_to_remove.iter().cloned())
            .with_line_patterns(self.line_patterns_to_remove.iter().cloned())
    }

    /// Build conversion options from this configuration.
    pub fn to_convert_options(&self) -> ConvertOptions {
        let parse = ParseOptions::new()
            .with_languages(self.language_table())
            .with_layout(self.layout.clone());
        let render = RenderOptions::new()
            .with_ordered_numbering(self.ordered_list_numbering)
            .with_cleanup(self.cleanup_options());

        ConvertOptions::new()
            .with_parse_options(parse)
            .with_render_options(render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            r#"
patterns_to_remove:
  - 'Feedback'
line_patterns_to_remove:
  - '^Edit$'
language_aliases:
  sh: bash
ordered_list_numbering: sequential
layout:
  line_threshold: 3.5
"#,
        )
        .unwrap();

        assert_eq!(config.patterns_to_remove, vec!["Feedback"]);
        assert_eq!(config.ordered_list_numbering, OrderedListNumbering::Sequential);
        assert_eq!(config.layout.line_threshold, 3.5);
        assert_eq!(config.layout.paragraph_gap_factor, 1.5);

        let options = config.to_convert_options();
        assert_eq!(options.parse.languages.resolve("sh"), "bash");
        assert_eq!(options.parse.languages.resolve("py"), "python");
        assert_eq!(options.render.cleanup.patterns_to_remove, vec!["Feedback"]);
        assert_eq!(options.render.cleanup.line_patterns_to_remove, vec!["^Edit$"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_yaml("patterns: [x]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "patterns_to_remove: ['abc']").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.patterns_to_remove, vec!["abc"]);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = Config::load_or_default(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
