//! Post-processing passes over rendered Markdown.
//!
//! The passes run in a fixed order:
//!
//! 1. link normalization (`[ text ]( url )` → `[text](url)`)
//! 2. image normalization
//! 3. boilerplate removal (configured regexes)
//! 4. line removal (configured line regexes)
//! 5. blank-line collapsing
//!
//! Every pass only ever deletes characters, and the pipeline is re-run until
//! the text stops changing, so running it twice gives the same result as
//! running it once.

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// Options for the post-processing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOptions {
    /// Trim whitespace inside link text and targets
    pub normalize_links: bool,

    /// Trim whitespace inside image alt text and targets
    pub normalize_images: bool,

    /// Regexes whose matches are deleted, applied in order
    pub patterns_to_remove: Vec<String>,

    /// Regexes selecting whole lines to drop
    pub line_patterns_to_remove: Vec<String>,

    /// Collapse three or more newlines into one blank line
    pub collapse_blank_lines: bool,
}

impl CleanupOptions {
    /// Create the default options: all passes on, no patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that only collapse blank lines.
    pub fn minimal() -> Self {
        Self {
            normalize_links: false,
            normalize_images: false,
            ..Self::default()
        }
    }

    /// Set the boilerplate patterns.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns_to_remove = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Append one boilerplate pattern.
    pub fn add_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns_to_remove.push(pattern.into());
        self
    }

    /// Set the line patterns.
    pub fn with_line_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_patterns_to_remove = patterns.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            normalize_links: true,
            normalize_images: true,
            patterns_to_remove: Vec::new(),
            line_patterns_to_remove: Vec::new(),
            collapse_blank_lines: true,
        }
    }
}

/// Compiled post-processing pipeline.
#[derive(Debug, Clone)]
pub struct CleanupPipeline {
    options: CleanupOptions,
    link_regex: Regex,
    reference_regex: Regex,
    image_regex: Regex,
    blank_lines_regex: Regex,
    boilerplate: Vec<Regex>,
    line_patterns: Vec<Regex>,
}

impl CleanupPipeline {
    /// Compile a pipeline. Fails with [`Error::InvalidPattern`] on a bad regex.
    pub fn new(options: CleanupOptions) -> Result<Self> {
        let boilerplate = options
            .patterns_to_remove
            .iter()
            .map(|p| compile_boilerplate(p))
            .collect::<Result<Vec<_>>>()?;
        let line_patterns = options
            .line_patterns_to_remove
            .iter()
            .map(|p| Regex::new(p).map_err(|source| invalid(p, source)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            options,
            link_regex: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap(),
            reference_regex: Regex::new(r"(?m)^\[([^\]]+)\]:[ \t]*(.+)$").unwrap(),
            image_regex: Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap(),
            blank_lines_regex: Regex::new(r"\n{3,}").unwrap(),
            boilerplate,
            line_patterns,
        })
    }

    /// Options this pipeline was built from.
    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    /// Run all passes until the text is stable.
    pub fn process(&self, text: &str) -> String {
        let mut current = self.process_once(text);
        loop {
            let next = self.process_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn process_once(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.options.normalize_links {
            result = self.normalize_links(&result);
        }
        if self.options.normalize_images {
            result = self.normalize_images(&result);
        }
        if !self.boilerplate.is_empty() {
            result = self.strip_boilerplate(&result);
        }
        if !self.line_patterns.is_empty() {
            result = self.strip_lines(&result);
        }
        if self.options.collapse_blank_lines {
            result = self.collapse_blank_lines(&result);
        }

        result
    }

    /// Trim link text and targets, and reference definitions.
    pub fn normalize_links(&self, text: &str) -> String {
        let inline = self.link_regex.replace_all(text, |caps: &regex::Captures| {
            format!("[{}]({})", caps[1].trim(), caps[2].trim())
        });
        self.reference_regex
            .replace_all(&inline, |caps: &regex::Captures| {
                format!("[{}]: {}", caps[1].trim(), caps[2].trim())
            })
            .into_owned()
    }

    /// Trim image alt text and targets.
    pub fn normalize_images(&self, text: &str) -> String {
        self.image_regex
            .replace_all(text, |caps: &regex::Captures| {
                format!("![{}]({})", caps[1].trim(), caps[2].trim())
            })
            .into_owned()
    }

    /// Delete every match of every boilerplate pattern.
    ///
    /// Patterns apply in order; the sequence repeats until none of them
    /// changes the text.
    pub fn strip_boilerplate(&self, text: &str) -> String {
        let mut result = text.to_string();
        loop {
            let before = result.len();
            for regex in &self.boilerplate {
                if regex.is_match(&result) {
                    result = regex.replace_all(&result, "").into_owned();
                }
            }
            if result.len() == before {
                return result;
            }
        }
    }

    /// Drop every line matched by a line pattern.
    pub fn strip_lines(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if !self.line_patterns.iter().any(|re| re.is_match(content)) {
                out.push_str(line);
            }
        }
        out
    }

    /// Collapse runs of three or more newlines into two.
    pub fn collapse_blank_lines(&self, text: &str) -> String {
        self.blank_lines_regex.replace_all(text, "\n\n").into_owned()
    }
}

impl Default for CleanupPipeline {
    fn default() -> Self {
        // No user patterns, so nothing can fail to compile.
        Self::new(CleanupOptions::default()).unwrap()
    }
}

fn compile_boilerplate(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .multi_line(true)
        .build()
        .map_err(|source| invalid(pattern, source))
}

fn invalid(pattern: &str, source: regex::Error) -> Error {
    Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    }
}
