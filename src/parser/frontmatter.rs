//! Leading YAML frontmatter detection.

use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::model::Frontmatter;

fn frontmatter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)")
            .expect("frontmatter regex is valid")
    })
}

/// Split a leading frontmatter block from `text`.
///
/// Returns the parsed frontmatter and the remaining text. When no block is
/// present, or the block is not a valid YAML mapping, returns `None` and
/// the original text unchanged; the latter case is logged as a warning.
pub fn extract_frontmatter(text: &str) -> (Option<Frontmatter>, &str) {
    match split_frontmatter(text) {
        Ok(Some((fm, rest))) => (Some(fm), rest),
        Ok(None) => (None, text),
        Err(e) => {
            log::warn!("{}; continuing without frontmatter", e);
            (None, text)
        }
    }
}

/// Strict variant of [`extract_frontmatter`].
///
/// `Ok(None)` means there is no `---` block at the start of the text.
/// A detected block whose body is not a YAML mapping yields
/// [`Error::MalformedFrontmatter`].
pub fn split_frontmatter(text: &str) -> Result<Option<(Frontmatter, &str)>> {
    let Some(caps) = frontmatter_regex().captures(text) else {
        return Ok(None);
    };
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let body = caps.get(1).map_or("", |m| m.as_str());

    let value: Value =
        serde_yaml::from_str(body).map_err(|e| Error::MalformedFrontmatter(e.to_string()))?;

    match value {
        Value::Mapping(mapping) => Ok(Some((Frontmatter::new(mapping), &text[whole.end..]))),
        Value::Null => Err(Error::MalformedFrontmatter(
            "block is empty".to_string(),
        )),
        other => Err(Error::MalformedFrontmatter(format!(
            "expected a mapping, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
