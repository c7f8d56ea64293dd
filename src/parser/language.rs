//! Code-block language name normalization.

use std::collections::HashMap;

/// Built-in short names and the language tag they stand for.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("py", "python"),
    ("rb", "ruby"),
    ("cs", "csharp"),
    ("cpp", "cpp"),
    ("ts", "typescript"),
];

/// Alias table used to normalize code-block language hints.
///
/// Lookups are case-insensitive. Unknown names pass through unchanged.
#[derive(Debug, Clone)]
pub struct LanguageAliases {
    map: HashMap<String, String>,
}

impl LanguageAliases {
    /// Create a table with only the built-in aliases.
    pub fn new() -> Self {
        let map = DEFAULT_ALIASES
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { map }
    }

    /// Create a table with no aliases at all.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Add or replace an alias.
    pub fn insert(&mut self, alias: impl AsRef<str>, language: impl Into<String>) {
        self.map
            .insert(alias.as_ref().to_lowercase(), language.into());
    }

    /// Merge extra aliases over the current ones.
    pub fn extend<K, V>(&mut self, aliases: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (alias, language) in aliases {
            self.insert(alias, language);
        }
    }

    /// Normalize a language name.
    pub fn resolve(&self, name: &str) -> String {
        self.map
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for LanguageAliases {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull a language hint out of a `class` attribute value.
///
/// Prefers `language-x` / `lang-x` tokens and falls back to the first bare
/// class name.
pub fn language_from_class(class: &str) -> Option<&str> {
    let mut first = None;
    for token in class.split_whitespace() {
        if let Some(lang) = token
            .strip_prefix("language-")
            .or_else(|| token.strip_prefix("lang-"))
        {
            if !lang.is_empty() {
                return Some(lang);
            }
        }
        if first.is_none() {
            first = Some(token);
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aliases() {
        let aliases = LanguageAliases::new();
        assert_eq!(aliases.resolve("py"), "python");
        assert_eq!(aliases.resolve("js"), "javascript");
        assert_eq!(aliases.resolve("cs"), "csharp");
        assert_eq!(aliases.resolve("ts"), "typescript");
        assert_eq!(aliases.resolve("rb"), "ruby");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let aliases = LanguageAliases::new();
        assert_eq!(aliases.resolve("PY"), "python");
    }

    #[test]
    fn test_unknown_passes_through() {
        let aliases = LanguageAliases::new();
        assert_eq!(aliases.resolve("Haskell"), "Haskell");
    }

    #[test]
    fn test_extend_overrides() {
        let mut aliases = LanguageAliases::new();
        aliases.extend([("sh", "bash"), ("py", "python3")]);
        assert_eq!(aliases.resolve("sh"), "bash");
        assert_eq!(aliases.resolve("py"), "python3");
        assert_eq!(aliases.resolve("js"), "javascript");
    }

    #[test]
    fn test_language_from_class() {
        assert_eq!(language_from_class("language-py"), Some("py"));
        assert_eq!(language_from_class("highlight lang-rust"), Some("rust"));
        assert_eq!(language_from_class("python"), Some("python"));
        assert_eq!(language_from_class("   "), None);
    }
}
