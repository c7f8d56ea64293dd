//! Document-level types.

use super::Block;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// A reconstructed document: optional frontmatter followed by blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Leading YAML frontmatter, if the source had a valid one
    pub frontmatter: Option<Frontmatter>,

    /// Content blocks in document order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            frontmatter: None,
            blocks,
        }
    }

    /// Attach frontmatter.
    pub fn with_frontmatter(mut self, frontmatter: Option<Frontmatter>) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Heading levels and texts in document order.
    pub fn outline(&self) -> Vec<(u8, &str)> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level, text } => Some((*level, text.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// YAML frontmatter. Keys keep their source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    /// Wrap a parsed mapping.
    pub fn new(mapping: Mapping) -> Self {
        Self(mapping)
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Top-level keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.0.keys()
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the mapping has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Access the underlying mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Serialize as a `---` delimited block followed by a blank line.
    ///
    /// An empty mapping yields an empty string.
    pub fn to_yaml_block(&self) -> Result<String> {
        if self.0.is_empty() {
            return Ok(String::new());
        }
        let body = serde_yaml::to_string(&self.0)
            .map_err(|e| Error::Conversion(format!("frontmatter serialization: {}", e)))?;
        let mut out = String::with_capacity(body.len() + 9);
        out.push_str("---\n");
        out.push_str(&body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("---\n\n");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> Mapping {
        let mut m = Mapping::new();
        for (k, v) in pairs {
            m.insert(Value::from(*k), Value::from(*v));
        }
        m
    }

    #[test]
    fn test_frontmatter_block() {
        let fm = Frontmatter::new(mapping(&[("title", "X")]));
        assert_eq!(fm.to_yaml_block().unwrap(), "---\ntitle: X\n---\n\n");
    }

    #[test]
    fn test_frontmatter_key_order_preserved() {
        let fm = Frontmatter::new(mapping(&[("zeta", "1"), ("alpha", "2"), ("mid", "3")]));
        let block = fm.to_yaml_block().unwrap();
        let z = block.find("zeta").unwrap();
        let a = block.find("alpha").unwrap();
        let m = block.find("mid").unwrap();
        assert!(z < a && a < m);
    }

    #[test]
    fn test_empty_frontmatter_renders_nothing() {
        let fm = Frontmatter::default();
        assert!(fm.is_empty());
        assert_eq!(fm.to_yaml_block().unwrap(), "");
    }

    #[test]
    fn test_document_outline() {
        let mut doc = Document::new();
        doc.push(Block::heading(1, "Intro"));
        doc.push(Block::paragraph("text"));
        doc.push(Block::heading(2, "Details"));
        assert_eq!(doc.outline(), vec![(1, "Intro"), (2, "Details")]);
        assert_eq!(doc.block_count(), 3);
    }
}
