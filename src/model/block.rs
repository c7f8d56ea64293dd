//! Block-level types.

use super::Table;
use serde::{Deserialize, Serialize};

/// A structural block of the reconstructed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading with an already reconciled level (1-6)
    Heading {
        /// Heading level
        level: u8,
        /// Heading text
        text: String,
    },

    /// A paragraph of inline Markdown
    Paragraph {
        /// Inline text with emphasis/links already substituted
        text: String,
    },

    /// A fenced code block
    CodeBlock {
        /// Normalized language tag
        language: Option<String>,
        /// Code text, preserved as found
        body: String,
    },

    /// A bulleted or numbered list
    List(ListBlock),

    /// A table
    Table(Table),

    /// A block quote
    Blockquote {
        /// Quoted text; may span several lines
        text: String,
    },

    /// A horizontal rule
    Rule,
}

impl Block {
    /// Create a heading block. The level is clamped to 1-6.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Create a code block.
    pub fn code(language: Option<String>, body: impl Into<String>) -> Self {
        Block::CodeBlock {
            language,
            body: body.into(),
        }
    }

    /// Create a block quote.
    pub fn blockquote(text: impl Into<String>) -> Self {
        Block::Blockquote { text: text.into() }
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this block is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Block::List(_))
    }
}

/// A list with its items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListBlock {
    /// Whether items are numbered
    pub ordered: bool,

    /// Items in source order
    pub items: Vec<ListItem>,
}

impl ListBlock {
    /// Create an empty unordered list.
    pub fn unordered() -> Self {
        Self {
            ordered: false,
            items: Vec::new(),
        }
    }

    /// Create an empty ordered list.
    pub fn ordered() -> Self {
        Self {
            ordered: true,
            items: Vec::new(),
        }
    }

    /// Add an item.
    pub fn push(&mut self, item: ListItem) {
        self.items.push(item);
    }

    /// Check if the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of items including nested lists.
    pub fn item_count(&self) -> usize {
        self.items
            .iter()
            .map(|i| 1 + i.nested.as_ref().map_or(0, |n| n.item_count()))
            .sum()
    }
}

/// One list item, optionally owning a nested list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Inline text of the item
    pub text: String,

    /// List nested under this item
    pub nested: Option<ListBlock>,
}

impl ListItem {
    /// Create an item without a nested list.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            nested: None,
        }
    }

    /// Attach a nested list.
    pub fn with_nested(mut self, nested: ListBlock) -> Self {
        self.nested = Some(nested);
        self
    }
}
