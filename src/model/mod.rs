//! Document model types.
//!
//! This module defines the intermediate representation that bridges the
//! structural walkers (HTML, Markdown, PDF text runs) and the Markdown
//! renderer. Blocks carry already-reconciled heading levels and inline
//! Markdown, so rendering is a straight concatenation.

mod block;
mod document;
mod table;

pub use block::{Block, ListBlock, ListItem};
pub use document::{Document, Frontmatter};
pub use table::Table;
