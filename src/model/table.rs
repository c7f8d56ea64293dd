//! Table types.

use serde::{Deserialize, Serialize};

/// A table: one header row followed by body rows.
///
/// Rows are kept exactly as found; a row may have more or fewer cells
/// than the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Header cells
    pub headers: Vec<String>,

    /// Body rows
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with the given header cells.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a body row.
    pub fn add_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Number of header columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of body rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has neither header cells nor rows.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Check if any body row differs in width from the header.
    pub fn is_ragged(&self) -> bool {
        self.rows.iter().any(|r| r.len() != self.headers.len())
    }
}
