//! Heading-level reconciliation.
//!
//! Source documents often skip heading levels (an `h3` directly under an
//! `h1`). [`HeadingLevelStack`] remaps raw levels so the emitted outline
//! always nests one level at a time.

/// Deepest Markdown heading level.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Stack of the source heading levels currently open.
///
/// The stack is strictly increasing from bottom to top. Its depth after an
/// update is the output level for the heading that caused the update.
#[derive(Debug, Clone, Default)]
pub struct HeadingLevelStack {
    open: Vec<u8>,
}

impl HeadingLevelStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw source level and return the adjusted output level.
    pub fn adjust(&mut self, raw_level: u8) -> u8 {
        let level = raw_level.clamp(1, MAX_HEADING_LEVEL);

        while self.open.last().is_some_and(|&top| level <= top) {
            self.open.pop();
        }
        if self.open.len() >= MAX_HEADING_LEVEL as usize {
            self.open.pop();
        }
        self.open.push(level);

        self.depth()
    }

    /// Current nesting depth.
    pub fn depth(&self) -> u8 {
        self.open.len() as u8
    }
}
