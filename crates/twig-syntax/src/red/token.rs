use std::fmt;

use text_size::{TextRange, TextSize};

use super::node::{SyntaxElement, SyntaxNode};
use crate::{GreenToken, SyntaxKind};

/// Positioned token.
///
/// Tokens are never cached by their parent; each access builds a fresh value,
/// which compares equal to any other built for the same slot.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxToken {
    parent: SyntaxNode,
    index: usize,
    offset: TextSize,
    green: GreenToken,
}

impl SyntaxToken {
    pub(crate) fn new(parent: SyntaxNode, index: usize, offset: TextSize, green: GreenToken) -> Self {
        Self { parent, index, offset, green }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    #[inline]
    pub fn text(&self) -> &str {
        self.green.text()
    }

    #[inline]
    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    #[inline]
    pub fn offset(&self) -> TextSize {
        self.offset
    }

    #[inline]
    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.width())
    }

    /// Slot index inside the parent.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn parent(&self) -> &SyntaxNode {
        &self.parent
    }

    /// Returns the next present sibling, node or token.
    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.parent.present_after(self.index(), self.text_range().end())
    }

    /// Returns the previous present sibling, node or token.
    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.parent.present_before(self.index(), self.offset)
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxToken")
            .field("kind", &self.kind())
            .field("range", &self.text_range())
            .field("text", &self.text())
            .finish()
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
