//! Staging area that freezes accumulated children into list nodes.

use super::node::{GreenElement, GreenNode, GreenSlot, GreenToken, ListShape};
use crate::{BuildError, NodeOrToken, SyntaxKind, SyntaxSet};

const DEFAULT_CHILDREN_LEN: usize = 10;

/// Accumulates list children in order and freezes them into a green list.
#[derive(Debug, Default)]
pub struct ListBuilder {
    children: Vec<GreenElement>,
    /// Parallel to `children`: whether the entry was appended as a separator.
    separators: Vec<bool>,
}

impl ListBuilder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHILDREN_LEN)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { children: Vec::with_capacity(capacity), separators: Vec::with_capacity(capacity) }
    }

    /// Appends an element.
    pub fn append(&mut self, child: impl Into<GreenElement>) {
        self.children.push(child.into());
        self.separators.push(false);
    }

    /// Appends a separator token. Only meaningful for `freeze_separated`;
    /// plain lists treat it as an ordinary element.
    pub fn append_separator(&mut self, separator: GreenToken) {
        self.children.push(separator.into());
        self.separators.push(true);
    }

    /// Number of children accumulated so far, separators included.
    #[inline]
    pub fn count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Forgets every child and keeps the backing storage.
    pub fn clear(&mut self) {
        self.children.clear();
        self.separators.clear();
    }

    pub fn any_of_kind(&self, kind: SyntaxKind) -> bool {
        self.children.iter().any(|child| child.kind() == kind)
    }

    pub fn any_of_kinds(&self, kinds: &SyntaxSet) -> bool {
        self.children.iter().any(|child| kinds.contains(child.kind()))
    }

    /// Freezes into the most compact canonical form.
    ///
    /// No children yields `None`. A single child is returned as-is rather than
    /// wrapped in a list of one.
    pub fn freeze(&self) -> Option<GreenElement> {
        match self.children.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            _ => self.freeze_list_node().map(GreenElement::from),
        }
    }

    /// Like `freeze`, but always wraps a non-empty sequence in a list node.
    pub fn freeze_list_node(&self) -> Option<GreenNode> {
        if self.children.is_empty() {
            return None;
        }
        let shape = if self.children.iter().all(|child| matches!(child, NodeOrToken::Token(_))) {
            ListShape::LeafOnly
        } else {
            ListShape::Plain
        };
        tracing::debug!(?shape, slot_count = self.children.len(), "freezing list");
        Some(GreenNode::new_list(shape, self.slots()))
    }

    /// Freezes an element/separator/element/... sequence, optionally ending in
    /// a separator.
    ///
    /// Even a single element is wrapped in a separated list node so separator
    /// positions stay addressable.
    pub fn freeze_separated(&self) -> Result<Option<GreenNode>, BuildError> {
        for (index, &is_separator) in self.separators.iter().enumerate() {
            let expects_separator = index % 2 == 1;
            match (expects_separator, is_separator) {
                (true, false) => return Err(BuildError::MissingSeparator { index }),
                (false, true) => return Err(BuildError::UnexpectedSeparator { index }),
                _ => {}
            }
        }
        if self.children.is_empty() {
            return Ok(None);
        }
        tracing::debug!(slot_count = self.children.len(), "freezing separated list");
        Ok(Some(GreenNode::new_list(ListShape::Separated, self.slots())))
    }

    fn slots(&self) -> Vec<GreenSlot> {
        self.children.iter().cloned().map(Some).collect()
    }
}

impl<E: Into<GreenElement>> Extend<E> for ListBuilder {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for child in iter {
            self.append(child);
        }
    }
}

/// Recycles builders so a parser doesn't reallocate a backing vector for
/// every list it produces.
#[derive(Debug, Default)]
pub struct ListBuilderPool {
    free: Vec<ListBuilder>,
}

impl ListBuilderPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a recycled builder or allocates a new one.
    pub fn allocate(&mut self) -> ListBuilder {
        self.free.pop().unwrap_or_default()
    }

    /// Returns a builder to the pool, cleared.
    pub fn free(&mut self, mut builder: ListBuilder) {
        builder.clear();
        self.free.push(builder);
    }

    /// Freezes `builder` and returns it to the pool.
    pub fn freeze_and_free(&mut self, builder: ListBuilder) -> Option<GreenElement> {
        let list = builder.freeze();
        self.free(builder);
        list
    }

    /// Number of idle builders.
    #[inline]
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    const NUMBER: SyntaxKind = SyntaxKind(1);
    const COMMA: SyntaxKind = SyntaxKind(2);
    const YIELD: SyntaxKind = SyntaxKind(3);
    const STMT: SyntaxKind = SyntaxKind(4);

    fn number(text: &str) -> GreenToken {
        GreenToken::new(NUMBER, text)
    }

    fn comma() -> GreenToken {
        GreenToken::new(COMMA, ",")
    }

    #[test]
    fn empty_builder_freezes_to_none() {
        let builder = ListBuilder::new();
        assert!(builder.freeze().is_none());
        assert!(builder.freeze_list_node().is_none());
        assert_eq!(builder.freeze_separated(), Ok(None));
    }

    #[test]
    fn single_child_collapses() {
        let mut builder = ListBuilder::new();
        let stmt = GreenNode::new(STMT, [Some(number("1").into())]);
        builder.append(stmt.clone());
        let frozen = builder.freeze().unwrap();
        assert!(frozen.as_node().unwrap().ptr_eq(&stmt));

        let wrapped = builder.freeze_list_node().unwrap();
        assert_eq!(wrapped.kind(), SyntaxKind::LIST);
        assert_eq!(wrapped.slot_count(), 1);
    }

    #[test]
    fn shape_follows_contents() {
        let mut builder = ListBuilder::new();
        builder.extend([number("1"), number("2")]);
        let tokens = builder.freeze().unwrap().into_node().unwrap();
        assert_eq!(tokens.list_shape(), Some(ListShape::LeafOnly));

        builder.append(GreenNode::new(STMT, []));
        let mixed = builder.freeze().unwrap().into_node().unwrap();
        assert_eq!(mixed.list_shape(), Some(ListShape::Plain));
        assert_eq!(mixed.slot_count(), 3);
        assert_eq!(mixed.width(), TextSize::new(2));
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut builder = ListBuilder::with_capacity(32);
        builder.extend((0..20).map(|i| number(&i.to_string())));
        assert_eq!(builder.count(), 20);
        builder.clear();
        assert_eq!(builder.count(), 0);
        assert!(builder.is_empty());
        assert!(builder.children.capacity() >= 20);
    }

    #[test]
    fn any_of_kind_scans_children() {
        let mut builder = ListBuilder::new();
        builder.append(GreenNode::new(STMT, []));
        assert!(!builder.any_of_kind(YIELD));
        builder.append(GreenNode::new(YIELD, []));
        assert!(builder.any_of_kind(YIELD));
        assert!(builder.any_of_kinds(&SyntaxSet::new([YIELD, NUMBER])));
        assert!(!builder.any_of_kinds(&SyntaxSet::new([NUMBER])));
    }

    #[test]
    fn separated_sequences_are_validated() {
        let mut builder = ListBuilder::new();
        builder.append(number("1"));
        builder.append_separator(comma());
        builder.append(number("2"));
        builder.append_separator(comma());
        let list = builder.freeze_separated().unwrap().unwrap();
        assert_eq!(list.list_shape(), Some(ListShape::Separated));
        assert_eq!(list.slot_count(), 4);

        builder.append(number("3"));
        builder.append(number("4"));
        assert_eq!(builder.freeze_separated(), Err(BuildError::MissingSeparator { index: 5 }));

        builder.clear();
        builder.append_separator(comma());
        assert_eq!(builder.freeze_separated(), Err(BuildError::UnexpectedSeparator { index: 0 }));
    }

    #[test]
    fn single_separated_element_is_still_a_list() {
        let mut builder = ListBuilder::new();
        builder.append(number("7"));
        let list = builder.freeze_separated().unwrap().unwrap();
        assert_eq!(list.kind(), SyntaxKind::LIST);
        assert_eq!(list.slot_count(), 1);
    }

    #[test]
    fn pool_recycles_builders() {
        let mut pool = ListBuilderPool::new();
        let mut builder = pool.allocate();
        builder.extend([number("1"), number("2")]);
        let list = pool.freeze_and_free(builder).unwrap();
        assert_eq!(list.width(), TextSize::new(2));
        assert_eq!(pool.idle(), 1);

        let reused = pool.allocate();
        assert!(reused.is_empty());
        assert_eq!(pool.idle(), 0);
    }
}
