//! Read-only list facades over positioned list nodes.
//!
//! The builder collapses a list of one into its only element, so a list slot
//! may hold a list node, a lone element or nothing. `SyntaxList` hides the
//! difference. `SeparatedSyntaxList` addresses elements and separators of a
//! separated list by logical index.

use std::fmt;

use text_size::TextSize;

use crate::{ListShape, NodeOrToken, SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxToken};

#[derive(Clone)]
enum Repr {
    Empty,
    Single(SyntaxElement),
    List(SyntaxNode),
}

/// List view that provides indexed access to list elements.
#[derive(Clone)]
pub struct SyntaxList {
    repr: Repr,
}

impl SyntaxList {
    /// Views a list slot's content.
    pub fn new(element: Option<SyntaxElement>) -> Self {
        let repr = match element {
            None => Repr::Empty,
            Some(NodeOrToken::Node(node)) if node.green().is_list() => Repr::List(node),
            Some(element) => Repr::Single(element),
        };
        Self { repr }
    }

    /// Views slot `index` of `parent`.
    #[track_caller]
    pub fn from_slot(parent: &SyntaxNode, index: usize) -> Self {
        Self::new(parent.slot(index))
    }

    /// Returns the number of elements in the list.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Single(_) => 1,
            Repr::List(node) => node.slot_count(),
        }
    }

    /// Returns `true` when the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `idx`, if present.
    pub fn get(&self, idx: usize) -> Option<SyntaxElement> {
        match &self.repr {
            Repr::Empty => None,
            Repr::Single(element) => (idx == 0).then(|| element.clone()),
            Repr::List(node) => (idx < node.slot_count()).then(|| node.slot(idx)).flatten(),
        }
    }

    /// Returns the element at `idx`, panicking if out of bounds.
    #[track_caller]
    pub fn at(&self, idx: usize) -> SyntaxElement {
        match self.get(idx) {
            Some(element) => element,
            None => panic!("list index {idx} out of bounds for a list of {} elements", self.len()),
        }
    }

    /// Returns the backing list node, if the list was not collapsed.
    #[inline]
    pub fn node(&self) -> Option<&SyntaxNode> {
        match &self.repr {
            Repr::List(node) => Some(node),
            Repr::Empty | Repr::Single(_) => None,
        }
    }

    /// Returns an iterator over list elements.
    pub fn iter(&self) -> SyntaxListIter {
        let repr = match &self.repr {
            Repr::Empty => IterRepr::Single(None),
            Repr::Single(element) => IterRepr::Single(Some(element.clone())),
            Repr::List(node) => IterRepr::List(node.children_with_tokens()),
        };
        SyntaxListIter { repr }
    }

    /// Walks the list in windows of at most `window` elements.
    ///
    /// Panics if `window` is zero.
    #[track_caller]
    pub fn segments(&self, window: usize) -> ListSegments {
        assert!(window > 0, "segment window must be at least one element");
        ListSegments { elements: self.iter(), window, start: 0 }
    }
}

impl IntoIterator for &SyntaxList {
    type Item = SyntaxElement;
    type IntoIter = SyntaxListIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for SyntaxList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[derive(Clone)]
enum IterRepr {
    Single(Option<SyntaxElement>),
    List(SyntaxElementChildren),
}

/// Iterator over `SyntaxList` elements.
#[derive(Clone)]
pub struct SyntaxListIter {
    repr: IterRepr,
}

impl Iterator for SyntaxListIter {
    type Item = SyntaxElement;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.repr {
            IterRepr::Single(element) => element.take(),
            IterRepr::List(children) => children.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl DoubleEndedIterator for SyntaxListIter {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        match &mut self.repr {
            IterRepr::Single(element) => element.take(),
            IterRepr::List(children) => children.next_back(),
        }
    }
}

impl ExactSizeIterator for SyntaxListIter {
    /// List nodes never have absent slots, so every remaining slot is one
    /// element.
    #[inline]
    fn len(&self) -> usize {
        match &self.repr {
            IterRepr::Single(element) => usize::from(element.is_some()),
            IterRepr::List(children) => children.remaining_slots(),
        }
    }
}

/// Consecutive run of list elements.
#[derive(Clone, Debug)]
pub struct ListSegment {
    start: usize,
    offset: TextSize,
    elements: Vec<SyntaxElement>,
}

impl ListSegment {
    /// Index of the first element in the list.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute offset of the first element.
    #[inline]
    pub fn offset(&self) -> TextSize {
        self.offset
    }

    #[inline]
    pub fn elements(&self) -> &[SyntaxElement] {
        &self.elements
    }

    #[inline]
    pub fn into_elements(self) -> Vec<SyntaxElement> {
        self.elements
    }
}

/// Iterator over list windows. Offsets carry over from one window to the
/// next, so earlier slots are never rescanned.
#[derive(Clone)]
pub struct ListSegments {
    elements: SyntaxListIter,
    window: usize,
    start: usize,
}

impl Iterator for ListSegments {
    type Item = ListSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let elements: Vec<_> = self.elements.by_ref().take(self.window).collect();
        let offset = elements.first()?.offset();
        let start = self.start;
        self.start += elements.len();
        Some(ListSegment { start, offset, elements })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.elements.len().div_ceil(self.window);
        (len, Some(len))
    }
}

impl ExactSizeIterator for ListSegments {}

/// View over an element/separator/element/... list.
///
/// Element `k` lives at slot `2k`, the separator that follows it at slot
/// `2k + 1`.
#[derive(Clone)]
pub struct SeparatedSyntaxList {
    list: Option<SyntaxNode>,
}

impl SeparatedSyntaxList {
    /// Views a separated list node; `None` is the empty list.
    ///
    /// Panics if `list` is not a separated list node.
    #[track_caller]
    pub fn new(list: Option<SyntaxNode>) -> Self {
        if let Some(node) = &list {
            assert_eq!(
                node.green().list_shape(),
                Some(ListShape::Separated),
                "expected a separated list node, found {:?}",
                node.kind()
            );
        }
        Self { list }
    }

    /// Views slot `index` of `parent`.
    #[track_caller]
    pub fn from_slot(parent: &SyntaxNode, index: usize) -> Self {
        Self::new(parent.node_slot(index))
    }

    #[inline]
    pub fn node(&self) -> Option<&SyntaxNode> {
        self.list.as_ref()
    }

    /// Number of physical slots, separators included.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.list.as_ref().map_or(0, SyntaxNode::slot_count)
    }

    /// Number of elements, separators excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.slot_count().div_ceil(2)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the last slot is a separator.
    #[inline]
    pub fn has_trailing_separator(&self) -> bool {
        let slot_count = self.slot_count();
        slot_count > 0 && slot_count % 2 == 0
    }

    /// Returns element `k`, if in bounds.
    pub fn get(&self, k: usize) -> Option<SyntaxElement> {
        if k >= self.len() {
            return None;
        }
        self.list.as_ref()?.slot(2 * k)
    }

    /// Returns element `k`, panicking if out of bounds.
    #[track_caller]
    pub fn element(&self, k: usize) -> SyntaxElement {
        match self.get(k) {
            Some(element) => element,
            None => panic!("element index {k} out of bounds for a list of {} elements", self.len()),
        }
    }

    /// Returns the separator after element `k`; `None` after the last element
    /// when there is no trailing separator.
    ///
    /// Panics if `k` is out of bounds.
    #[track_caller]
    pub fn separator(&self, k: usize) -> Option<SyntaxToken> {
        let len = self.len();
        assert!(k < len, "element index {k} out of bounds for a list of {len} elements");
        let list = self.list.as_ref()?;
        let slot = 2 * k + 1;
        if slot < list.slot_count() { list.token_slot(slot) } else { None }
    }

    /// Iterates elements only. Separators are skipped without being
    /// materialized.
    pub fn iter(&self) -> SeparatedElements {
        let (front_offset, back_offset) = match &self.list {
            Some(list) => (list.text_range().start(), list.text_range().end()),
            None => Default::default(),
        };
        SeparatedElements { list: self.list.clone(), front: 0, back: self.len(), front_offset, back_offset }
    }

    /// Iterates the separators present in the list.
    pub fn separators(&self) -> Separators {
        let offset = self.list.as_ref().map_or(TextSize::new(0), SyntaxNode::offset);
        Separators { list: self.list.clone(), slot: 1, offset }
    }

    /// Iterates every slot in order, elements and separators alike.
    pub fn elements_with_separators(&self) -> impl DoubleEndedIterator<Item = SyntaxElement> + use<> {
        self.list.as_ref().map(SyntaxNode::children_with_tokens).into_iter().flatten()
    }
}

impl IntoIterator for &SeparatedSyntaxList {
    type Item = SyntaxElement;
    type IntoIter = SeparatedElements;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for SeparatedSyntaxList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements_with_separators()).finish()
    }
}

/// Iterator over the elements of a separated list.
#[derive(Clone)]
pub struct SeparatedElements {
    list: Option<SyntaxNode>,
    front: usize,
    back: usize,
    front_offset: TextSize,
    back_offset: TextSize,
}

impl Iterator for SeparatedElements {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let list = self.list.as_ref()?;
        let green = list.green();
        let slot = 2 * self.front;
        self.front += 1;
        let offset = self.front_offset;
        self.front_offset += green.slot_width(slot);
        if slot + 1 < green.slot_count() {
            self.front_offset += green.slot_width(slot + 1);
        }
        Some(list.element_at(slot, green.slot(slot)?, offset))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for SeparatedElements {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let list = self.list.as_ref()?;
        let green = list.green();
        self.back -= 1;
        let slot = 2 * self.back;
        if slot + 1 < green.slot_count() {
            self.back_offset -= green.slot_width(slot + 1);
        }
        self.back_offset -= green.slot_width(slot);
        Some(list.element_at(slot, green.slot(slot)?, self.back_offset))
    }
}

impl ExactSizeIterator for SeparatedElements {}

/// Iterator over the separators of a separated list.
#[derive(Clone)]
pub struct Separators {
    list: Option<SyntaxNode>,
    /// Next separator slot; always odd.
    slot: usize,
    /// Start of the element preceding `slot`.
    offset: TextSize,
}

impl Iterator for Separators {
    type Item = SyntaxToken;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list.as_ref()?;
        let green = list.green();
        if self.slot >= green.slot_count() {
            return None;
        }
        let slot = self.slot;
        self.slot += 2;
        let offset = self.offset + green.slot_width(slot - 1);
        self.offset = offset + green.slot_width(slot);
        match green.slot(slot)? {
            NodeOrToken::Token(token) => Some(SyntaxToken::new(list.clone(), slot, offset, token.clone())),
            NodeOrToken::Node(_) => None,
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.as_ref().map_or(0, |list| {
            list.slot_count().saturating_sub(self.slot).div_ceil(2)
        });
        (remaining, Some(remaining))
    }
}
