//! Green nodes and tokens.
//!
//! A node owns its slots; a slot is either a nested node, a token, or absent
//! for optional syntax. Widths are computed once at construction and nothing is
//! mutated afterwards, so any subtree can be shared between unrelated trees.

use std::fmt;
use std::hash::{Hash, Hasher};

use text_size::TextSize;
use triomphe::Arc;

use crate::{NodeOrToken, SyntaxKind};

/// Owned node or token.
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Borrowed node or token.
pub type GreenElementRef<'a> = NodeOrToken<&'a GreenNode, &'a GreenToken>;

/// A structural slot. `None` marks an absent optional element.
pub type GreenSlot = Option<GreenElement>;

/// Lists at least this wide carry a prefix-offset table.
pub(crate) const OFFSET_TABLE_THRESHOLD: usize = 10;

/// Layout of a list node.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListShape {
    /// Elements only.
    Plain,
    /// Elements at even slots, separators at odd slots.
    Separated,
    /// Every slot is a token.
    LeafOnly,
}

struct GreenNodeData {
    kind: SyntaxKind,
    width: TextSize,
    shape: Option<ListShape>,
    slots: Box<[GreenSlot]>,
    /// Start of each slot relative to the node.
    offsets: Option<Box<[TextSize]>>,
}

impl Drop for GreenNodeData {
    fn drop(&mut self) {
        // Unlink uniquely owned descendants onto a heap stack so that dropping a
        // very deep tree doesn't recurse.
        let mut stack: Vec<GreenNode> = take_child_nodes(&mut self.slots).collect();
        while let Some(node) = stack.pop() {
            if let Ok(mut data) = Arc::try_unwrap(node.data) {
                stack.extend(take_child_nodes(&mut data.slots));
            }
        }
    }
}

fn take_child_nodes(slots: &mut Box<[GreenSlot]>) -> impl Iterator<Item = GreenNode> {
    std::mem::take(slots).into_vec().into_iter().filter_map(|slot| match slot {
        Some(NodeOrToken::Node(node)) => Some(node),
        _ => None,
    })
}

/// Immutable, position-free syntax node.
#[derive(Clone)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

impl GreenNode {
    /// Creates a non-list node over `slots`.
    pub fn new(kind: SyntaxKind, slots: impl IntoIterator<Item = GreenSlot>) -> Self {
        debug_assert!(!kind.is_list(), "list nodes are created by `ListBuilder`");
        Self::alloc(kind, None, slots.into_iter().collect())
    }

    /// Creates a list node. The shape has already been validated by the caller.
    pub(crate) fn new_list(shape: ListShape, slots: Vec<GreenSlot>) -> Self {
        Self::alloc(SyntaxKind::LIST, Some(shape), slots.into_boxed_slice())
    }

    fn alloc(kind: SyntaxKind, shape: Option<ListShape>, slots: Box<[GreenSlot]>) -> Self {
        let width = slots.iter().flatten().map(GreenElement::width).sum();
        let offsets = (shape.is_some() && slots.len() >= OFFSET_TABLE_THRESHOLD).then(|| {
            let mut start = TextSize::new(0);
            slots
                .iter()
                .map(|slot| {
                    let offset = start;
                    start += slot.as_ref().map_or(TextSize::new(0), GreenElement::width);
                    offset
                })
                .collect()
        });
        Self { data: Arc::new(GreenNodeData { kind, width, shape, slots, offsets }) }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// Total text length of the subtree.
    #[inline]
    pub fn width(&self) -> TextSize {
        self.data.width
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.data.slots.len()
    }

    /// Returns `Some` if this node was frozen by a `ListBuilder`.
    #[inline]
    pub fn list_shape(&self) -> Option<ListShape> {
        self.data.shape
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.data.shape.is_some()
    }

    /// Returns the slot at `index`, `None` if it is absent.
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn slot(&self, index: usize) -> Option<GreenElementRef<'_>> {
        let slot_count = self.slot_count();
        match self.data.slots.get(index) {
            Some(slot) => slot.as_ref().map(GreenElement::as_ref),
            None => panic!("slot index {index} out of bounds for a node with {slot_count} slots"),
        }
    }

    /// Width of the slot at `index`, zero when absent.
    #[inline]
    #[track_caller]
    pub fn slot_width(&self, index: usize) -> TextSize {
        self.slot(index).map_or(TextSize::new(0), |slot| slot.width())
    }

    /// Start of the slot at `index` relative to this node.
    ///
    /// Sums the widths of the preceding slots, or reads the offset table of
    /// wide lists.
    #[track_caller]
    pub fn slot_offset(&self, index: usize) -> TextSize {
        if let Some(offset) = self.precomputed_slot_offset(index) {
            return offset;
        }
        assert!(
            index <= self.slot_count(),
            "slot index {index} out of bounds for a node with {} slots",
            self.slot_count()
        );
        self.data.slots[..index].iter().flatten().map(GreenElement::width).sum()
    }

    #[inline]
    pub(crate) fn precomputed_slot_offset(&self, index: usize) -> Option<TextSize> {
        self.data.offsets.as_ref()?.get(index).copied()
    }

    /// Iterates all slots in order, including absent ones.
    #[inline]
    pub fn slots(&self) -> Slots<'_> {
        Slots { inner: self.data.slots.iter() }
    }

    /// Iterates present slots in order.
    #[inline]
    pub fn children(&self) -> Children<'_> {
        Children { inner: self.slots() }
    }

    #[inline]
    pub(crate) fn raw_slots(&self) -> &[GreenSlot] {
        &self.data.slots
    }

    /// Returns `true` if both handles share one allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    #[inline]
    pub(crate) fn addr(&self) -> usize {
        std::ptr::from_ref::<GreenNodeData>(&self.data).addr()
    }
}

impl PartialEq for GreenNode {
    /// Deep structural comparison, done with an explicit stack.
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((lhs, rhs)) = stack.pop() {
            if lhs.ptr_eq(rhs) {
                continue;
            }
            if lhs.kind() != rhs.kind()
                || lhs.width() != rhs.width()
                || lhs.list_shape() != rhs.list_shape()
                || lhs.slot_count() != rhs.slot_count()
            {
                return false;
            }
            for (l, r) in lhs.raw_slots().iter().zip(rhs.raw_slots()) {
                match (l, r) {
                    (None, None) => {}
                    (Some(NodeOrToken::Node(l)), Some(NodeOrToken::Node(r))) => stack.push((l, r)),
                    (Some(NodeOrToken::Token(l)), Some(NodeOrToken::Token(r))) => {
                        if l != r {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for GreenNode {}

impl Hash for GreenNode {
    /// Shallow: equal nodes always agree on these fields.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.width().hash(state);
        self.slot_count().hash(state);
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("width", &self.width())
            .field("slot_count", &self.slot_count())
            .finish_non_exhaustive()
    }
}

#[derive(PartialEq, Eq, Hash)]
struct GreenTokenData {
    kind: SyntaxKind,
    text: Box<str>,
}

/// Immutable leaf. Its width is the length of its text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenToken {
    data: Arc<GreenTokenData>,
}

impl GreenToken {
    pub fn new(kind: SyntaxKind, text: &str) -> Self {
        Self { data: Arc::new(GreenTokenData { kind, text: text.into() }) }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.data.text
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        TextSize::of(self.text())
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    #[inline]
    pub(crate) fn addr(&self) -> usize {
        std::ptr::from_ref::<GreenTokenData>(&self.data).addr()
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken").field("kind", &self.kind()).field("text", &self.text()).finish()
    }
}

impl From<GreenNode> for GreenElement {
    #[inline]
    fn from(node: GreenNode) -> Self {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    #[inline]
    fn from(token: GreenToken) -> Self {
        NodeOrToken::Token(token)
    }
}

impl GreenElement {
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.as_ref().kind()
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        self.as_ref().width()
    }

    /// Identity of the underlying allocation, used for interning.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        match self {
            NodeOrToken::Node(node) => node.addr(),
            NodeOrToken::Token(token) => token.addr(),
        }
    }

    #[inline]
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeOrToken::Node(l), NodeOrToken::Node(r)) => l.ptr_eq(r),
            (NodeOrToken::Token(l), NodeOrToken::Token(r)) => l.ptr_eq(r),
            _ => false,
        }
    }
}

impl<'a> GreenElementRef<'a> {
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    #[inline]
    pub fn width(self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.width(),
            NodeOrToken::Token(token) => token.width(),
        }
    }

    #[inline]
    pub fn to_owned(self) -> GreenElement {
        match self {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.clone()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.clone()),
        }
    }
}

/// Iterator over every slot of a node, absent ones included.
#[derive(Clone)]
pub struct Slots<'a> {
    inner: std::slice::Iter<'a, GreenSlot>,
}

impl<'a> Iterator for Slots<'a> {
    type Item = Option<GreenElementRef<'a>>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| slot.as_ref().map(GreenElement::as_ref))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Slots<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|slot| slot.as_ref().map(GreenElement::as_ref))
    }
}

impl ExactSizeIterator for Slots<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Iterator over the present slots of a node.
#[derive(Clone)]
pub struct Children<'a> {
    inner: Slots<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = GreenElementRef<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(std::convert::identity)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.inner.len()))
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().rev().find_map(std::convert::identity)
    }
}
