//! Positioned nodes.
//!
//! A `SyntaxNode` wraps one green node together with its absolute offset, its
//! slot index and a link to its parent. Ownership always runs one way per
//! edge: a parent that caches a child strongly is linked to weakly, and a
//! child held only through a reclaimable entry keeps its parent alive, so a
//! live node always reaches its root.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use text_size::{TextRange, TextSize};

use super::cache::{ChildCache, SlotState};
use super::config::CacheConfig;
use super::preorder::WalkEvent;
use super::token::SyntaxToken;
use crate::{GreenElementRef, GreenNode, NodeOrToken, SyntaxKind, TokenAtOffset};

/// Positioned node or token.
pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

enum ParentLink {
    /// The parent owns this child through a strong cache entry.
    Owner(Weak<NodeData>),
    /// The parent only keeps a reclaimable entry (or none) for this child.
    Held(Arc<NodeData>),
}

impl ParentLink {
    fn root() -> Self {
        Self::Owner(Weak::new())
    }

    fn get(&self) -> Option<Arc<NodeData>> {
        match self {
            Self::Owner(parent) => parent.upgrade(),
            Self::Held(parent) => Some(parent.clone()),
        }
    }

    fn take_held(&mut self) -> Option<Arc<NodeData>> {
        match std::mem::replace(self, Self::root()) {
            Self::Held(parent) => Some(parent),
            Self::Owner(_) => None,
        }
    }
}

pub(crate) struct NodeData {
    green: GreenNode,
    offset: TextSize,
    parent: ParentLink,
    index: usize,
    config: CacheConfig,
    cache: ChildCache,
}

impl NodeData {
    /// Everything this node owns strongly: cached children and a held parent.
    fn take_owned(&mut self) -> impl Iterator<Item = Arc<NodeData>> + '_ {
        let parent = self.parent.take_held();
        self.cache.take_strong().map(|node| node.data).chain(parent)
    }
}

impl Drop for NodeData {
    fn drop(&mut self) {
        let mut stack: Vec<Arc<NodeData>> = self.take_owned().collect();
        while let Some(data) = stack.pop() {
            if let Some(mut data) = Arc::into_inner(data) {
                stack.extend(data.take_owned());
            }
        }
    }
}

/// Positioned view of a green node.
///
/// Cloning is cheap. Equality is identity: two handles are equal only if they
/// point at the same materialized wrapper.
#[derive(Clone)]
pub struct SyntaxNode {
    pub(crate) data: Arc<NodeData>,
}

impl SyntaxNode {
    /// Creates the root of a positioned tree at offset zero.
    pub fn new_root(green: GreenNode) -> Self {
        Self::new_root_with_config(green, CacheConfig::default())
    }

    pub fn new_root_with_config(green: GreenNode, config: CacheConfig) -> Self {
        Self::alloc(green, TextSize::new(0), ParentLink::root(), 0, config)
    }

    fn new_child(&self, index: usize, offset: TextSize, green: GreenNode) -> Self {
        let parent = if self.data.cache.holds_strongly(index) {
            ParentLink::Owner(Arc::downgrade(&self.data))
        } else {
            ParentLink::Held(self.data.clone())
        };
        Self::alloc(green, offset, parent, index, self.data.config)
    }

    fn alloc(
        green: GreenNode,
        offset: TextSize,
        parent: ParentLink,
        index: usize,
        config: CacheConfig,
    ) -> Self {
        let cache = ChildCache::select(&green, &config);
        Self { data: Arc::new(NodeData { green, offset, parent, index, config, cache }) }
    }

    #[inline]
    pub(crate) fn from_data(data: Arc<NodeData>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    /// Absolute offset from the start of the source.
    #[inline]
    pub fn offset(&self) -> TextSize {
        self.data.offset
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        self.data.green.width()
    }

    #[inline]
    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset(), self.width())
    }

    /// Slot index of this node inside its parent; zero for roots.
    #[inline]
    pub fn index(&self) -> usize {
        self.data.index
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.data.green.slot_count()
    }

    #[inline]
    pub fn config(&self) -> CacheConfig {
        self.data.config
    }

    /// Returns the parent; `None` only for roots.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.data.parent.get().map(Self::from_data)
    }

    /// Returns the parent, or asks `find_enclosing` when there is no direct
    /// link (detached roots, e.g. trees rooted in structured trivia).
    pub fn parent_or_else(&self, find_enclosing: impl FnOnce(&Self) -> Option<Self>) -> Option<Self> {
        self.parent().or_else(|| find_enclosing(self))
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + use<> {
        std::iter::successors(Some(self.clone()), Self::parent)
    }

    /// Returns the element at `index`, materializing it if needed. `None` for
    /// absent slots.
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn slot(&self, index: usize) -> Option<SyntaxElement> {
        let green = self.data.green.slot(index)?;
        Some(match green {
            NodeOrToken::Node(node) => NodeOrToken::Node(self.materialize(index, node, None)),
            NodeOrToken::Token(token) => NodeOrToken::Token(SyntaxToken::new(
                self.clone(),
                index,
                self.slot_offset(index),
                token.clone(),
            )),
        })
    }

    /// Returns the node at `index`; `None` if the slot is absent or a token.
    #[track_caller]
    pub fn node_slot(&self, index: usize) -> Option<Self> {
        match self.data.green.slot(index)? {
            NodeOrToken::Node(node) => Some(self.materialize(index, node, None)),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns the token at `index`; `None` if the slot is absent or a node.
    #[track_caller]
    pub fn token_slot(&self, index: usize) -> Option<SyntaxToken> {
        match self.data.green.slot(index)? {
            NodeOrToken::Token(token) => {
                Some(SyntaxToken::new(self.clone(), index, self.slot_offset(index), token.clone()))
            }
            NodeOrToken::Node(_) => None,
        }
    }

    /// Returns the child at `index` only if it is already materialized and
    /// alive.
    #[track_caller]
    pub fn cached_slot(&self, index: usize) -> Option<Self> {
        self.check_slot_index(index);
        self.data.cache.get(index)
    }

    #[track_caller]
    pub fn slot_state(&self, index: usize) -> SlotState {
        self.check_slot_index(index);
        self.data.cache.state(index)
    }

    #[inline]
    pub(crate) fn cache(&self) -> &ChildCache {
        &self.data.cache
    }

    #[inline]
    #[track_caller]
    pub(crate) fn check_slot_index(&self, index: usize) {
        let slot_count = self.slot_count();
        assert!(index < slot_count, "slot index {index} out of bounds for a node with {slot_count} slots");
    }

    /// Looks up or builds the positioned child over `green` at `index`.
    /// `offset` may be supplied by callers that already know it.
    pub(crate) fn materialize(&self, index: usize, green: &GreenNode, offset: Option<TextSize>) -> Self {
        if let Some(cached) = self.data.cache.get(index) {
            return cached;
        }
        let offset = offset.unwrap_or_else(|| self.slot_offset(index));
        self.data.cache.get_or_insert_with(index, || self.new_child(index, offset, green.clone()))
    }

    /// Builds the element for a known slot at a known offset.
    pub(crate) fn element_at(
        &self,
        index: usize,
        green: GreenElementRef<'_>,
        offset: TextSize,
    ) -> SyntaxElement {
        match green {
            NodeOrToken::Node(node) => NodeOrToken::Node(self.materialize(index, node, Some(offset))),
            NodeOrToken::Token(token) => {
                NodeOrToken::Token(SyntaxToken::new(self.clone(), index, offset, token.clone()))
            }
        }
    }

    /// Iterates present children, nodes and tokens, in order.
    ///
    /// Offsets are carried along, so a full pass costs one step per slot
    /// whatever the cache layout.
    #[inline]
    pub fn children_with_tokens(&self) -> SyntaxElementChildren {
        SyntaxElementChildren::new(self.clone())
    }

    /// Iterates child nodes, skipping tokens.
    #[inline]
    pub fn children(&self) -> SyntaxNodeChildren {
        SyntaxNodeChildren { inner: self.children_with_tokens() }
    }

    #[inline]
    pub fn first_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().next()
    }

    #[inline]
    pub fn last_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().next_back()
    }

    /// Returns the next present sibling, node or token.
    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.parent()?.present_after(self.index(), self.text_range().end())
    }

    /// Returns the previous present sibling, node or token.
    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.parent()?.present_before(self.index(), self.offset())
    }

    /// First present slot after `index`. Everything in between is absent, so
    /// it starts at `end`, the end of slot `index`.
    pub(crate) fn present_after(&self, index: usize, end: TextSize) -> Option<SyntaxElement> {
        let green = self.green();
        let (index, element) =
            (index + 1..green.slot_count()).find_map(|index| Some((index, green.slot(index)?)))?;
        Some(self.element_at(index, element, end))
    }

    /// Last present slot before `index`, which starts at `start`.
    pub(crate) fn present_before(&self, index: usize, start: TextSize) -> Option<SyntaxElement> {
        let green = self.green();
        let (index, element) = (0..index).rev().find_map(|index| Some((index, green.slot(index)?)))?;
        Some(self.element_at(index, element, start - element.width()))
    }

    /// Returns `true` if both wrap equal green content at the same offset.
    pub fn green_eq(&self, other: &Self) -> bool {
        self.offset() == other.offset() && self.green() == other.green()
    }

    /// Returns the token at the given offset, if any.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        let range = self.text_range();
        if range.is_empty() || !range.contains_inclusive(offset) {
            return TokenAtOffset::None;
        }
        let mut node = self.clone();
        loop {
            let mut candidates = touching(&node, offset);
            match (candidates.next(), candidates.next()) {
                (None, _) => return TokenAtOffset::None,
                (Some(NodeOrToken::Token(token)), None) => return TokenAtOffset::Single(token),
                (Some(NodeOrToken::Node(child)), None) => node = child,
                (Some(left), Some(right)) => {
                    return match (last_token_at(left, offset), first_token_at(right, offset)) {
                        (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
                        (Some(single), None) | (None, Some(single)) => TokenAtOffset::Single(single),
                        (None, None) => TokenAtOffset::None,
                    };
                }
            }
        }
    }

    /// Returns the smallest element that fully covers `range`.
    ///
    /// Panics if `range` is not inside this node.
    #[track_caller]
    pub fn covering_element(&self, range: TextRange) -> SyntaxElement {
        assert!(
            self.text_range().contains_range(range),
            "range {range:?} is not inside the node at {:?}",
            self.text_range()
        );
        let Some(token) = self.token_at_offset(range.start()).right_biased() else {
            return NodeOrToken::Node(self.clone());
        };
        if token.text_range().contains_range(range) {
            return NodeOrToken::Token(token);
        }
        let covering = token
            .parent()
            .ancestors()
            .find(|ancestor| ancestor.text_range().contains_range(range))
            .unwrap_or_else(|| self.clone());
        NodeOrToken::Node(covering)
    }

    /// Renders the subtree, one element per line, indented by depth.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut indent = 0usize;
        for event in self.preorder_with_tokens() {
            match event {
                WalkEvent::EnterNode(node) => {
                    let _ = writeln!(out, "{:indent$}{:?}@{:?}", "", node.kind(), node.text_range());
                    indent += 2;
                }
                WalkEvent::LeaveNode(_) => indent -= 2,
                WalkEvent::Token(token) => {
                    let (kind, range, text) = (token.kind(), token.text_range(), token.text());
                    let _ = writeln!(out, "{:indent$}{kind:?}@{range:?} {text:?}", "");
                }
            }
        }
        out
    }
}

/// Non-empty children whose range touches `offset`.
fn touching(node: &SyntaxNode, offset: TextSize) -> impl Iterator<Item = SyntaxElement> + use<> {
    node.children_with_tokens().filter(move |child| {
        let range = child.text_range();
        !range.is_empty() && range.contains_inclusive(offset)
    })
}

fn last_token_at(mut element: SyntaxElement, offset: TextSize) -> Option<SyntaxToken> {
    loop {
        match element {
            NodeOrToken::Token(token) => return Some(token),
            NodeOrToken::Node(node) => element = touching(&node, offset).last()?,
        }
    }
}

fn first_token_at(mut element: SyntaxElement, offset: TextSize) -> Option<SyntaxToken> {
    loop {
        match element {
            NodeOrToken::Token(token) => return Some(token),
            NodeOrToken::Node(node) => element = touching(&node, offset).next()?,
        }
    }
}

impl PartialEq for SyntaxNode {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.data).hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxNode")
            .field("kind", &self.kind())
            .field("range", &self.text_range())
            .field("index", &self.index())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.green()
            .preorder()
            .filter_map(NodeOrToken::into_token)
            .try_for_each(|token| f.write_str(token.text()))
    }
}

impl SyntaxElement {
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    #[inline]
    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    #[inline]
    pub fn offset(&self) -> TextSize {
        self.text_range().start()
    }

    /// Slot index inside the parent.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            NodeOrToken::Node(node) => node.index(),
            NodeOrToken::Token(token) => token.index(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent().clone()),
        }
    }
}

/// Iterator over present children, carrying offsets from both ends.
#[derive(Clone)]
pub struct SyntaxElementChildren {
    parent: SyntaxNode,
    front: usize,
    back: usize,
    front_offset: TextSize,
    back_offset: TextSize,
}

impl SyntaxElementChildren {
    fn new(parent: SyntaxNode) -> Self {
        let back = parent.slot_count();
        let range = parent.text_range();
        Self { parent, front: 0, back, front_offset: range.start(), back_offset: range.end() }
    }

    /// Number of slots not yet visited, absent ones included.
    #[inline]
    pub(crate) fn remaining_slots(&self) -> usize {
        self.back - self.front
    }
}

impl Iterator for SyntaxElementChildren {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let index = self.front;
            self.front += 1;
            let Some(green) = self.parent.data.green.slot(index) else { continue };
            let offset = self.front_offset;
            self.front_offset += green.width();
            return Some(self.parent.element_at(index, green, offset));
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining_slots()))
    }
}

impl DoubleEndedIterator for SyntaxElementChildren {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            self.back -= 1;
            let index = self.back;
            let Some(green) = self.parent.data.green.slot(index) else { continue };
            self.back_offset -= green.width();
            return Some(self.parent.element_at(index, green, self.back_offset));
        }
        None
    }
}

/// Iterator over child nodes only.
#[derive(Clone)]
pub struct SyntaxNodeChildren {
    inner: SyntaxElementChildren,
}

impl Iterator for SyntaxNodeChildren {
    type Item = SyntaxNode;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(NodeOrToken::into_node)
    }
}

impl DoubleEndedIterator for SyntaxNodeChildren {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().rev().find_map(NodeOrToken::into_node)
    }
}
