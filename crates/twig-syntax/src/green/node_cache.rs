//! Interning of small green nodes and tokens.

use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

use hashbrown::HashTable;
use hashbrown::hash_table::Entry;
use rustc_hash::FxHasher;

use super::node::{GreenNode, GreenSlot, GreenToken};
use crate::SyntaxKind;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Deduplicates structurally identical green elements so that repeated
/// syntax shares one allocation.
///
/// Tokens are keyed by kind and text. Nodes are keyed by kind and the
/// identity of their slots, which makes lookups cheap when the children were
/// interned through the same cache.
#[derive(Default)]
pub struct NodeCache {
    nodes: HashTable<GreenNode>,
    tokens: HashTable<GreenToken>,
    hasher: FxBuildHasher,
}

impl NodeCache {
    /// Nodes with more slots than this are never interned.
    pub const MAX_CACHED_SLOTS: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) -> GreenToken {
        let hasher = self.hasher.clone();
        let hash = token_hash(&hasher, kind, text);
        let entry = self.tokens.entry(
            hash,
            |token| token.kind() == kind && token.text() == text,
            |token| token_hash(&hasher, token.kind(), token.text()),
        );
        match entry {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(GreenToken::new(kind, text)).get().clone(),
        }
    }

    pub fn node(&mut self, kind: SyntaxKind, slots: Vec<GreenSlot>) -> GreenNode {
        if slots.len() > Self::MAX_CACHED_SLOTS {
            return GreenNode::new(kind, slots);
        }
        let hasher = self.hasher.clone();
        let hash = node_hash(&hasher, kind, &slots);
        let entry = self.nodes.entry(
            hash,
            |node| node.kind() == kind && same_slots(node.raw_slots(), &slots),
            |node| node_hash(&hasher, node.kind(), node.raw_slots()),
        );
        match entry {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(GreenNode::new(kind, slots)).get().clone(),
        }
    }

    /// Number of interned nodes and tokens.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn token_hash(hasher: &FxBuildHasher, kind: SyntaxKind, text: &str) -> u64 {
    let mut state = hasher.build_hasher();
    kind.hash(&mut state);
    text.hash(&mut state);
    state.finish()
}

fn node_hash(hasher: &FxBuildHasher, kind: SyntaxKind, slots: &[GreenSlot]) -> u64 {
    let mut state = hasher.build_hasher();
    kind.hash(&mut state);
    for slot in slots {
        slot.as_ref().map(|element| element.addr()).hash(&mut state);
    }
    state.finish()
}

fn same_slots(lhs: &[GreenSlot], rhs: &[GreenSlot]) -> bool {
    lhs.len() == rhs.len()
        && lhs.iter().zip(rhs).all(|pair| match pair {
            (None, None) => true,
            (Some(l), Some(r)) => l.ptr_eq(r),
            _ => false,
        })
}
