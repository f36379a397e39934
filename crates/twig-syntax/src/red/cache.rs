//! Per-node slot caches for materialized children.
//!
//! Each positioned node owns exactly one `ChildCache`, picked once from the
//! shape of its green node. Only node-bearing slots are ever cached: tokens
//! and list separators are cheap to rebuild on every access.

use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use super::config::CacheConfig;
use super::node::{NodeData, SyntaxNode};
use crate::{GreenNode, ListShape, NodeOrToken};

/// Observable state of one cache entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SlotState {
    /// Never materialized, or not a cacheable slot at all.
    Uncached,
    /// Materialized and still reachable.
    Live,
    /// Materialized into a weak entry that has since been reclaimed.
    Evicted,
}

type StrongSlot = OnceLock<SyntaxNode>;

/// Reclaimable entry. `None` means never materialized.
#[derive(Default)]
pub(crate) struct WeakSlot(Mutex<Option<Weak<NodeData>>>);

impl WeakSlot {
    fn get(&self) -> Option<SyntaxNode> {
        self.0.lock().as_ref().and_then(Weak::upgrade).map(SyntaxNode::from_data)
    }

    fn state(&self) -> SlotState {
        match &*self.0.lock() {
            None => SlotState::Uncached,
            Some(handle) if handle.strong_count() > 0 => SlotState::Live,
            Some(_) => SlotState::Evicted,
        }
    }

    /// `make` runs without the lock held; when two callers race, the first
    /// stored wrapper wins and the other one is discarded.
    fn get_or_insert_with(&self, make: impl FnOnce() -> SyntaxNode) -> SyntaxNode {
        if let Some(node) = self.get() {
            return node;
        }
        let node = make();
        let mut handle = self.0.lock();
        if let Some(existing) = handle.as_ref().and_then(Weak::upgrade) {
            return SyntaxNode::from_data(existing);
        }
        if handle.is_some() {
            tracing::trace!(offset = ?node.offset(), "re-materialized an evicted child");
        }
        *handle = Some(Arc::downgrade(&node.data));
        node
    }
}

/// Closed set of cache layouts; dispatch is one tag check.
pub(crate) enum ChildCache {
    /// No slot holds a node.
    Empty,
    One([StrongSlot; 1]),
    Two([StrongSlot; 2]),
    Three([StrongSlot; 3]),
    Four([StrongSlot; 4]),
    Many(Box<[StrongSlot]>),
    ManyWeak(Box<[WeakSlot]>),
    /// One entry per element; separators at odd slots are never cached.
    Separated(Box<[StrongSlot]>),
    SeparatedWeak(Box<[WeakSlot]>),
}

enum Entries<'a> {
    None,
    Strong(&'a [StrongSlot]),
    Weak(&'a [WeakSlot]),
}

impl ChildCache {
    pub(crate) fn select(green: &GreenNode, config: &CacheConfig) -> Self {
        let slot_count = green.slot_count();
        if !green.slots().any(|slot| matches!(slot, Some(NodeOrToken::Node(_)))) {
            return Self::Empty;
        }
        let weak = config.is_weak(green.is_list(), slot_count);
        let cache = if green.list_shape() == Some(ListShape::Separated) {
            let len = slot_count.div_ceil(2);
            if weak {
                Self::SeparatedWeak(weak_slots(len))
            } else {
                Self::Separated(strong_slots(len))
            }
        } else if weak {
            Self::ManyWeak(weak_slots(slot_count))
        } else if slot_count <= config.small_max {
            match slot_count {
                1 => Self::One(Default::default()),
                2 => Self::Two(Default::default()),
                3 => Self::Three(Default::default()),
                4 => Self::Four(Default::default()),
                _ => Self::Many(strong_slots(slot_count)),
            }
        } else {
            Self::Many(strong_slots(slot_count))
        };
        tracing::trace!(kind = ?green.kind(), slot_count, layout = cache.layout(), "selected child cache");
        cache
    }

    pub(crate) fn layout(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::One(_) => "one",
            Self::Two(_) => "two",
            Self::Three(_) => "three",
            Self::Four(_) => "four",
            Self::Many(_) => "many",
            Self::ManyWeak(_) => "many-weak",
            Self::Separated(_) => "separated",
            Self::SeparatedWeak(_) => "separated-weak",
        }
    }

    #[inline]
    fn entries(&self) -> (Entries<'_>, bool) {
        match self {
            Self::Empty => (Entries::None, false),
            Self::One(slots) => (Entries::Strong(slots), false),
            Self::Two(slots) => (Entries::Strong(slots), false),
            Self::Three(slots) => (Entries::Strong(slots), false),
            Self::Four(slots) => (Entries::Strong(slots), false),
            Self::Many(slots) => (Entries::Strong(slots), false),
            Self::ManyWeak(slots) => (Entries::Weak(slots), false),
            Self::Separated(slots) => (Entries::Strong(slots), true),
            Self::SeparatedWeak(slots) => (Entries::Weak(slots), true),
        }
    }

    /// Maps a slot index to its entry, if the slot is cacheable at all.
    #[inline]
    fn entry(&self, slot: usize) -> Option<(Entries<'_>, usize)> {
        let (entries, separated) = self.entries();
        if matches!(entries, Entries::None) {
            return None;
        }
        if separated {
            (slot % 2 == 0).then_some((entries, slot / 2))
        } else {
            Some((entries, slot))
        }
    }

    /// Whether `slot` has an entry (it may still be empty).
    #[inline]
    pub(crate) fn is_cacheable(&self, slot: usize) -> bool {
        self.entry(slot).is_some()
    }

    /// Whether a child stored at `slot` stays alive as long as this cache.
    #[inline]
    pub(crate) fn holds_strongly(&self, slot: usize) -> bool {
        matches!(self.entry(slot), Some((Entries::Strong(_), _)))
    }

    /// Returns the live child at `slot`, without materializing it.
    pub(crate) fn get(&self, slot: usize) -> Option<SyntaxNode> {
        match self.entry(slot)? {
            (Entries::Strong(slots), index) => slots[index].get().cloned(),
            (Entries::Weak(slots), index) => slots[index].get(),
            (Entries::None, _) => None,
        }
    }

    pub(crate) fn state(&self, slot: usize) -> SlotState {
        match self.entry(slot) {
            Some((Entries::Strong(slots), index)) => match slots[index].get() {
                Some(_) => SlotState::Live,
                None => SlotState::Uncached,
            },
            Some((Entries::Weak(slots), index)) => slots[index].state(),
            Some((Entries::None, _)) | None => SlotState::Uncached,
        }
    }

    /// Returns the cached child at `slot` or stores the one built by `make`.
    /// Uncacheable slots get a fresh wrapper every time.
    pub(crate) fn get_or_insert_with(
        &self,
        slot: usize,
        make: impl FnOnce() -> SyntaxNode,
    ) -> SyntaxNode {
        match self.entry(slot) {
            Some((Entries::Strong(slots), index)) => slots[index].get_or_init(make).clone(),
            Some((Entries::Weak(slots), index)) => slots[index].get_or_insert_with(make),
            Some((Entries::None, _)) | None => make(),
        }
    }

    /// Moves every strongly held child out, for iterative teardown.
    pub(crate) fn take_strong(&mut self) -> impl Iterator<Item = SyntaxNode> + '_ {
        let slots: &mut [StrongSlot] = match self {
            Self::One(slots) => slots,
            Self::Two(slots) => slots,
            Self::Three(slots) => slots,
            Self::Four(slots) => slots,
            Self::Many(slots) | Self::Separated(slots) => slots,
            Self::Empty | Self::ManyWeak(_) | Self::SeparatedWeak(_) => &mut [],
        };
        slots.iter_mut().filter_map(OnceLock::take)
    }
}

fn strong_slots(len: usize) -> Box<[StrongSlot]> {
    (0..len).map(|_| OnceLock::new()).collect()
}

fn weak_slots(len: usize) -> Box<[WeakSlot]> {
    (0..len).map(|_| WeakSlot::default()).collect()
}
