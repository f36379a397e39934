//! Canonical layer: immutable, position-free nodes and tokens.

mod builder;
mod node;
mod node_cache;
mod walk;

pub use builder::{ListBuilder, ListBuilderPool};
pub use node::{
    Children, GreenElement, GreenElementRef, GreenNode, GreenSlot, GreenToken, ListShape, Slots,
};
pub use node_cache::NodeCache;
pub use walk::{GreenPreorder, GreenWalker};
