//! Two-layer syntax tree storage.
//!
//! The canonical (green) layer is immutable, position-independent and shared
//! freely across threads and across trees. The positioned (red) layer is
//! materialized lazily on top of it and adds absolute offsets, parent links
//! and node identity. Positioned children are kept in per-node slot caches
//! whose retention strategy is chosen from the node's shape.

mod annotation;
mod element;
mod error;
mod green;
mod list;
mod red;
mod syntax_kind;
mod syntax_set;

/// Process-wide identity for annotations.
pub use annotation::AnnotationId;
/// Node-or-token wrapper and offset lookup result.
pub use element::{NodeOrToken, TokenAtOffset};
/// Errors reported while freezing lists.
pub use error::BuildError;
/// Canonical tree, builder, interning and traversal.
pub use green::{
    Children, GreenElement, GreenElementRef, GreenNode, GreenPreorder, GreenSlot, GreenToken,
    GreenWalker, ListBuilder, ListBuilderPool, ListShape, NodeCache, Slots,
};
/// Read-only list facades over positioned list nodes.
pub use list::{
    ListSegment, ListSegments, SeparatedElements, SeparatedSyntaxList, Separators, SyntaxList,
    SyntaxListIter,
};
/// Positioned tree API.
pub use red::{
    CacheConfig, PreorderWithTokens, Retention, SlotState, SyntaxElement, SyntaxElementChildren,
    SyntaxNode, SyntaxNodeChildren, SyntaxToken, WalkEvent,
};
/// Token and node kinds.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Re-exported so callers don't need a direct `text-size` dependency.
pub use text_size::{TextRange, TextSize};
