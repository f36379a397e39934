//! Absolute offsets of child slots.
//!
//! `slot_offset_from_start` is the reference computation. `slot_offset` may
//! take shortcuts through already materialized neighbors, which makes forward
//! or backward access over wide lists amortized O(1); both always agree.

use text_size::TextSize;

use super::node::SyntaxNode;
use crate::NodeOrToken;

impl SyntaxNode {
    /// Absolute offset of slot `index`. `index == slot_count()` gives the end
    /// of this node.
    ///
    /// Panics if `index > slot_count()`.
    #[track_caller]
    pub fn slot_offset(&self, index: usize) -> TextSize {
        let slot_count = self.slot_count();
        assert!(index <= slot_count, "slot index {index} out of bounds for a node with {slot_count} slots");
        if let Some(relative) = self.green().precomputed_slot_offset(index) {
            return self.offset() + relative;
        }
        if index == slot_count {
            return self.text_range().end();
        }
        self.offset_from_left_neighbor(index)
            .or_else(|| self.offset_from_right_neighbor(index))
            .unwrap_or_else(|| self.slot_offset_from_start(index))
    }

    /// Sums the widths of every slot before `index`.
    #[track_caller]
    pub fn slot_offset_from_start(&self, index: usize) -> TextSize {
        self.offset() + self.green().slot_offset(index)
    }

    /// Derives the offset from the closest cacheable node slot on the left,
    /// if that one is materialized.
    fn offset_from_left_neighbor(&self, index: usize) -> Option<TextSize> {
        let green = self.green();
        let mut gap = TextSize::new(0);
        for candidate in (0..index).rev() {
            match green.slot(candidate) {
                Some(NodeOrToken::Node(_)) if self.cache().is_cacheable(candidate) => {
                    let neighbor = self.cache().get(candidate)?;
                    return Some(neighbor.text_range().end() + gap);
                }
                Some(element) => gap += element.width(),
                None => {}
            }
        }
        None
    }

    /// Derives the offset backwards from the closest cacheable node slot on
    /// the right, if that one is materialized.
    fn offset_from_right_neighbor(&self, index: usize) -> Option<TextSize> {
        let green = self.green();
        let mut gap = green.slot_width(index);
        for candidate in index + 1..self.slot_count() {
            match green.slot(candidate) {
                Some(NodeOrToken::Node(_)) if self.cache().is_cacheable(candidate) => {
                    let neighbor = self.cache().get(candidate)?;
                    return Some(neighbor.offset() - gap);
                }
                Some(element) => gap += element.width(),
                None => {}
            }
        }
        None
    }
}
