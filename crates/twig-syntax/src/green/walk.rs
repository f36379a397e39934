//! Iterative preorder traversal of a green subtree.

use super::node::{Children, GreenElementRef, GreenNode};
use crate::NodeOrToken;

/// Explicit-stack preorder walker over nodes and tokens.
///
/// Keeps one child iterator per ancestor on the current path, so memory is
/// proportional to depth and deep trees never exhaust the call stack. A walk
/// cannot be resumed from a saved position; start a new one instead.
pub struct GreenWalker<'a> {
    root: Option<GreenElementRef<'a>>,
    current: Option<GreenElementRef<'a>>,
    stack: Vec<Children<'a>>,
}

const DEFAULT_WALK_DEPTH: usize = 64;

impl<'a> GreenWalker<'a> {
    /// Starts a walk whose first element is `root` itself.
    pub fn over(root: GreenElementRef<'a>) -> Self {
        let mut stack = Vec::with_capacity(DEFAULT_WALK_DEPTH);
        if let NodeOrToken::Node(node) = root {
            stack.push(node.children());
        }
        Self { root: Some(root), current: None, stack }
    }

    /// Moves to the next element. Returns `false` once the walk is finished.
    pub fn advance(&mut self) -> bool {
        if let Some(root) = self.root.take() {
            self.current = Some(root);
            return true;
        }
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(next) => {
                    // Children of `next` come before its remaining siblings.
                    if let NodeOrToken::Node(node) = next {
                        self.stack.push(node.children());
                    }
                    self.current = Some(next);
                    return true;
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        self.current = None;
        false
    }

    /// The element reached by the last successful `advance`.
    ///
    /// Panics before the first `advance` and after the walk has finished.
    #[track_caller]
    pub fn current(&self) -> GreenElementRef<'a> {
        match self.current {
            Some(current) => current,
            None => panic!("`GreenWalker::current` called outside of a walk"),
        }
    }

    /// Number of ancestors of the current element inside the walked subtree.
    #[inline]
    pub fn depth(&self) -> usize {
        match self.current {
            Some(NodeOrToken::Node(_)) => self.stack.len().saturating_sub(1),
            _ => self.stack.len(),
        }
    }
}

/// Preorder iterator over a green subtree, the root included.
pub struct GreenPreorder<'a> {
    walker: GreenWalker<'a>,
}

impl<'a> Iterator for GreenPreorder<'a> {
    type Item = GreenElementRef<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.walker.advance().then(|| self.walker.current())
    }
}

impl GreenNode {
    /// Preorder over this node and every node and token below it.
    #[inline]
    pub fn preorder(&self) -> GreenPreorder<'_> {
        GreenPreorder { walker: GreenWalker::over(NodeOrToken::Node(self)) }
    }
}
