use super::node::{SyntaxElementChildren, SyntaxNode};
use super::token::SyntaxToken;
use crate::NodeOrToken;

/// Preorder walk event including tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkEvent {
    EnterNode(SyntaxNode),
    LeaveNode(SyntaxNode),
    Token(SyntaxToken),
}

/// Preorder traversal over nodes and tokens.
///
/// Uses an explicit stack, so arbitrarily deep trees are fine.
#[derive(Clone)]
pub struct PreorderWithTokens {
    stack: Vec<(SyntaxNode, SyntaxElementChildren)>,
    root: Option<SyntaxNode>,
}

impl PreorderWithTokens {
    #[inline]
    fn new(start: SyntaxNode) -> Self {
        Self { stack: Vec::with_capacity(32), root: Some(start) }
    }

    /// Skips the rest of the innermost node that was entered and not yet left.
    /// Its `LeaveNode` event is not emitted.
    #[inline]
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl Iterator for PreorderWithTokens {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root.clone(), root.children_with_tokens()));
            return Some(WalkEvent::EnterNode(root));
        };
        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child.clone(), child.children_with_tokens()));
                Some(WalkEvent::EnterNode(child))
            }
            Some(NodeOrToken::Token(child)) => Some(WalkEvent::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop()?;
                Some(WalkEvent::LeaveNode(exited_node))
            }
        }
    }
}

impl SyntaxNode {
    /// Walks this subtree in preorder, tokens included.
    #[inline]
    pub fn preorder_with_tokens(&self) -> PreorderWithTokens {
        PreorderWithTokens::new(self.clone())
    }

    /// Iterates this node and every node below it, in preorder.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::EnterNode(node) => Some(node),
            WalkEvent::LeaveNode(_) | WalkEvent::Token(_) => None,
        })
    }

    /// Iterates every token below this node, in source order.
    pub fn descendant_tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Token(token) => Some(token),
            WalkEvent::EnterNode(_) | WalkEvent::LeaveNode(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GreenNode, GreenToken, SyntaxKind};

    const ROOT: SyntaxKind = SyntaxKind(1);
    const PAIR: SyntaxKind = SyntaxKind(2);
    const WORD: SyntaxKind = SyntaxKind(3);

    fn word(text: &str) -> Option<crate::GreenElement> {
        Some(GreenToken::new(WORD, text).into())
    }

    fn tree() -> SyntaxNode {
        let pair = GreenNode::new(PAIR, [word("a"), None, word("bc")]);
        SyntaxNode::new_root(GreenNode::new(ROOT, [Some(pair.into()), word("d")]))
    }

    fn render(events: impl Iterator<Item = WalkEvent>) -> Vec<String> {
        events
            .map(|event| match event {
                WalkEvent::EnterNode(node) => format!("enter {:?}", node.text_range()),
                WalkEvent::LeaveNode(node) => format!("leave {:?}", node.text_range()),
                WalkEvent::Token(token) => format!("token {}", token.text()),
            })
            .collect()
    }

    #[test]
    fn walks_nodes_and_tokens() {
        let events = render(tree().preorder_with_tokens());
        assert_eq!(
            events,
            ["enter 0..4", "enter 0..3", "token a", "token bc", "leave 0..3", "token d", "leave 0..4"]
        );
    }

    #[test]
    fn skip_subtree_drops_the_rest_of_a_node() {
        let mut walk = tree().preorder_with_tokens();
        let mut events = Vec::new();
        while let Some(event) = walk.next() {
            let skip = matches!(&event, WalkEvent::EnterNode(node) if node.kind() == PAIR);
            events.push(event);
            if skip {
                walk.skip_subtree();
            }
        }
        assert_eq!(render(events.into_iter()), ["enter 0..4", "enter 0..3", "token d", "leave 0..4"]);
    }

    #[test]
    fn descendant_tokens_cover_the_text() {
        let text: String = tree().descendant_tokens().map(|token| token.text().to_owned()).collect();
        assert_eq!(text, "abcd");
        assert_eq!(tree().descendants().count(), 2);
    }
}
