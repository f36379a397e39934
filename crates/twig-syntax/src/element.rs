/// A slot's content in either tree layer: a node, or a leaf token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        if let Self::Node(node) = self { Some(node) } else { None }
    }

    pub fn into_token(self) -> Option<T> {
        if let Self::Token(token) = self { Some(token) } else { None }
    }

    pub fn as_node(&self) -> Option<&N> {
        self.as_ref().into_node()
    }

    pub fn as_token(&self) -> Option<&T> {
        self.as_ref().into_token()
    }

    pub fn as_ref(&self) -> NodeOrToken<&N, &T> {
        match self {
            Self::Node(node) => NodeOrToken::Node(node),
            Self::Token(token) => NodeOrToken::Token(token),
        }
    }
}

/// Tokens touching an offset, in text order.
///
/// An offset strictly inside a token touches only that token; an offset on
/// the boundary of two non-empty tokens touches both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenAtOffset<T> {
    None,
    Single(T),
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// The token starting at the offset when there are two.
    pub fn right_biased(mut self) -> Option<T> {
        self.next_back()
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (first, rest) = match std::mem::replace(self, Self::None) {
            Self::None => return None,
            Self::Single(token) => (token, Self::None),
            Self::Between(left, right) => (left, Self::Single(right)),
        };
        *self = rest;
        Some(first)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = match self {
            Self::None => 0,
            Self::Single(_) => 1,
            Self::Between(..) => 2,
        };
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for TokenAtOffset<T> {
    fn next_back(&mut self) -> Option<T> {
        let (last, rest) = match std::mem::replace(self, Self::None) {
            Self::None => return None,
            Self::Single(token) => (token, Self::None),
            Self::Between(left, right) => (right, Self::Single(left)),
        };
        *self = rest;
        Some(last)
    }
}

impl<T> ExactSizeIterator for TokenAtOffset<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_yields_left_then_right() {
        let tokens = TokenAtOffset::Between("a", "b");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.clone().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(tokens.clone().rev().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(tokens.right_biased(), Some("b"));
        assert_eq!(TokenAtOffset::Single("a").right_biased(), Some("a"));
        assert_eq!(TokenAtOffset::<&str>::None.right_biased(), None);
    }

    #[test]
    fn variant_accessors() {
        let node: NodeOrToken<u8, &str> = NodeOrToken::Node(1);
        assert_eq!(node.as_node(), Some(&1));
        assert_eq!(node.as_token(), None);
        assert_eq!(NodeOrToken::<u8, &str>::Token("t").into_token(), Some("t"));
    }
}
