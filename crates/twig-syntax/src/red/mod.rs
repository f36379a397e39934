//! Positioned layer: lazily materialized wrappers adding offsets and parent
//! links over green nodes.

mod cache;
mod config;
mod node;
mod position;
mod preorder;
mod token;

pub use cache::SlotState;
pub use config::{CacheConfig, Retention};
pub use node::{SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxNodeChildren};
pub use preorder::{PreorderWithTokens, WalkEvent};
pub use token::SyntaxToken;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_send_sync() {
        fn f<T: Send + Sync>() {}
        f::<SyntaxNode>();
        f::<SyntaxToken>();
        f::<SyntaxElement>();
    }
}
