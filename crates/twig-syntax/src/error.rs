/// Producer-side contract violations detected while freezing a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("malformed separated sequence: expected a separator at slot {index}, found an element")]
    MissingSeparator { index: usize },
    #[error("malformed separated sequence: expected an element at slot {index}, found a separator")]
    UnexpectedSeparator { index: usize },
}
