use std::fmt;

/// Discriminator shared by nodes and tokens.
///
/// Languages define their own constants. `u16::MAX` is reserved for lists.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SyntaxKind(pub u16);

impl SyntaxKind {
    /// Kind of every list node produced by `ListBuilder`.
    pub const LIST: Self = Self(u16::MAX);

    #[inline]
    pub const fn is_list(self) -> bool {
        self.0 == Self::LIST.0
    }
}

impl fmt::Debug for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LIST => f.write_str("LIST"),
            Self(raw) => write!(f, "#{raw}"),
        }
    }
}
