use crate::SyntaxKind;

const WORDS: usize = 4;

/// Set of the language kinds `0..256`, buildable in `const` context.
///
/// Reserved kinds lie outside that range and are never members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxSet([u64; WORDS]);

/// Word index and bit mask of `kind`, if it fits in a set.
const fn locate(kind: SyntaxKind) -> Option<(usize, u64)> {
    let word = (kind.0 / u64::BITS as u16) as usize;
    if word >= WORDS {
        return None;
    }
    Some((word, 1 << (kind.0 % u64::BITS as u16)))
}

impl SyntaxSet {
    pub const EMPTY: Self = Self([0; WORDS]);

    /// Panics (at compile time for `const` sets) on a kind outside `0..256`.
    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut words = [0; WORDS];
        let mut i = 0;
        while i < N {
            let Some((word, mask)) = locate(kinds[i]) else {
                panic!("kind out of range for `SyntaxSet`");
            };
            words[word] |= mask;
            i += 1;
        }
        Self(words)
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut word = 0;
        while word < WORDS {
            self.0[word] |= other.0[word];
            word += 1;
        }
        self
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        match locate(kind) {
            Some((word, mask)) => self.0[word] & mask != 0,
            None => false,
        }
    }
}
