/// How long materialized children are kept by their parent.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Retention {
    /// Strong for ordinary nodes, weak for lists of at least
    /// `CacheConfig::weak_list_threshold` slots.
    #[default]
    Auto,
    /// Children stay alive as long as their parent.
    Strong,
    /// Children stay alive only while something else holds them.
    Weak,
}

/// Crossover points for child cache selection.
///
/// These are tuning knobs validated by benchmarks, not semantic contracts:
/// any value yields the same positions and contents.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    /// Nodes with at most this many slots cache children inline.
    pub small_max: usize,
    /// Lists with at least this many slots use weak entries under
    /// `Retention::Auto`.
    pub weak_list_threshold: usize,
    pub retention: Retention,
}

impl CacheConfig {
    /// Largest arity with an inline cache layout.
    pub const MAX_INLINE: usize = 4;

    pub const DEFAULT_WEAK_LIST_THRESHOLD: usize = 1024;

    pub const fn new() -> Self {
        Self {
            small_max: Self::MAX_INLINE,
            weak_list_threshold: Self::DEFAULT_WEAK_LIST_THRESHOLD,
            retention: Retention::Auto,
        }
    }

    /// Values above `MAX_INLINE` are clamped.
    #[must_use]
    pub const fn with_small_max(mut self, small_max: usize) -> Self {
        self.small_max = if small_max > Self::MAX_INLINE { Self::MAX_INLINE } else { small_max };
        self
    }

    #[must_use]
    pub const fn with_weak_list_threshold(mut self, threshold: usize) -> Self {
        self.weak_list_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// Whether a node of this shape caches children weakly.
    pub(crate) const fn is_weak(&self, is_list: bool, slot_count: usize) -> bool {
        match self.retention {
            Retention::Strong => false,
            Retention::Weak => true,
            Retention::Auto => is_list && slot_count >= self.weak_list_threshold,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}
