//! Construction parameters for `ChainedHashTable`.

/// Bucket count used when none is configured.
pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Average chain length that triggers growth when exceeded.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 1.0;

/// Table configuration.
///
/// Only the bucket count changes over a table's lifetime (it doubles on
/// growth); the load factor is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub(crate) initial_buckets: usize,
    pub(crate) max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKET_COUNT,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of buckets a fresh table starts with.
    ///
    /// Clamped to at least 1.
    #[must_use]
    pub fn initial_buckets(mut self, count: usize) -> Self {
        self.initial_buckets = count.max(1);
        self
    }

    /// Sets the growth threshold for `len / bucket_count`.
    ///
    /// A table holding `n` entries keeps at least `n / ratio` buckets, each
    /// with its own node arena, so very small ratios cost a lot of memory:
    /// at `1e-9` the first `put` alone asks for about a billion buckets.
    ///
    /// # Panics
    ///
    /// Panics if `ratio` is not finite and strictly positive.
    #[must_use]
    pub fn max_load_factor(mut self, ratio: f64) -> Self {
        assert!(
            ratio.is_finite() && ratio > 0.0,
            "max load factor must be finite and > 0"
        );
        self.max_load_factor = ratio;
        self
    }

    pub fn bucket_count(&self) -> usize {
        self.initial_buckets
    }

    pub fn load_factor(&self) -> f64 {
        self.max_load_factor
    }
}
