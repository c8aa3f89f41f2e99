//! Tunables of a split run.

use crate::errors::{Error, Result};

/// Default size of a single read from the source: 16 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024 * 1024;
/// Default number of buffered bytes, across all tables, that triggers a flush.
pub const DEFAULT_FLUSH_BYTES: usize = 16 * 1024 * 1024;
/// Default number of source bytes between two progress events: 64 MiB.
pub const DEFAULT_PROGRESS_STEP: u64 = 64 * 1024 * 1024;

/// When the sink writes its pending statements out.
///
/// Both policies bound peak memory; the threshold is crossed when the total
/// across all tables strictly exceeds the given value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush once more than this many rendered bytes are pending.
    Bytes(usize),
    /// Flush once more than this many statements are pending.
    Statements(usize),
}

impl FlushPolicy {
    /// Returns whether the pending totals cross the threshold.
    #[must_use]
    pub fn should_flush(self, pending_bytes: usize, pending_statements: usize) -> bool {
        match self {
            Self::Bytes(limit) => pending_bytes > limit,
            Self::Statements(limit) => pending_statements > limit,
        }
    }

    fn threshold(self) -> usize {
        match self {
            Self::Bytes(limit) | Self::Statements(limit) => limit,
        }
    }
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self::Bytes(DEFAULT_FLUSH_BYTES)
    }
}

/// Configuration of a split run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    /// Maximum number of bytes requested from the source per read.
    pub chunk_size: usize,
    /// Threshold policy of the sink.
    pub flush_policy: FlushPolicy,
    /// Number of source bytes between two progress events.
    pub progress_step: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            flush_policy: FlushPolicy::default(),
            progress_step: DEFAULT_PROGRESS_STEP,
        }
    }
}

impl SplitConfig {
    /// Sets the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the flush policy.
    #[must_use]
    pub fn with_flush_policy(mut self, flush_policy: FlushPolicy) -> Self {
        self.flush_policy = flush_policy;
        self
    }

    /// Sets the progress step.
    #[must_use]
    pub fn with_progress_step(mut self, progress_step: u64) -> Self {
        self.progress_step = progress_step;
        self
    }

    /// Checks that every tunable is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when a size or threshold is zero.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk size must be greater than zero"));
        }
        if self.flush_policy.threshold() == 0 {
            return Err(Error::InvalidConfig(
                "flush threshold must be greater than zero",
            ));
        }
        if self.progress_step == 0 {
            return Err(Error::InvalidConfig(
                "progress step must be greater than zero",
            ));
        }
        Ok(())
    }
}
