//! Acquisition-level error taxonomy.
//!
//! Cache corruption is deliberately absent from this enum: a corrupt or
//! unreadable cache file is degraded to a warning inside
//! [`CacheStore::load`](crate::store::CacheStore::load) and the acquisition
//! proceeds with a full fetch. Only the errors a caller can actually see
//! live here.

use thiserror::Error;

use crate::reconcile::Anchor;
use candlecache_market_data::ProviderError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, AcquisitionError>;

/// Errors surfaced by an acquisition.
///
/// Every acquisition exit path returns an
/// [`AcquisitionResult`](crate::acquire::AcquisitionResult) whose `error`
/// field is one of these - the engine never panics or raises past its
/// caller.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// Rejected before any network call: the requested window is
    /// inverted or empty.
    #[error("Invalid date range: start {start} must precede end {end}")]
    InvalidDateRange {
        /// Requested start, epoch ms
        start: i64,
        /// Requested end, epoch ms
        end: i64,
    },

    /// A non-retryable provider error aborted the whole acquisition.
    /// Nothing was persisted; the prior cache on disk is untouched.
    #[error("Provider fatal error: {0}")]
    ProviderFatal(ProviderError),

    /// One range exhausted its retries. Range-scoped: other ranges may
    /// still have completed.
    #[error("Retries exhausted for {anchor} range: {last}")]
    RetriesExhausted {
        /// Which range failed
        anchor: Anchor,
        /// The final error observed
        last: ProviderError,
    },

    /// One or more ranges failed after retries while others succeeded.
    /// Nothing was persisted; the merge of what did succeed is still
    /// returned alongside this error.
    #[error("Partial fetch: {failed} of {total} ranges failed")]
    PartialFetch {
        /// How many ranges failed
        failed: usize,
        /// How many ranges were attempted
        total: usize,
    },

    /// The cache file could not be written.
    #[error("Cache write failed: {0}")]
    CacheIo(#[from] std::io::Error),

    /// `save` was called with an empty table - a caller contract
    /// violation, not a data condition.
    #[error("Refusing to save empty cache table for {0}")]
    EmptySave(String),
}

impl AcquisitionError {
    /// Whether this error skipped persistence entirely.
    ///
    /// Fatal errors and pre-flight validation failures leave the disk
    /// cache untouched; range-scoped failures also skip the save but may
    /// still carry partial data in the result.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateRange { .. } | Self::ProviderFatal(_)
        )
    }
}
