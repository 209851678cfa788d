//! Candlecache Core Crate
//!
//! Incremental acquisition and cache reconciliation for historical OHLCV
//! bars: load and validate a prior cache, compute the minimal missing
//! time ranges for a request, fetch those ranges from a paginated
//! rate-limited provider with retry and backoff, merge with
//! deduplication, persist atomically, and return the exact requested
//! slice.
//!
//! # Pipeline
//!
//! ```text
//! AcquisitionCoordinator::acquire
//!       │
//!       ├─► CacheStore::load          (corrupt cache => treated as absent)
//!       ├─► reconcile                 (0-2 missing FetchRanges)
//!       ├─► PaginatedFetcher::fetch   (per range, sequentially)
//!       ├─► combine                   (sort + dedup, cache wins ties)
//!       ├─► CacheStore::save          (atomic, only on clean new data)
//!       └─► slice                     (exact requested window)
//! ```
//!
//! The pipeline is synchronous and sequential by design: at most one
//! provider call in flight, ranges fetched one after another, because
//! provider rate limits are typically IP-scoped. The engine assumes
//! single-writer access per cache key; callers running concurrent
//! acquisitions for the same key must serialize externally.
//!
//! # Core Types
//!
//! - [`AcquisitionCoordinator`] / [`AcquisitionResult`] - entry point
//! - [`CacheStore`] / [`CacheKey`] - per-key columnar cache files
//! - [`BarTable`] / [`CacheMetadata`] - validated timestamp-indexed tables
//! - [`FetchRange`] / [`Anchor`] - missing sub-ranges relative to coverage
//! - [`FetchMetrics`] / [`AcquisitionMetrics`] - observability counters
//! - [`AcquisitionError`] - the caller-visible failure taxonomy

pub mod acquire;
pub mod errors;
pub mod fetch;
pub mod merge;
pub mod reconcile;
pub mod settings;
pub mod slice;
pub mod store;
pub mod table;

pub use acquire::{AcquisitionCoordinator, AcquisitionMetrics, AcquisitionResult};
pub use errors::AcquisitionError;
pub use fetch::{FetchError, FetchMetrics, FetchOutcome, PaginatedFetcher};
pub use merge::combine;
pub use reconcile::{reconcile, Anchor, FetchRange};
pub use settings::AcquisitionSettings;
pub use slice::{slice, SlicedTable};
pub use store::{CacheKey, CacheStore};
pub use table::{BarTable, CacheMetadata, TableError};
