//! Acquisition orchestration.
//!
//! One [`AcquisitionCoordinator::acquire`] call runs the fixed pipeline:
//! load cache, reconcile ranges, fetch each missing range sequentially,
//! merge, persist (policy permitting), slice. The coordinator owns the
//! merged table for the duration of the call and nothing survives the
//! call except what was written back to disk.
//!
//! Persist policy: the cache file is rewritten only when every range
//! fetch completed without error and new rows actually arrived. A fatal
//! provider error or a range-scoped retry exhaustion leaves the disk
//! cache untouched.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::errors::AcquisitionError;
use crate::fetch::{FetchError, FetchMetrics, PaginatedFetcher};
use crate::merge::combine;
use crate::reconcile::reconcile;
use crate::settings::AcquisitionSettings;
use crate::slice::slice;
use crate::store::{CacheKey, CacheStore};
use crate::table::BarTable;
use candlecache_market_data::{create_provider, Bar, Interval, ProviderAdapter, ProviderKind};

/// Counters for one acquisition, aggregated across all fetched ranges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcquisitionMetrics {
    /// Page attempts issued, successful or not.
    pub api_calls: u32,
    /// Re-entries after retryable failures.
    pub retries: u32,
    /// Rows accepted from the provider.
    pub rows_fetched: u64,
    /// Summed duration of successful provider calls only.
    pub total_latency: Duration,
    /// Duplicate rows dropped during the merge.
    pub duplicates_removed: usize,
}

impl AcquisitionMetrics {
    fn absorb(&mut self, fetch: &FetchMetrics) {
        self.api_calls += fetch.api_calls;
        self.retries += fetch.retries;
        self.rows_fetched += fetch.rows_fetched;
        self.total_latency += fetch.total_latency;
    }
}

/// What an acquisition returns. Every exit path produces one of these;
/// the engine never raises past its caller.
#[derive(Debug)]
pub struct AcquisitionResult {
    /// The requested window, sliced from the merged table. May be empty.
    pub table: BarTable,
    /// True when the pipeline ran but no rows fell inside the window.
    /// Distinguishes "no data in range" from a failed acquisition, which
    /// sets `error` instead.
    pub no_data: bool,
    /// Aggregated counters.
    pub metrics: AcquisitionMetrics,
    /// Set when the acquisition failed or completed only partially.
    pub error: Option<AcquisitionError>,
}

/// Orchestrates cache, reconciler, fetcher, merger, and slicer for one
/// (provider, cache directory) pair.
pub struct AcquisitionCoordinator {
    store: CacheStore,
    provider: Arc<dyn ProviderAdapter>,
    settings: AcquisitionSettings,
}

impl AcquisitionCoordinator {
    pub fn new(
        store: CacheStore,
        provider: Arc<dyn ProviderAdapter>,
        settings: AcquisitionSettings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Build a coordinator for a known provider kind.
    ///
    /// The provider is resolved once here, not per call.
    pub fn for_provider(
        cache_dir: impl Into<PathBuf>,
        kind: ProviderKind,
        settings: AcquisitionSettings,
    ) -> Self {
        Self::new(CacheStore::new(cache_dir), create_provider(kind), settings)
    }

    /// Acquire bars for `[start, end]` (epoch ms, inclusive), fetching
    /// only what the cache does not already cover.
    pub async fn acquire(
        &self,
        symbol: &str,
        interval: Interval,
        start: i64,
        end: i64,
    ) -> AcquisitionResult {
        let mut metrics = AcquisitionMetrics::default();

        // Reject bad windows before any network call.
        if start >= end {
            return AcquisitionResult {
                table: BarTable::empty(),
                no_data: true,
                metrics,
                error: Some(AcquisitionError::InvalidDateRange { start, end }),
            };
        }

        let symbol = self.provider.normalize_symbol(symbol);
        let key = CacheKey::new(self.provider.id(), symbol.clone(), interval);

        let (cache_table, cache_meta) = match self.store.load(&key) {
            Some((table, meta)) => (Some(table), Some(meta)),
            None => (None, None),
        };

        let ranges = reconcile(start, end, cache_meta.as_ref(), Some(interval.delta_ms()));

        if ranges.is_empty() {
            // Fully covered: serve from cache, zero network calls.
            info!(
                "Request [{}, {}] for {} fully covered by cache",
                start,
                end,
                key.source_key()
            );
            let cache = cache_table.unwrap_or_else(BarTable::empty);
            let sliced = slice(&cache, start, end);
            return AcquisitionResult {
                table: sliced.table,
                no_data: sliced.empty,
                metrics,
                error: None,
            };
        }

        info!(
            "Acquiring {} range(s) for {}: {:?}",
            ranges.len(),
            key.source_key(),
            ranges
                .iter()
                .map(|r| (r.anchor, r.start, r.end))
                .collect::<Vec<_>>()
        );

        let fetcher = PaginatedFetcher::new(self.provider.as_ref(), &self.settings);
        let mut chunks: Vec<Vec<Bar>> = Vec::new();
        let mut range_failures: Vec<AcquisitionError> = Vec::new();
        let total_ranges = ranges.len();

        for range in &ranges {
            let outcome = fetcher.fetch(&symbol, interval, range).await;
            metrics.absorb(&outcome.metrics);

            if !outcome.bars.is_empty() {
                chunks.push(outcome.bars);
            }

            match outcome.error {
                None => {}
                Some(FetchError::Fatal(error)) => {
                    // Abort the whole acquisition; disk cache untouched.
                    let empty = BarTable::empty();
                    let sliced = slice(cache_table.as_ref().unwrap_or(&empty), start, end);
                    return AcquisitionResult {
                        table: sliced.table,
                        no_data: sliced.empty,
                        metrics,
                        error: Some(AcquisitionError::ProviderFatal(error)),
                    };
                }
                Some(FetchError::RetriesExhausted { anchor, last }) => {
                    // Range-scoped: remaining ranges still get their shot.
                    range_failures.push(AcquisitionError::RetriesExhausted { anchor, last });
                }
            }
        }

        let fetched_rows = metrics.rows_fetched;
        let (merged, duplicates_removed) = combine(cache_table.as_ref(), &chunks);
        metrics.duplicates_removed = duplicates_removed;

        let mut error = match range_failures.len() {
            0 => None,
            // A single failed range is surfaced as itself; several (or a
            // mix with successes) as a partial-fetch summary.
            1 if total_ranges == 1 => range_failures.pop(),
            failed => Some(AcquisitionError::PartialFetch {
                failed,
                total: total_ranges,
            }),
        };

        // Persist only a clean, enlarged merge.
        if error.is_none() && fetched_rows > 0 && !merged.is_empty() {
            if let Err(save_error) = self.store.save(&key, &merged) {
                warn!(
                    "Failed to persist cache for {}: {}",
                    key.source_key(),
                    save_error
                );
                error = Some(save_error);
            }
        }

        let sliced = slice(&merged, start, end);

        info!(
            "Acquisition for {} done: {} rows in window, {} api calls, {} retries, {} new rows",
            key.source_key(),
            sliced.table.len(),
            metrics.api_calls,
            metrics.retries,
            fetched_rows
        );

        AcquisitionResult {
            table: sliced.table,
            no_data: sliced.empty,
            metrics,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use candlecache_market_data::{Bar, ProviderConfig, ProviderError};

    /// Provider that always answers with an empty page, counting calls.
    struct EmptyPageProvider {
        calls: AtomicU32,
    }

    impl EmptyPageProvider {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for EmptyPageProvider {
        fn id(&self) -> &'static str {
            "BINANCE"
        }

        fn config(&self) -> ProviderConfig {
            ProviderConfig::default()
        }

        async fn fetch_page(
            &self,
            _symbol: &str,
            _interval: Interval,
            _start_ms: i64,
            _end_ms: i64,
            _limit: usize,
        ) -> Result<Vec<Bar>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn bar(ts: i64) -> Bar {
        Bar::new(ts, 1.0, 2.0, 0.5, 1.5, 10.0)
    }

    #[tokio::test]
    async fn test_invalid_range_rejected_before_any_call() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(EmptyPageProvider::new());
        let coordinator = AcquisitionCoordinator::new(
            CacheStore::new(dir.path()),
            provider.clone(),
            AcquisitionSettings::default(),
        );

        let result = coordinator
            .acquire("BTCUSDT", Interval::OneDay, 5000, 5000)
            .await;

        assert!(matches!(
            result.error,
            Some(AcquisitionError::InvalidDateRange { .. })
        ));
        assert_eq!(result.metrics.api_calls, 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fully_covered_request_makes_no_calls() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheKey::new("BINANCE", "BTCUSDT", Interval::OneDay);
        let day = Interval::OneDay.delta_ms();
        let table =
            BarTable::try_new((0..=30).map(|d| bar(d * day)).collect()).unwrap();
        store.save(&key, &table).unwrap();

        let provider = Arc::new(EmptyPageProvider::new());
        let coordinator = AcquisitionCoordinator::new(
            CacheStore::new(dir.path()),
            provider.clone(),
            AcquisitionSettings::default(),
        );

        let result = coordinator
            .acquire("BTCUSDT", Interval::OneDay, 5 * day, 10 * day)
            .await;

        assert!(result.error.is_none());
        assert!(!result.no_data);
        assert_eq!(result.table.coverage(), Some((5 * day, 10 * day)));
        assert_eq!(result.metrics.api_calls, 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_with_no_data_reports_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(EmptyPageProvider::new());
        let coordinator = AcquisitionCoordinator::new(
            CacheStore::new(dir.path()),
            provider.clone(),
            AcquisitionSettings::default(),
        );

        let result = coordinator
            .acquire("BTCUSDT", Interval::OneDay, 0, 10_000)
            .await;

        assert!(result.error.is_none());
        assert!(result.no_data);
        assert!(result.table.is_empty());
        // One full-range fetch was attempted and came back empty.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        // Nothing to persist.
        assert!(!CacheStore::new(dir.path())
            .path_for(&CacheKey::new("BINANCE", "BTCUSDT", Interval::OneDay))
            .exists());
    }
}
