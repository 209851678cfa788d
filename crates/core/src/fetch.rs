//! Paginated range fetching with retry, cooldown, and backoff.
//!
//! One [`PaginatedFetcher::fetch`] call walks a single missing range in
//! provider-bounded pages. Failure handling is an explicit transition
//! function ([`next_step`]) over the provider's
//! [`RetryClass`](candlecache_market_data::RetryClass) rather than nested
//! retry loops, so every transition can be unit tested without a clock:
//!
//! ```text
//! Requesting ──ok, full page──► advance cursor, inter-page delay ──► Requesting
//!     │ ok, short or empty page
//!     ▼
//!   Done
//!     │ error
//!     ▼
//! next_step ──Fatal──────────────────────► Aborted (whole acquisition)
//!     │ Cooldown/Backoff, attempts left ──► timed wait ──► Requesting
//!     │ attempts exhausted ──────────────► Aborted (this range only)
//! ```
//!
//! All waits are `tokio::time::sleep`, so tests run under paused time.

use std::time::Duration;

use log::{debug, warn};
use tokio::time::{sleep, Instant};

use crate::reconcile::{Anchor, FetchRange};
use crate::settings::AcquisitionSettings;
use candlecache_market_data::{
    Bar, Interval, ProviderAdapter, ProviderConfig, ProviderError, RetryClass,
};

/// Counters accumulated while fetching.
///
/// `api_calls` counts every attempt including failed ones; `total_latency`
/// sums the wall time of successful calls only. The two deliberately use
/// different rules - see the fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchMetrics {
    /// Page attempts issued, successful or not.
    pub api_calls: u32,
    /// Re-entries after a retryable failure.
    pub retries: u32,
    /// Rows accepted from successful pages.
    pub rows_fetched: u64,
    /// Summed duration of successful calls only.
    pub total_latency: Duration,
}

impl FetchMetrics {
    /// Fold another range's metrics into this one.
    pub fn absorb(&mut self, other: &FetchMetrics) {
        self.api_calls += other.api_calls;
        self.retries += other.retries;
        self.rows_fetched += other.rows_fetched;
        self.total_latency += other.total_latency;
    }
}

/// How a range fetch ended, when it did not end cleanly.
#[derive(Clone, Debug)]
pub enum FetchError {
    /// Non-retryable provider error. Aborts the whole acquisition.
    Fatal(ProviderError),
    /// Retry budget exhausted for this range. Other ranges may still
    /// proceed.
    RetriesExhausted {
        /// Which range gave up
        anchor: Anchor,
        /// The final error observed
        last: ProviderError,
    },
}

/// Everything a range fetch produced.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Bars accepted before the fetch ended. May be non-empty even on
    /// error - pages fetched before the failure are kept.
    pub bars: Vec<Bar>,
    /// Counters for this range.
    pub metrics: FetchMetrics,
    /// Set when the fetch aborted.
    pub error: Option<FetchError>,
}

/// Retry bookkeeping for the page currently being requested.
///
/// Lives only for the duration of one page fetch: a successful page
/// resets it.
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    max_attempts: u32,
    last_error: Option<ProviderError>,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            last_error: None,
        }
    }

    fn reset(&mut self) {
        self.attempt = 0;
        self.last_error = None;
    }
}

/// What the fetcher should do after a failed page attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Step {
    /// Wait, then re-enter Requesting.
    RetryAfter(Duration),
    /// Abort the whole acquisition.
    AbortFatal(ProviderError),
    /// Abort this range; retry budget is spent.
    AbortExhausted(ProviderError),
}

/// The failure transition of the state machine.
///
/// Pure apart from mutating `retry`; contains no waiting, which keeps it
/// exhaustively testable.
fn next_step(
    error: &ProviderError,
    retry: &mut RetryState,
    provider_cfg: &ProviderConfig,
    settings: &AcquisitionSettings,
) -> Step {
    if error.retry_class() == RetryClass::Fatal {
        return Step::AbortFatal(error.clone());
    }

    retry.attempt += 1;
    retry.last_error = Some(error.clone());

    if retry.attempt >= retry.max_attempts {
        return Step::AbortExhausted(error.clone());
    }

    let wait = match error.retry_class() {
        RetryClass::Cooldown => match error {
            ProviderError::Banned { .. } => provider_cfg.ban_cooldown,
            _ => provider_cfg.rate_limit_cooldown,
        },
        RetryClass::Backoff => settings.base_backoff * retry.attempt,
        RetryClass::Fatal => unreachable!("handled above"),
    };

    Step::RetryAfter(wait)
}

/// Walks one missing range in provider-bounded pages.
pub struct PaginatedFetcher<'a> {
    provider: &'a dyn ProviderAdapter,
    settings: &'a AcquisitionSettings,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(provider: &'a dyn ProviderAdapter, settings: &'a AcquisitionSettings) -> Self {
        Self { provider, settings }
    }

    /// Fetch every page of `range`, sequentially.
    ///
    /// Termination:
    /// - a page shorter than the provider's row limit (range exhausted)
    /// - an empty page before `range.end` (provider has no more data;
    ///   not an error)
    /// - the cursor advancing past `range.end`
    /// - a fatal error or an exhausted retry budget
    ///
    /// A non-empty page whose last row sits behind the cursor cannot
    /// advance it and is rejected as malformed; it never reaches the
    /// accumulated bars.
    ///
    /// Duplicate boundary rows across consecutive pages are tolerated
    /// here; the merger deduplicates.
    pub async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        range: &FetchRange,
    ) -> FetchOutcome {
        let provider_cfg = self.provider.config();
        let limit = provider_cfg.page_row_limit;

        let mut metrics = FetchMetrics::default();
        let mut bars: Vec<Bar> = Vec::new();
        let mut cursor = range.start;
        let mut retry = RetryState::new(self.settings.max_attempts);

        debug!(
            "Fetching {} range [{}, {}] for {} {} (page limit {})",
            range.anchor, range.start, range.end, symbol, interval, limit
        );

        loop {
            metrics.api_calls += 1;
            let started = Instant::now();

            let page = self
                .provider
                .fetch_page(symbol, interval, cursor, range.end, limit)
                .await
                .and_then(|rows| match rows.last() {
                    // A page whose last row sits behind the cursor can
                    // never advance it; reject the page instead of
                    // re-requesting the same window.
                    Some(last) if last.timestamp < cursor => Err(ProviderError::Malformed {
                        provider: self.provider.id().to_string(),
                        message: format!(
                            "page ended at {} behind cursor {}",
                            last.timestamp, cursor
                        ),
                    }),
                    _ => Ok(rows),
                });

            match page {
                Ok(rows) => {
                    metrics.total_latency += started.elapsed();
                    retry.reset();

                    if rows.is_empty() {
                        // Provider has no more data in this window.
                        debug!(
                            "Empty page at cursor {}; {} range done early",
                            cursor, range.anchor
                        );
                        break;
                    }

                    let page_len = rows.len();
                    let last_timestamp = rows[page_len - 1].timestamp;
                    metrics.rows_fetched += page_len as u64;
                    bars.extend(rows);

                    if page_len < limit {
                        // Short page: the range is exhausted.
                        break;
                    }

                    cursor = last_timestamp + 1;
                    if cursor > range.end {
                        break;
                    }

                    sleep(self.settings.page_delay).await;
                }
                Err(error) => match next_step(&error, &mut retry, &provider_cfg, self.settings) {
                    Step::AbortFatal(error) => {
                        warn!(
                            "Fatal provider error on {} range for {}: {}",
                            range.anchor, symbol, error
                        );
                        return FetchOutcome {
                            bars,
                            metrics,
                            error: Some(FetchError::Fatal(error)),
                        };
                    }
                    Step::AbortExhausted(error) => {
                        warn!(
                            "Giving up on {} range for {} after {} attempts: {}",
                            range.anchor, symbol, retry.attempt, error
                        );
                        return FetchOutcome {
                            bars,
                            metrics,
                            error: Some(FetchError::RetriesExhausted {
                                anchor: range.anchor,
                                last: error,
                            }),
                        };
                    }
                    Step::RetryAfter(wait) => {
                        metrics.retries += 1;
                        warn!(
                            "Attempt {}/{} on {} range for {} failed ({}); retrying in {:?}",
                            retry.attempt,
                            retry.max_attempts,
                            range.anchor,
                            symbol,
                            error,
                            wait
                        );
                        sleep(wait).await;
                    }
                },
            }
        }

        FetchOutcome {
            bars,
            metrics,
            error: None,
        }
    }
}
