//! Acquisition tuning knobs.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(2);
const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(250);

/// Retry and pacing configuration for one acquisition pipeline.
///
/// Provider-side cooldowns (rate limit, ban) are not here - those are
/// provider-specific and live in
/// [`ProviderConfig`](candlecache_market_data::ProviderConfig).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// Maximum attempts per page, counting the first one.
    pub max_attempts: u32,

    /// Base delay for linear backoff on transient errors; attempt `n`
    /// waits `n * base_backoff`.
    pub base_backoff: Duration,

    /// Pause between consecutive successful pages of one range.
    pub page_delay: Duration,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: DEFAULT_BASE_BACKOFF,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}
