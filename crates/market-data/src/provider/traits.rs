//! Provider adapter trait definition.
//!
//! This module defines the `ProviderAdapter` trait that all market data
//! sources must implement to be usable by the acquisition engine.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{Bar, Interval};

use super::config::ProviderConfig;

/// Trait for paginated historical-bar providers.
///
/// The acquisition engine depends only on this contract: one bounded page
/// of bars per call, plus the pagination limits and cooldowns declared in
/// [`ProviderConfig`]. Everything provider-specific (endpoints, payload
/// shapes, symbol formats) stays behind the implementation.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// A constant string like "BINANCE". Used as the cache source key
    /// and in log messages and errors.
    fn id(&self) -> &'static str;

    /// Pagination and cooldown configuration for this provider.
    fn config(&self) -> ProviderConfig;

    /// Normalize a user-supplied symbol into the provider's form.
    ///
    /// The default strips separators and uppercases, which covers the
    /// common "btc/usdt" -> "BTCUSDT" case.
    fn normalize_symbol(&self, symbol: &str) -> String {
        symbol
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | '_'))
            .collect::<String>()
            .to_uppercase()
    }

    /// Fetch one page of bars.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Provider-form symbol (already normalized)
    /// * `interval` - Bar granularity
    /// * `start_ms` - Start of the page window, epoch ms (inclusive)
    /// * `end_ms` - End of the page window, epoch ms (inclusive)
    /// * `limit` - Maximum rows to return; must not exceed
    ///   `config().page_row_limit`
    ///
    /// # Returns
    ///
    /// Bars ordered by timestamp ascending. An empty vector means the
    /// provider has no data in the window - that is not an error.
    async fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: i64,
        end_ms: i64,
        limit: usize,
    ) -> Result<Vec<Bar>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NormalizerOnly;

    #[async_trait]
    impl ProviderAdapter for NormalizerOnly {
        fn id(&self) -> &'static str {
            "TEST"
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
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_default_symbol_normalizer() {
        let provider = NormalizerOnly;
        assert_eq!(provider.normalize_symbol("btc/usdt"), "BTCUSDT");
        assert_eq!(provider.normalize_symbol("eth-usdt"), "ETHUSDT");
        assert_eq!(provider.normalize_symbol("BTCUSDT"), "BTCUSDT");
    }
}
