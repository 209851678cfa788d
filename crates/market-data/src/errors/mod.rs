//! Error types and retry classification for provider calls.
//!
//! This module provides:
//! - [`ProviderError`]: The error enum for all provider page fetches
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching a page of bars from a provider.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the
/// paginated fetcher reacts to the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider rate limited the request (HTTP 429-equivalent).
    /// Retry after the provider's rate-limit cooldown.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider temporarily banned the client (HTTP 418-equivalent).
    /// Retry after the provider's (longer) ban cooldown.
    #[error("Temporarily banned: {provider}")]
    Banned {
        /// The provider that banned the client
        provider: String,
    },

    /// The requested symbol is unknown to the provider.
    /// This is a terminal error - retrying won't help, and it aborts
    /// the whole acquisition rather than a single range.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// A network-level failure while communicating with the provider
    /// (connect error, timeout, reset mid-body).
    #[error("Network error: {provider} - {message}")]
    Network {
        /// The provider the request was sent to
        provider: String,
        /// Description of the network failure
        message: String,
    },

    /// The provider responded, but the payload could not be decoded
    /// into bars (unexpected shape, unparseable numbers, rows out of order).
    #[error("Malformed response: {provider} - {message}")]
    Malformed {
        /// The provider that returned the payload
        provider: String,
        /// Description of what failed to decode
        message: String,
    },
}

impl ProviderError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Fatal`]: Abort the acquisition immediately
    /// - [`RetryClass::Cooldown`]: Wait a fixed provider cooldown, then retry
    /// - [`RetryClass::Backoff`]: Retry with linear backoff
    ///
    /// # Examples
    ///
    /// ```
    /// use candlecache_market_data::errors::{ProviderError, RetryClass};
    ///
    /// let error = ProviderError::RateLimited { provider: "BINANCE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Cooldown);
    ///
    /// let error = ProviderError::InvalidSymbol("NOTACOIN".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Fatal);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Terminal - the symbol itself is wrong
            Self::InvalidSymbol(_) => RetryClass::Fatal,

            // Provider asked us to slow down - fixed cooldown
            Self::RateLimited { .. } | Self::Banned { .. } => RetryClass::Cooldown,

            // Transient - linear backoff
            Self::Network { .. } | Self::Malformed { .. } => RetryClass::Backoff,
        }
    }

    /// The provider id this error originated from, when known.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::RateLimited { provider }
            | Self::Banned { provider }
            | Self::Network { provider, .. }
            | Self::Malformed { provider, .. } => Some(provider),
            Self::InvalidSymbol(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_symbol_is_fatal() {
        let error = ProviderError::InvalidSymbol("NOTACOIN".to_string());
        assert_eq!(error.retry_class(), RetryClass::Fatal);
    }

    #[test]
    fn test_rate_limited_retries_after_cooldown() {
        let error = ProviderError::RateLimited {
            provider: "BINANCE".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Cooldown);
    }

    #[test]
    fn test_banned_retries_after_cooldown() {
        let error = ProviderError::Banned {
            provider: "BINANCE".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Cooldown);
    }

    #[test]
    fn test_network_retries_with_backoff() {
        let error = ProviderError::Network {
            provider: "BINANCE".to_string(),
            message: "connection reset".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Backoff);
    }

    #[test]
    fn test_malformed_retries_with_backoff() {
        let error = ProviderError::Malformed {
            provider: "BINANCE".to_string(),
            message: "kline row too short".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Backoff);
    }

    #[test]
    fn test_error_display() {
        let error = ProviderError::InvalidSymbol("NOTACOIN".to_string());
        assert_eq!(format!("{}", error), "Invalid symbol: NOTACOIN");

        let error = ProviderError::RateLimited {
            provider: "BINANCE".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: BINANCE");
    }

    #[test]
    fn test_provider_accessor() {
        let error = ProviderError::Banned {
            provider: "BINANCE".to_string(),
        };
        assert_eq!(error.provider(), Some("BINANCE"));
        assert_eq!(
            ProviderError::InvalidSymbol("X".to_string()).provider(),
            None
        );
    }
}
