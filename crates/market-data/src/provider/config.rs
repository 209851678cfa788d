//! Provider pagination and cooldown configuration.

use std::time::Duration;

/// Pagination limits and cooldowns for a provider.
///
/// Treated as immutable configuration by the acquisition engine: the
/// fetcher sizes its page requests with `page_row_limit` and waits
/// `rate_limit_cooldown` / `ban_cooldown` when the provider pushes back.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Maximum rows the provider returns per page request.
    pub page_row_limit: usize,

    /// Fixed wait after an HTTP 429-equivalent before retrying.
    pub rate_limit_cooldown: Duration,

    /// Fixed wait after a temporary ban (HTTP 418-equivalent) before
    /// retrying. Longer than the rate-limit cooldown.
    pub ban_cooldown: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            page_row_limit: 500,
            rate_limit_cooldown: Duration::from_secs(60),
            ban_cooldown: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_cooldown_longer_than_rate_limit() {
        let config = ProviderConfig::default();
        assert!(config.ban_cooldown > config.rate_limit_cooldown);
    }
}
