//! Binance market data provider implementation.
//!
//! Fetches historical klines from the Binance spot API:
//! - Bars via /api/v3/klines (max 1000 rows per request)
//!
//! Binance signals backpressure with HTTP 429 (rate limited) and HTTP 418
//! (temporary IP ban for continuing to send requests after a 429), which is
//! why the cooldowns in [`ProviderConfig`] differ between the two.
//! API documentation: https://binance-docs.github.io/apidocs/spot/en/

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::models::{Bar, Interval};
use crate::provider::{ProviderAdapter, ProviderConfig};

const BASE_URL: &str = "https://api.binance.com";
const PROVIDER_ID: &str = "BINANCE";

/// Binance rejects unknown symbols with these error codes.
const CODE_INVALID_SYMBOL: i64 = -1121;
const CODE_ILLEGAL_CHARS: i64 = -1100;

/// Error payload returned by Binance on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: Option<i64>,
    msg: Option<String>,
}

/// Binance spot klines provider.
///
/// Stateless apart from the HTTP client; safe to share across calls.
pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

impl BinanceProvider {
    /// Create a new provider against the public Binance API.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    /// Create a provider against a custom base URL (used by tests).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }

    /// Decode one kline row from the array-of-arrays payload.
    ///
    /// Binance returns `[open_time, "open", "high", "low", "close",
    /// "volume", close_time, ...]` with prices as strings.
    fn decode_kline(row: &[Value]) -> Result<Bar, ProviderError> {
        if row.len() < 6 {
            return Err(malformed(format!(
                "Kline row has {} fields, expected at least 6",
                row.len()
            )));
        }

        let timestamp = row[0]
            .as_i64()
            .ok_or_else(|| malformed("Kline open time is not an integer".to_string()))?;

        let mut fields = [0.0_f64; 5];
        for (i, field) in fields.iter_mut().enumerate() {
            let value = &row[i + 1];
            *field = value
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
                .or_else(|| value.as_f64())
                .ok_or_else(|| {
                    malformed(format!("Kline field {} is not numeric: {}", i + 1, value))
                })?;
        }

        Ok(Bar::new(
            timestamp, fields[0], fields[1], fields[2], fields[3], fields[4],
        ))
    }
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn malformed(message: String) -> ProviderError {
    ProviderError::Malformed {
        provider: PROVIDER_ID.to_string(),
        message,
    }
}

#[async_trait]
impl ProviderAdapter for BinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn config(&self) -> ProviderConfig {
        ProviderConfig {
            page_row_limit: 1000,
            rate_limit_cooldown: Duration::from_secs(60),
            ban_cooldown: Duration::from_secs(120),
        }
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: i64,
        end_ms: i64,
        limit: usize,
    ) -> Result<Vec<Bar>, ProviderError> {
        let url = format!("{}/api/v3/klines", self.base_url);

        debug!(
            "Binance klines request: {} {} [{}..{}] limit {}",
            symbol, interval, start_ms, end_ms, limit
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval.as_str()),
                ("startTime", &start_ms.to_string()),
                ("endTime", &end_ms.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: PROVIDER_ID.to_string(),
                message: format!("Request failed: {}", e),
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::IM_A_TEAPOT {
            return Err(ProviderError::Banned {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
                if matches!(error.code, Some(CODE_INVALID_SYMBOL) | Some(CODE_ILLEGAL_CHARS)) {
                    return Err(ProviderError::InvalidSymbol(symbol.to_string()));
                }
                if let Some(msg) = error.msg {
                    return Err(ProviderError::Network {
                        provider: PROVIDER_ID.to_string(),
                        message: format!("HTTP {} - {}", status, msg),
                    });
                }
            }

            return Err(ProviderError::Network {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let rows: Vec<Vec<Value>> =
            response
                .json()
                .await
                .map_err(|e| malformed(format!("Undecodable klines payload: {}", e)))?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in &rows {
            bars.push(Self::decode_kline(row)?);
        }

        // The engine relies on ascending pages for cursor advancement.
        if bars.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(malformed("Kline rows are not strictly ascending".to_string()));
        }

        Ok(bars)
    }
}
