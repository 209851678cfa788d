//! Candlecache Market Data Crate
//!
//! Provider-facing boundary of the candlecache engine: the paginated
//! provider contract, its error taxonomy, and the shared bar model.
//!
//! # Overview
//!
//! The acquisition engine (the `candlecache-core` crate) depends only on
//! the [`ProviderAdapter`] trait defined here:
//!
//! ```text
//! +--------------------------+
//! |  AcquisitionCoordinator  |   (candlecache-core)
//! +--------------------------+
//!              |
//!              v
//! +--------------------------+
//! |     ProviderAdapter      |   fetch_page(symbol, interval, start, end, limit)
//! +--------------------------+
//!              |
//!              v
//! +--------------------------+
//! |     BinanceProvider      |   (or any other adapter)
//! +--------------------------+
//! ```
//!
//! Providers return one bounded page of [`Bar`]s per call and classify
//! their failures into [`ProviderError`], whose
//! [`retry_class`](ProviderError::retry_class) drives the fetcher's
//! retry state machine.
//!
//! # Core Types
//!
//! - [`Bar`] - One OHLCV record, keyed by epoch-millisecond open time
//! - [`Interval`] - Bar granularity with its duration ("interval delta")
//! - [`ProviderAdapter`] - The paginated fetch contract
//! - [`ProviderConfig`] - Page row limit and backpressure cooldowns
//! - [`ProviderError`] / [`RetryClass`] - Failure taxonomy and retry policy

pub mod errors;
pub mod models;
pub mod provider;

// Re-export the model types
pub use models::{Bar, Interval};

// Re-export the error taxonomy
pub use errors::{ProviderError, RetryClass};

// Re-export provider types
pub use provider::binance::BinanceProvider;
pub use provider::{create_provider, ProviderAdapter, ProviderConfig, ProviderKind};
