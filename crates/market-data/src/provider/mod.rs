//! Provider adapters and their configuration.

pub mod binance;
mod config;
mod factory;
mod traits;

pub use config::ProviderConfig;
pub use factory::{create_provider, ProviderKind};
pub use traits::ProviderAdapter;
