//! Provider construction keyed by an enum.
//!
//! The engine resolves its provider once at coordinator construction time
//! instead of dispatching on a provider-name string per call.

use std::str::FromStr;
use std::sync::Arc;

use super::binance::BinanceProvider;
use super::traits::ProviderAdapter;

/// The set of providers this build knows how to construct.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ProviderKind {
    Binance,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BINANCE" => Ok(Self::Binance),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Construct the adapter for a provider kind.
pub fn create_provider(kind: ProviderKind) -> Arc<dyn ProviderAdapter> {
    match kind {
        ProviderKind::Binance => Arc::new(BinanceProvider::new()),
    }
}
