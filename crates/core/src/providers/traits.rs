use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::position::AssetClass;

/// A candidate asset returned by a symbol/name search, for UI-driven selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Ticker symbol, uppercased
    pub symbol: String,
    /// Human-readable name
    pub name: String,
    /// Asset class the candidate belongs to
    pub class: AssetClass,
    /// Unit price at search time, when the provider reports one
    pub price: Option<f64>,
}

impl SearchResult {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        class: AssetClass,
        price: Option<f64>,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            class,
            price,
        }
    }
}

/// Trait abstraction for all external quote providers.
///
/// Each adapter wraps one provider-owned REST contract. If a provider
/// changes or disappears, only that one implementation is replaced —
/// the aggregator and everything above it are untouched.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/diagnostics).
    fn name(&self) -> &str;

    /// Which asset classes this provider can quote.
    fn supported_classes(&self) -> Vec<AssetClass>;

    /// Get the current unit price of a symbol in the base currency.
    async fn fetch_price(&self, symbol: &str) -> Result<f64, CoreError>;

    /// Search the provider for assets matching a symbol or name fragment.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError>;

    /// One lightweight request to check that the provider is reachable
    /// and the configured credentials (if any) are accepted.
    async fn probe(&self) -> Result<(), CoreError>;
}
