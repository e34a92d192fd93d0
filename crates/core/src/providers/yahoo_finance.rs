use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::position::AssetClass;

use super::traits::{QuoteProvider, SearchResult};

/// Yahoo Finance provider for equity prices — first in the equity
/// fallback chain.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. Not WASM-compatible (native reqwest/tokio connectors), so on
/// WASM targets the key-gated equity providers carry the chain instead.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Equity]
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let upper = symbol.to_uppercase();
        let response = self
            .connector
            .get_latest_quotes(&upper, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Quote request for {upper} failed: {e}"),
            })?;

        let quote = response.last_quote().map_err(|e| CoreError::NotFound {
            provider: "Yahoo Finance".into(),
            symbol: format!("{upper} ({e})"),
        })?;

        Ok(quote.close)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let result = self
            .connector
            .search_ticker(trimmed)
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Search for '{trimmed}' failed: {e}"),
            })?;

        let matches = result
            .quotes
            .iter()
            .map(|item| {
                SearchResult::new(
                    item.symbol.clone(),
                    item.short_name.clone(),
                    AssetClass::Equity,
                    None,
                )
            })
            .collect();
        Ok(matches)
    }

    async fn probe(&self) -> Result<(), CoreError> {
        self.fetch_price("AAPL").await.map(|_| ())
    }
}
