use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::position::AssetClass;

use super::traits::{QuoteProvider, SearchResult};

const BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub API provider for equity prices — second in the equity chain.
///
/// - **Free tier**: 60 calls/minute.
/// - **Requires**: API key (settings key "finnhub"), passed as `token`.
/// - **Endpoints**: `/quote` for current prices, `/search` for lookup.
///
/// Finnhub reports `c = 0` for unknown symbols rather than an error status.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }
}

// ── Finnhub API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct QuoteResponse {
    /// Current price
    #[serde(rename = "c")]
    current: f64,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    symbol: String,
    description: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &str {
        "Finnhub"
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Equity]
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let upper = symbol.to_uppercase();
        let url = format!("{BASE_URL}/quote");
        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", upper.as_str()), ("token", self.api_key.as_str())])
            .send()
            .await?;

        if resp.status().as_u16() == 429 {
            return Err(CoreError::RateLimited {
                provider: "Finnhub".into(),
            });
        }

        let quote: QuoteResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: "Finnhub".into(),
            message: format!("Failed to parse quote for {upper}: {e}"),
        })?;

        // Zero means the symbol is unknown, not that the stock is worthless.
        if quote.current <= 0.0 {
            return Err(CoreError::NotFound {
                provider: "Finnhub".into(),
                symbol: upper,
            });
        }

        Ok(quote.current)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{BASE_URL}/search");
        let resp: SearchResponse = self
            .client
            .get(&url)
            .query(&[("q", trimmed), ("token", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Finnhub".into(),
                message: format!("Failed to parse search for '{trimmed}': {e}"),
            })?;

        let matches = resp
            .result
            .iter()
            .map(|entry| {
                SearchResult::new(
                    entry.symbol.clone(),
                    entry.description.clone(),
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
