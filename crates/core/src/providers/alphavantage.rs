use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::position::AssetClass;

use super::traits::{QuoteProvider, SearchResult};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage API provider for equity prices — last resort in the chain.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints), hence lowest
///   priority among the equity providers.
/// - **Requires**: API key (settings key "alphavantage").
/// - **Endpoints**: `GLOBAL_QUOTE` for prices, `SYMBOL_SEARCH` for lookup.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
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

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    /// Present on throttled requests instead of the quote
    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Deserialize)]
struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<SymbolMatch>,
}

#[derive(Deserialize)]
struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Equity]
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let upper = symbol.to_uppercase();
        let resp: GlobalQuoteResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", upper.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Alpha Vantage".into(),
                message: format!("Failed to parse quote for {upper}: {e}"),
            })?;

        if resp.note.is_some() {
            return Err(CoreError::RateLimited {
                provider: "Alpha Vantage".into(),
            });
        }

        resp.global_quote
            .and_then(|q| q.price)
            .and_then(|p| p.parse::<f64>().ok())
            .ok_or_else(|| CoreError::NotFound {
                provider: "Alpha Vantage".into(),
                symbol: upper,
            })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let resp: SymbolSearchResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "SYMBOL_SEARCH"),
                ("keywords", trimmed),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Alpha Vantage".into(),
                message: format!("Failed to parse search for '{trimmed}': {e}"),
            })?;

        let matches = resp
            .best_matches
            .iter()
            .map(|m| SearchResult::new(m.symbol.clone(), m.name.clone(), AssetClass::Equity, None))
            .collect();
        Ok(matches)
    }

    async fn probe(&self) -> Result<(), CoreError> {
        self.fetch_price("AAPL").await.map(|_| ())
    }
}
