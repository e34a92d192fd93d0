use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::position::AssetClass;

use super::traits::{QuoteProvider, SearchResult};

const BASE_URL: &str = "https://api.twelvedata.com";

/// Twelve Data API provider for equity prices — third in the equity chain.
///
/// - **Free tier**: 800 calls/day, 8 calls/minute.
/// - **Requires**: API key (settings key "twelvedata"), passed as `apikey`.
/// - **Endpoints**: `/price` for quotes, `/symbol_search` for lookup.
///
/// Errors arrive as HTTP 200 bodies carrying `code`/`message` fields,
/// so both shapes are decoded from the same payload.
pub struct TwelveDataProvider {
    client: Client,
    api_key: String,
}

impl TwelveDataProvider {
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

// ── Twelve Data API response types ──────────────────────────────────

#[derive(Deserialize)]
struct PriceResponse {
    price: Option<String>,
    code: Option<u16>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct SymbolSearchResponse {
    #[serde(default)]
    data: Vec<SymbolEntry>,
}

#[derive(Deserialize)]
struct SymbolEntry {
    symbol: String,
    instrument_name: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for TwelveDataProvider {
    fn name(&self) -> &str {
        "Twelve Data"
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Equity]
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let upper = symbol.to_uppercase();
        let url = format!("{BASE_URL}/price");
        let resp: PriceResponse = self
            .client
            .get(&url)
            .query(&[("symbol", upper.as_str()), ("apikey", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Twelve Data".into(),
                message: format!("Failed to parse price for {upper}: {e}"),
            })?;

        match resp.code {
            Some(429) => {
                return Err(CoreError::RateLimited {
                    provider: "Twelve Data".into(),
                })
            }
            Some(404) => {
                return Err(CoreError::NotFound {
                    provider: "Twelve Data".into(),
                    symbol: upper,
                })
            }
            Some(code) => {
                return Err(CoreError::Api {
                    provider: "Twelve Data".into(),
                    message: format!(
                        "Error {code} for {upper}: {}",
                        resp.message.unwrap_or_default()
                    ),
                })
            }
            None => {}
        }

        resp.price
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .ok_or_else(|| CoreError::Api {
                provider: "Twelve Data".into(),
                message: format!("No price in response for {upper}"),
            })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{BASE_URL}/symbol_search");
        let resp: SymbolSearchResponse = self
            .client
            .get(&url)
            .query(&[("symbol", trimmed), ("apikey", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Twelve Data".into(),
                message: format!("Failed to parse search for '{trimmed}': {e}"),
            })?;

        let matches = resp
            .data
            .iter()
            .map(|entry| {
                SearchResult::new(
                    entry.symbol.clone(),
                    entry.instrument_name.clone(),
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
