use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::position::AssetClass;

use super::traits::{QuoteProvider, SearchResult};

const BASE_URL: &str = "https://pro-api.coinmarketcap.com/v1";

/// CoinMarketCap API provider for cryptocurrency prices.
///
/// - **Free tier**: 10,000 calls/month.
/// - **Requires**: API key (settings key "coinmarketcap"), sent in the
///   `X-CMC_PRO_API_KEY` header.
/// - **Endpoint**: `/cryptocurrency/quotes/latest` with `convert=EUR` so
///   quotes arrive directly in the base currency.
pub struct CoinMarketCapProvider {
    client: Client,
    api_key: String,
}

impl CoinMarketCapProvider {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }

    async fn fetch_quotes(&self, symbols: &str) -> Result<QuotesResponse, CoreError> {
        let url = format!("{BASE_URL}/cryptocurrency/quotes/latest");
        let resp = self
            .client
            .get(&url)
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("symbol", symbols), ("convert", "EUR")])
            .send()
            .await?;

        if resp.status().as_u16() == 429 {
            return Err(CoreError::RateLimited {
                provider: "CoinMarketCap".into(),
            });
        }

        resp.json().await.map_err(|e| CoreError::Api {
            provider: "CoinMarketCap".into(),
            message: format!("Failed to parse quotes for {symbols}: {e}"),
        })
    }
}

// ── CoinMarketCap API response types ────────────────────────────────

#[derive(Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    data: HashMap<String, CryptoEntry>,
}

#[derive(Deserialize)]
struct CryptoEntry {
    name: String,
    symbol: String,
    quote: QuoteBlock,
}

#[derive(Deserialize)]
struct QuoteBlock {
    #[serde(rename = "EUR")]
    eur: PriceInfo,
}

#[derive(Deserialize)]
struct PriceInfo {
    price: f64,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for CoinMarketCapProvider {
    fn name(&self) -> &str {
        "CoinMarketCap"
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Crypto]
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let upper = symbol.to_uppercase();
        let resp = self.fetch_quotes(&upper).await?;

        resp.data
            .get(&upper)
            .map(|entry| entry.quote.eur.price)
            .ok_or_else(|| CoreError::NotFound {
                provider: "CoinMarketCap".into(),
                symbol: upper,
            })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        // CMC's quote endpoint doubles as a search: querying a symbol
        // returns the matching listing if it exists.
        let upper = query.trim().to_uppercase();
        if upper.is_empty() {
            return Ok(Vec::new());
        }

        let resp = self.fetch_quotes(&upper).await?;
        let results = resp
            .data
            .values()
            .map(|entry| {
                SearchResult::new(
                    entry.symbol.clone(),
                    entry.name.clone(),
                    AssetClass::Crypto,
                    Some(entry.quote.eur.price),
                )
            })
            .collect();
        Ok(results)
    }

    async fn probe(&self) -> Result<(), CoreError> {
        self.fetch_price("BTC").await.map(|_| ())
    }
}
