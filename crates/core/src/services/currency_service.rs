use chrono::{DateTime, Utc};
use log::warn;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::rates::ExchangeRateSnapshot;

const RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest/EUR";

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Converts amounts between the EUR base currency and display currencies
/// using a periodically refreshed exchange-rate snapshot.
///
/// Fetch failures never reach display callers: the last good snapshot (or
/// the hardcoded default before the first fetch) keeps answering, and the
/// failure is only visible through `last_error()` for UI diagnostics.
pub struct CurrencyService {
    client: Client,
    snapshot: ExchangeRateSnapshot,
    last_error: Option<String>,
}

impl CurrencyService {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            snapshot: ExchangeRateSnapshot::default(),
            last_error: None,
        }
    }

    /// Convert an amount between two currencies. Identity when they match;
    /// otherwise goes through the EUR base rate (multiply into the target,
    /// divide out of the source).
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        if from == to {
            return amount;
        }
        let from_rate = self.snapshot.rate_vs_base(&from);
        let to_rate = self.snapshot.rate_vs_base(&to);
        amount / from_rate * to_rate
    }

    /// Refetch the snapshot when it has gone stale (older than 4 hours or
    /// never fetched). Returns `true` when a fresh snapshot was installed.
    ///
    /// On failure the previous snapshot is retained wholesale and the error
    /// is recorded for diagnostics — never raised.
    pub async fn refresh_if_stale(&mut self, now: DateTime<Utc>) -> bool {
        if !self.snapshot.is_stale(now) {
            return false;
        }
        self.refresh(now).await
    }

    /// Unconditionally attempt a refresh. Same failure policy as
    /// `refresh_if_stale`.
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> bool {
        match self.fetch_rates().await {
            Ok(rates) => {
                // Replaced wholesale — never partially merged.
                self.snapshot = ExchangeRateSnapshot {
                    rates,
                    fetched_at: Some(now),
                };
                self.last_error = None;
                true
            }
            Err(e) => {
                warn!("Exchange-rate refresh failed, keeping previous rates: {e}");
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    /// The current snapshot (live, cached, or default).
    pub fn snapshot(&self) -> &ExchangeRateSnapshot {
        &self.snapshot
    }

    /// Install a snapshot directly (restore from persistence, tests).
    pub fn set_snapshot(&mut self, snapshot: ExchangeRateSnapshot) {
        self.snapshot = snapshot;
    }

    /// The most recent fetch failure, if the current snapshot is a holdover.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    async fn fetch_rates(&self) -> Result<HashMap<String, f64>, CoreError> {
        let resp: RatesResponse = self
            .client
            .get(RATES_URL)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "ExchangeRate-API".into(),
                message: format!("Failed to parse rates: {e}"),
            })?;

        if resp.rates.is_empty() {
            return Err(CoreError::Api {
                provider: "ExchangeRate-API".into(),
                message: "Empty rate table".into(),
            });
        }
        Ok(resp.rates)
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
