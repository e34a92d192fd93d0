use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How long a fetched exchange-rate snapshot stays fresh (4 hours).
pub const RATE_STALE_AFTER_HOURS: i64 = 4;

/// Approximate EUR → USD rate used before the first successful fetch.
pub const DEFAULT_EUR_USD_RATE: f64 = 1.10;

/// A wholesale snapshot of exchange rates versus the EUR base currency.
/// Replaced in full on each successful fetch — never partially merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    /// Currency code → units per 1 EUR (e.g., "USD" → 1.10)
    pub rates: HashMap<String, f64>,

    /// When the snapshot was last fetched successfully
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Default for ExchangeRateSnapshot {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert("EUR".to_string(), 1.0);
        rates.insert("USD".to_string(), DEFAULT_EUR_USD_RATE);
        Self {
            rates,
            fetched_at: None,
        }
    }
}

impl ExchangeRateSnapshot {
    /// Units of `currency` per 1 EUR, falling back to the hardcoded default.
    pub fn rate_vs_base(&self, currency: &str) -> f64 {
        let upper = currency.to_uppercase();
        if upper == "EUR" {
            return 1.0;
        }
        self.rates.get(&upper).copied().unwrap_or_else(|| {
            if upper == "USD" {
                DEFAULT_EUR_USD_RATE
            } else {
                1.0
            }
        })
    }

    /// True when no fetch has succeeded yet, or the last one is older
    /// than the refresh threshold.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            None => true,
            Some(at) => now - at > Duration::hours(RATE_STALE_AFTER_HOURS),
        }
    }
}
