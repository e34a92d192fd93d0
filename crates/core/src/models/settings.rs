use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-configurable settings, stored inside the encrypted portfolio snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// The reference currency every stored amount is denominated in.
    pub base_currency: String,

    /// Secondary currency used for display conversion.
    pub display_currency: String,

    /// Optional API keys for providers that require them.
    /// Keys: provider id ("coinmarketcap", "finnhub", "twelvedata",
    /// "alphavantage", "exchangerate"). Presence drives availability —
    /// a missing key disables the provider, it never hard-fails.
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: "EUR".to_string(),
            display_currency: "USD".to_string(),
            api_keys: HashMap::new(),
        }
    }
}
