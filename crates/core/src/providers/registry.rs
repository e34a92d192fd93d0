use std::collections::HashMap;

use crate::models::position::AssetClass;

use super::alphavantage::AlphaVantageProvider;
use super::coinmarketcap::CoinMarketCapProvider;
use super::finnhub::FinnhubProvider;
use super::traits::QuoteProvider;
use super::twelvedata::TwelveDataProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all configured quote providers, in fallback priority order.
///
/// This is the single configuration-resolution point: API keys are checked
/// exactly once, here, at construction. An adapter is either registered
/// (enabled) or absent (disabled) — no per-call key checks anywhere else.
///
/// Registration order IS the fallback order. For equities:
/// Yahoo Finance (no key) → Finnhub → Twelve Data → Alpha Vantage.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with every provider the supplied API keys enable.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();

        // CoinMarketCap — crypto, requires API key
        if let Some(key) = api_keys.get("coinmarketcap") {
            registry.register(Box::new(CoinMarketCapProvider::new(key.clone())));
        }

        // Yahoo Finance — equities, NO API key needed (primary).
        // Not available on WASM (uses native reqwest/tokio connectors).
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(yahoo) = YahooFinanceProvider::new() {
                registry.register(Box::new(yahoo));
            }
        }

        // Finnhub — equities, requires API key (second)
        if let Some(key) = api_keys.get("finnhub") {
            registry.register(Box::new(FinnhubProvider::new(key.clone())));
        }

        // Twelve Data — equities, requires API key (third)
        if let Some(key) = api_keys.get("twelvedata") {
            registry.register(Box::new(TwelveDataProvider::new(key.clone())));
        }

        // Alpha Vantage — equities, requires API key (last, tightest quota)
        if let Some(key) = api_keys.get("alphavantage") {
            registry.register(Box::new(AlphaVantageProvider::new(key.clone())));
        }

        registry
    }

    /// Register a provider at the end of the fallback chain.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// All providers that can quote the given class, in priority order.
    pub fn providers_for(&self, class: AssetClass) -> Vec<&dyn QuoteProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_classes().contains(&class))
            .map(|p| p.as_ref())
            .collect()
    }

    /// True when at least one live provider can quote the class.
    pub fn has_provider_for(&self, class: AssetClass) -> bool {
        self.providers
            .iter()
            .any(|p| p.supported_classes().contains(&class))
    }

    /// Every registered provider, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn QuoteProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
