// ═══════════════════════════════════════════════════════════════════
// Provider Tests — Registry ordering, fallback chain, search, probes
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use moneytrack_core::errors::CoreError;
use moneytrack_core::models::portfolio::Portfolio;
use moneytrack_core::models::position::{AssetClass, Position};
use moneytrack_core::providers::catalog::{self, NOMINAL_BOND_PRICE};
use moneytrack_core::providers::registry::ProviderRegistry;
use moneytrack_core::providers::traits::{QuoteProvider, SearchResult};
use moneytrack_core::services::price_service::PriceService;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A mock provider answering a fixed price, counting how often it is asked.
struct MockProvider {
    name: String,
    classes: Vec<AssetClass>,
    price: f64,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn new(name: &str, classes: Vec<AssetClass>, price: f64) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.to_string(),
                classes,
                price,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        self.classes.clone()
    }

    async fn fetch_price(&self, _symbol: &str) -> Result<f64, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.price)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        Ok(vec![SearchResult::new(
            query,
            format!("{query} from {}", self.name),
            self.classes[0],
            Some(self.price),
        )])
    }

    async fn probe(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// A mock provider that always fails, counting how often it is asked.
struct FailingProvider {
    name: String,
    classes: Vec<AssetClass>,
    calls: Arc<AtomicUsize>,
}

impl FailingProvider {
    fn new(name: &str, classes: Vec<AssetClass>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.to_string(),
                classes,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl QuoteProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        self.classes.clone()
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CoreError::Api {
            provider: self.name.clone(),
            message: format!("Failed for {symbol}"),
        })
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, CoreError> {
        Err(CoreError::Api {
            provider: self.name.clone(),
            message: "Search failed".into(),
        })
    }

    async fn probe(&self) -> Result<(), CoreError> {
        Err(CoreError::Api {
            provider: self.name.clone(),
            message: "Probe failed".into(),
        })
    }
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// ProviderRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_registry_has_no_providers() {
        let registry = ProviderRegistry::new();
        assert!(!registry.has_provider_for(AssetClass::Crypto));
        assert!(!registry.has_provider_for(AssetClass::Equity));
        assert!(registry.providers_for(AssetClass::Crypto).is_empty());
    }

    #[test]
    fn registration_order_is_fallback_order() {
        let mut registry = ProviderRegistry::new();
        let (first, _) = MockProvider::new("First", vec![AssetClass::Equity], 1.0);
        let (second, _) = MockProvider::new("Second", vec![AssetClass::Equity], 2.0);
        registry.register(Box::new(first));
        registry.register(Box::new(second));

        let names: Vec<&str> = registry
            .providers_for(AssetClass::Equity)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn providers_for_filters_by_class() {
        let mut registry = ProviderRegistry::new();
        let (crypto, _) = MockProvider::new("CryptoOnly", vec![AssetClass::Crypto], 1.0);
        let (equity, _) = MockProvider::new("EquityOnly", vec![AssetClass::Equity], 1.0);
        registry.register(Box::new(crypto));
        registry.register(Box::new(equity));

        assert_eq!(registry.providers_for(AssetClass::Crypto).len(), 1);
        assert_eq!(registry.providers_for(AssetClass::Equity).len(), 1);
        assert!(registry.providers_for(AssetClass::Interest).is_empty());
    }

    #[test]
    fn missing_api_keys_disable_keyed_providers() {
        // No keys at all: crypto has no provider (CoinMarketCap needs a key).
        let registry = ProviderRegistry::new_with_defaults(&HashMap::new());
        assert!(!registry.has_provider_for(AssetClass::Crypto));
        assert!(!registry.has_provider_for(AssetClass::Interest));
    }

    #[test]
    fn crypto_enabled_by_coinmarketcap_key() {
        let mut keys = HashMap::new();
        keys.insert("coinmarketcap".to_string(), "test-key".to_string());
        let registry = ProviderRegistry::new_with_defaults(&keys);
        assert!(registry.has_provider_for(AssetClass::Crypto));
    }
}

// ═══════════════════════════════════════════════════════════════════
// PriceService — fallback chain
// ═══════════════════════════════════════════════════════════════════

mod fallback {
    use super::*;

    #[tokio::test]
    async fn first_success_wins_and_later_providers_are_not_called() {
        let mut registry = ProviderRegistry::new();
        let (a, a_calls) = FailingProvider::new("A", vec![AssetClass::Equity]);
        let (b, b_calls) = MockProvider::new("B", vec![AssetClass::Equity], 185.0);
        let (c, c_calls) = MockProvider::new("C", vec![AssetClass::Equity], 999.0);
        registry.register(Box::new(a));
        registry.register(Box::new(b));
        registry.register(Box::new(c));
        let service = PriceService::new(registry);

        let price = service.current_price("AAPL", AssetClass::Equity).await;
        assert_eq!(price, Some(185.0));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_providers_failing_yields_none() {
        let mut registry = ProviderRegistry::new();
        let (a, _) = FailingProvider::new("A", vec![AssetClass::Crypto]);
        let (b, _) = FailingProvider::new("B", vec![AssetClass::Crypto]);
        registry.register(Box::new(a));
        registry.register(Box::new(b));
        let service = PriceService::new(registry);

        assert_eq!(service.current_price("BTC", AssetClass::Crypto).await, None);
    }

    #[tokio::test]
    async fn cash_classes_never_have_a_market_price() {
        let mut registry = ProviderRegistry::new();
        let (p, calls) = MockProvider::new(
            "Everything",
            vec![AssetClass::Bank, AssetClass::Savings],
            1.0,
        );
        registry.register(Box::new(p));
        let service = PriceService::new(registry);

        assert_eq!(service.current_price("CHECKING", AssetClass::Bank).await, None);
        assert_eq!(service.current_price("SAVINGS", AssetClass::Savings).await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn interest_without_live_provider_quotes_the_nominal() {
        let service = PriceService::new(ProviderRegistry::new());
        assert_eq!(
            service.current_price("CA", AssetClass::Interest).await,
            Some(NOMINAL_BOND_PRICE)
        );
    }

    #[tokio::test]
    async fn refresh_all_updates_priced_positions_and_retains_on_failure() {
        let now = now();
        let mut portfolio = Portfolio::new();
        let mut btc = Position::new("BTC", "Bitcoin", AssetClass::Crypto, 1.0, 30_000.0, now);
        btc.current_price = 31_000.0;
        portfolio.positions.push(btc);
        let mut aapl = Position::new("AAPL", "Apple", AssetClass::Equity, 10.0, 150.0, now);
        aapl.current_price = 155.0;
        portfolio.positions.push(aapl);

        let mut registry = ProviderRegistry::new();
        let (crypto, _) = FailingProvider::new("CryptoDown", vec![AssetClass::Crypto]);
        let (equity, _) = MockProvider::new("EquityUp", vec![AssetClass::Equity], 170.0);
        registry.register(Box::new(crypto));
        registry.register(Box::new(equity));
        let service = PriceService::new(registry);

        let updated = service.refresh_all(&mut portfolio, now).await;
        assert_eq!(updated, 1);
        // Failed symbol keeps its previous price, never zeroed.
        assert_eq!(
            portfolio.find("BTC", AssetClass::Crypto).unwrap().current_price,
            31_000.0
        );
        assert_eq!(
            portfolio.find("AAPL", AssetClass::Equity).unwrap().current_price,
            170.0
        );
    }

    #[tokio::test]
    async fn refresh_all_skips_interest_without_live_provider() {
        let now = now();
        let mut portfolio = Portfolio::new();
        let mut cert = Position::new("CA", "Certificates", AssetClass::Interest, 1.0, 3000.0, now);
        cert.annual_rate = Some(2.5);
        cert.current_price = 3050.0; // accrued value
        portfolio.positions.push(cert);

        let service = PriceService::new(ProviderRegistry::new());
        let updated = service.refresh_all(&mut portfolio, now).await;
        assert_eq!(updated, 0);
        // The nominal must not clobber the accrued value.
        assert_eq!(
            portfolio.find("CA", AssetClass::Interest).unwrap().current_price,
            3050.0
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// PriceService — search & probes
// ═══════════════════════════════════════════════════════════════════

mod search {
    use super::*;

    #[tokio::test]
    async fn blank_query_returns_empty() {
        let mut registry = ProviderRegistry::new();
        let (p, _) = MockProvider::new("Any", vec![AssetClass::Crypto], 1.0);
        registry.register(Box::new(p));
        let service = PriceService::new(registry);

        assert!(service.search("", AssetClass::Crypto).await.is_empty());
        assert!(service.search("   ", AssetClass::Crypto).await.is_empty());
    }

    #[tokio::test]
    async fn remote_results_win_over_the_builtin_catalog() {
        let mut registry = ProviderRegistry::new();
        let (p, _) = MockProvider::new("Remote", vec![AssetClass::Crypto], 42.0);
        registry.register(Box::new(p));
        let service = PriceService::new(registry);

        let results = service.search("BTC", AssetClass::Crypto).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "BTC from Remote");
    }

    #[tokio::test]
    async fn builtin_catalog_answers_when_every_remote_fails() {
        let mut registry = ProviderRegistry::new();
        let (p, _) = FailingProvider::new("Down", vec![AssetClass::Crypto]);
        registry.register(Box::new(p));
        let service = PriceService::new(registry);

        let results = service.search("bitcoin", AssetClass::Crypto).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "BTC");
    }

    #[tokio::test]
    async fn bond_catalog_quotes_the_nominal_value() {
        let service = PriceService::new(ProviderRegistry::new());
        let results = service.search("certificates", AssetClass::Interest).await;
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.price == Some(NOMINAL_BOND_PRICE)));
    }

    #[tokio::test]
    async fn probe_reports_per_provider_reachability() {
        let mut registry = ProviderRegistry::new();
        let (up, _) = MockProvider::new("Up", vec![AssetClass::Equity], 1.0);
        let (down, _) = FailingProvider::new("Down", vec![AssetClass::Crypto]);
        registry.register(Box::new(up));
        registry.register(Box::new(down));
        let service = PriceService::new(registry);

        let status = service.test_all_providers().await;
        assert_eq!(status.get("Up"), Some(&true));
        assert_eq!(status.get("Down"), Some(&false));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Built-in catalog
// ═══════════════════════════════════════════════════════════════════

mod builtin_catalog {
    use super::*;

    #[test]
    fn search_matches_symbol_and_name_case_insensitively() {
        let by_symbol = catalog::search_builtin("aapl", AssetClass::Equity);
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].symbol, "AAPL");

        let by_name = catalog::search_builtin("apple", AssetClass::Equity);
        assert_eq!(by_name.len(), 1);
    }

    #[test]
    fn blank_query_is_empty() {
        assert!(catalog::search_builtin("", AssetClass::Crypto).is_empty());
        assert!(catalog::search_builtin("  ", AssetClass::Equity).is_empty());
    }

    #[test]
    fn cash_classes_have_no_catalog() {
        assert!(catalog::search_builtin("main", AssetClass::Bank).is_empty());
        assert!(catalog::search_builtin("fund", AssetClass::Savings).is_empty());
    }

    #[test]
    fn bond_rate_lookup() {
        assert_eq!(catalog::bond_rate("ca"), Some(2.5));
        assert_eq!(catalog::bond_rate("BTP"), Some(4.2));
        assert_eq!(catalog::bond_rate("NOPE"), None);
    }
}
