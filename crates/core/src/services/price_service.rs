use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;

use crate::models::portfolio::Portfolio;
use crate::models::position::AssetClass;
use crate::providers::catalog::{self, NOMINAL_BOND_PRICE};
use crate::providers::registry::ProviderRegistry;
use crate::providers::traits::SearchResult;

/// Price aggregator: orchestrates the quote providers per asset class with
/// a deterministic fallback chain.
///
/// Provider failures never escape this service — callers only ever observe
/// "price available" or "price unavailable this cycle". When every provider
/// for a symbol fails, the previously known price is retained; prices never
/// degrade to zero.
///
/// The fallback chain is sequential by design: the next (paid, tighter-quota)
/// provider is only contacted after the previous one failed.
pub struct PriceService {
    registry: ProviderRegistry,
}

impl PriceService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one live provider is available for an asset class.
    pub fn has_provider_for(&self, class: AssetClass) -> bool {
        self.registry.has_provider_for(class)
    }

    /// Names of the providers in the fallback chain for an asset class.
    pub fn provider_names(&self, class: AssetClass) -> Vec<String> {
        self.registry
            .providers_for(class)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Get the current unit price for a symbol, or `None` when no source
    /// could supply one this cycle.
    ///
    /// - Crypto/Equity: walk the fallback chain, first success wins.
    /// - Interest: live provider if one is wired, else the static nominal
    ///   value (there is no live bond market in this design).
    /// - Bank/Savings: always `None` — balances have no market quote.
    pub async fn current_price(&self, symbol: &str, class: AssetClass) -> Option<f64> {
        match class {
            AssetClass::Bank | AssetClass::Savings => None,
            AssetClass::Interest => {
                if self.registry.has_provider_for(AssetClass::Interest) {
                    self.fetch_with_fallback(symbol, class).await
                } else {
                    Some(NOMINAL_BOND_PRICE)
                }
            }
            AssetClass::Crypto | AssetClass::Equity => {
                self.fetch_with_fallback(symbol, class).await
            }
        }
    }

    /// Refresh current prices for every position eligible for live pricing.
    /// Returns the number of positions whose price was updated.
    ///
    /// One symbol's total failure never aborts the batch. Interest-bearing
    /// positions are only refreshed when a live interest provider is wired,
    /// so the static nominal never clobbers accrued value.
    pub async fn refresh_all(&self, portfolio: &mut Portfolio, now: DateTime<Utc>) -> usize {
        let targets: Vec<(String, AssetClass)> = portfolio
            .positions
            .iter()
            .filter(|p| self.eligible_for_refresh(p.class))
            .map(|p| (p.symbol.clone(), p.class))
            .collect();

        let mut updated = 0;
        for (symbol, class) in targets {
            match self.fetch_with_fallback(&symbol, class).await {
                Some(price) => {
                    if let Some(position) = portfolio.find_mut(&symbol, class) {
                        position.current_price = price;
                        position.last_updated = now;
                        updated += 1;
                        debug!("Price updated: {symbol} ({class}) = {price}");
                    }
                }
                None => {
                    // Keep the last known price rather than degrading to zero.
                    debug!("No price available for {symbol} ({class}) this cycle");
                }
            }
        }
        updated
    }

    /// Search for assets matching a symbol or name fragment.
    ///
    /// Blank queries return an empty list. When every remote provider fails
    /// or none is configured for the class, the built-in popular-asset
    /// catalogs answer instead, filtered by substring.
    pub async fn search(&self, query: &str, class: AssetClass) -> Vec<SearchResult> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        for provider in self.registry.providers_for(class) {
            match provider.search(trimmed).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {
                    debug!("{} returned no matches for '{trimmed}'", provider.name());
                }
                Err(e) => {
                    warn!("Search on {} failed: {e}", provider.name());
                }
            }
        }

        catalog::search_builtin(trimmed, class)
    }

    /// Issue one lightweight probe per configured provider and report
    /// reachability without throwing.
    pub async fn test_all_providers(&self) -> HashMap<String, bool> {
        let mut status = HashMap::new();
        for provider in self.registry.all() {
            let reachable = match provider.probe().await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Probe of {} failed: {e}", provider.name());
                    false
                }
            };
            status.insert(provider.name().to_string(), reachable);
        }
        status
    }

    /// Whether `refresh_all` should fetch a live price for this class.
    fn eligible_for_refresh(&self, class: AssetClass) -> bool {
        match class {
            AssetClass::Crypto | AssetClass::Equity => self.registry.has_provider_for(class),
            AssetClass::Interest => self.registry.has_provider_for(AssetClass::Interest),
            AssetClass::Bank | AssetClass::Savings => false,
        }
    }

    /// Walk the fallback chain for a class, stopping at the first provider
    /// that returns a usable (finite, non-negative) price. Failures are
    /// logged and swallowed.
    async fn fetch_with_fallback(&self, symbol: &str, class: AssetClass) -> Option<f64> {
        for provider in self.registry.providers_for(class) {
            match provider.fetch_price(symbol).await {
                Ok(price) if price.is_finite() && price >= 0.0 => {
                    return Some(price);
                }
                Ok(price) => {
                    warn!(
                        "{} returned unusable price {price} for {symbol}, trying next provider",
                        provider.name()
                    );
                }
                Err(e) => {
                    warn!(
                        "{} failed for {symbol}: {e}, trying next provider",
                        provider.name()
                    );
                }
            }
        }
        None
    }
}
