pub mod errors;
pub mod models;
pub mod providers;
#[cfg(not(target_arch = "wasm32"))]
pub mod scheduler;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use errors::CoreError;
use log::warn;
use models::{
    portfolio::Portfolio,
    position::{AssetClass, InterestKind, Position},
    settings::Settings,
    summary::MonthlySummary,
    transaction::{Ledger, Transaction, TransactionKind},
};
use providers::registry::ProviderRegistry;
use providers::traits::SearchResult;
use services::{
    accrual_service::{AccrualReceipt, AccrualService},
    currency_service::CurrencyService,
    finance_service::FinanceService,
    ledger_service::LedgerService,
    portfolio_service::PortfolioService,
    price_service::PriceService,
};
use storage::manager::StorageManager;

/// The portfolio snapshot as persisted: positions plus the settings that
/// travel with them. The ledger is a separate snapshot so losing one file
/// never takes the other down with it.
#[derive(Serialize, Deserialize, Default)]
struct PortfolioStore {
    portfolio: Portfolio,
    settings: Settings,
}

/// Main entry point for the MoneyTrack core library.
/// Holds the portfolio, the ledger, and all services needed to operate
/// on them. Every mutating command goes position book first, ledger
/// recorder second, so a rejected mutation never leaves a stray entry.
#[must_use]
pub struct MoneyTrack {
    portfolio: Portfolio,
    ledger: Ledger,
    settings: Settings,
    portfolio_service: PortfolioService,
    price_service: PriceService,
    accrual_service: AccrualService,
    ledger_service: LedgerService,
    finance_service: FinanceService,
    currency_service: CurrencyService,
    storage: StorageManager,
    /// Tracks whether the portfolio snapshot has unsaved mutations.
    portfolio_dirty: bool,
    /// Tracks whether the ledger snapshot has unsaved mutations.
    ledger_dirty: bool,
}

impl std::fmt::Debug for MoneyTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoneyTrack")
            .field("positions", &self.portfolio.positions.len())
            .field("transactions", &self.ledger.transactions.len())
            .field("settings", &self.settings)
            .field("portfolio_dirty", &self.portfolio_dirty)
            .field("ledger_dirty", &self.ledger_dirty)
            .finish()
    }
}

impl MoneyTrack {
    /// Create a brand new empty tracker with default settings.
    pub fn create_new() -> Self {
        Self::build(Portfolio::default(), Ledger::default(), Settings::default())
    }

    /// Create a tracker pre-populated with a small sample portfolio,
    /// for first-run demos and UI development.
    pub fn create_seeded() -> Self {
        let now = Utc::now();
        let mut tracker = Self::create_new();

        let seed = |t: &mut Self, symbol: &str, name: &str, class, qty, cost, rate, kind| {
            // Seeding failures would mean the seed data itself is invalid.
            if let Err(e) = t.portfolio_service.add_or_merge(
                &mut t.portfolio,
                symbol,
                name,
                class,
                qty,
                cost,
                rate,
                kind,
                now,
            ) {
                warn!("Skipping invalid seed position {symbol}: {e}");
            }
        };

        seed(&mut tracker, "CHECKING", "Main Account", AssetClass::Bank, 1.0, 2500.0, None, None);
        seed(&mut tracker, "SAVINGS", "Rainy Day Fund", AssetClass::Savings, 1.0, 5000.0, None, None);
        seed(&mut tracker, "BTC", "Bitcoin", AssetClass::Crypto, 0.5, 35_000.0, None, None);
        seed(&mut tracker, "AAPL", "Apple Inc.", AssetClass::Equity, 10.0, 150.0, None, None);
        seed(
            &mut tracker,
            "CA",
            "Savings Certificates Series A",
            AssetClass::Interest,
            1.0,
            3000.0,
            Some(2.5),
            Some(InterestKind::Investment),
        );

        // Give the market-priced seeds a price distinct from cost so the
        // P&L columns show something.
        let _ = tracker
            .portfolio_service
            .apply_price(&mut tracker.portfolio, "SAVINGS", AssetClass::Savings, 5150.0, now);
        let _ = tracker
            .portfolio_service
            .apply_price(&mut tracker.portfolio, "BTC", AssetClass::Crypto, 37_500.0, now);
        let _ = tracker
            .portfolio_service
            .apply_price(&mut tracker.portfolio, "AAPL", AssetClass::Equity, 155.0, now);

        tracker.portfolio_dirty = true;
        tracker
    }

    /// Load a tracker from encrypted snapshot bytes (password required).
    /// Either snapshot may be absent (fresh install, or one file lost) —
    /// the missing store starts empty. A present-but-unreadable snapshot
    /// is an error; use `load_or_default` for the forgiving variant.
    pub fn load_from_bytes(
        portfolio_bytes: Option<&[u8]>,
        ledger_bytes: Option<&[u8]>,
        password: &str,
    ) -> Result<Self, CoreError> {
        let storage = StorageManager::new();
        let store: PortfolioStore = match portfolio_bytes {
            Some(bytes) => storage.load_from_bytes(bytes, password)?,
            None => PortfolioStore::default(),
        };
        let ledger: Ledger = match ledger_bytes {
            Some(bytes) => storage.load_from_bytes(bytes, password)?,
            None => Ledger::default(),
        };
        Ok(Self::build(store.portfolio, ledger, store.settings))
    }

    /// Like `load_from_bytes`, but an unreadable snapshot degrades to an
    /// empty store (with a warning) instead of failing the whole load.
    /// The two stores degrade independently.
    pub fn load_or_default(
        portfolio_bytes: Option<&[u8]>,
        ledger_bytes: Option<&[u8]>,
        password: &str,
    ) -> Self {
        let storage = StorageManager::new();
        let store: PortfolioStore = match portfolio_bytes {
            Some(bytes) => storage.load_from_bytes(bytes, password).unwrap_or_else(|e| {
                warn!("Portfolio snapshot unreadable, starting empty: {e}");
                PortfolioStore::default()
            }),
            None => PortfolioStore::default(),
        };
        let ledger: Ledger = match ledger_bytes {
            Some(bytes) => storage.load_from_bytes(bytes, password).unwrap_or_else(|e| {
                warn!("Ledger snapshot unreadable, starting empty: {e}");
                Ledger::default()
            }),
            None => Ledger::default(),
        };
        Self::build(store.portfolio, ledger, store.settings)
    }

    /// Save the portfolio (positions + settings) to encrypted bytes.
    /// Clears the portfolio unsaved-changes flag on success.
    pub fn save_portfolio_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let store = PortfolioStore {
            portfolio: self.portfolio.clone(),
            settings: self.settings.clone(),
        };
        let bytes = self.storage.save_to_bytes(&store, password)?;
        self.portfolio_dirty = false;
        Ok(bytes)
    }

    /// Save the ledger to encrypted bytes.
    /// Clears the ledger unsaved-changes flag on success.
    pub fn save_ledger_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = self.storage.save_to_bytes(&self.ledger, password)?;
        self.ledger_dirty = false;
        Ok(bytes)
    }

    /// Returns `true` when either store has been modified since the last
    /// save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.portfolio_dirty || self.ledger_dirty
    }

    // ── Positions ───────────────────────────────────────────────────

    /// Acquire an asset: merge into the matching `(symbol, class)` position
    /// or create a new one, and (optionally) record the acquisition in the
    /// ledger. Returns the id of the touched position.
    ///
    /// `record_transaction: false` supports entering pre-existing holdings
    /// without fabricating historical cash movements.
    ///
    /// Interest positions acquired without an explicit rate fall back to
    /// the built-in bond catalog's published rate, when the symbol is known.
    #[allow(clippy::too_many_arguments)]
    pub fn buy_asset(
        &mut self,
        symbol: &str,
        name: &str,
        class: AssetClass,
        quantity: f64,
        unit_cost: f64,
        annual_rate: Option<f64>,
        interest_kind: Option<InterestKind>,
        record_transaction: bool,
    ) -> Result<Uuid, CoreError> {
        let now = Utc::now();
        let annual_rate = if class == AssetClass::Interest && annual_rate.is_none() {
            providers::catalog::bond_rate(symbol)
        } else {
            annual_rate
        };
        let id = self.portfolio_service.add_or_merge(
            &mut self.portfolio,
            symbol,
            name,
            class,
            quantity,
            unit_cost,
            annual_rate,
            interest_kind,
            now,
        )?;
        self.portfolio_dirty = true;

        if record_transaction {
            // The position exists by construction at this point.
            if let Some(position) = self.portfolio.find_by_id(id) {
                let position = position.clone();
                if self
                    .ledger_service
                    .record_acquisition(&mut self.ledger, &position, quantity, unit_cost, now)?
                    .is_some()
                {
                    self.ledger_dirty = true;
                }
            }
        }
        Ok(id)
    }

    /// Delete a position by id. Ledger history is untouched.
    pub fn remove_position(&mut self, id: Uuid) -> Result<Position, CoreError> {
        let removed = self.portfolio_service.remove(&mut self.portfolio, id)?;
        self.portfolio_dirty = true;
        Ok(removed)
    }

    /// Set the balance of a cash-like position directly (reconciling
    /// against a bank statement). No ledger entry is produced.
    pub fn update_balance(&mut self, id: Uuid, new_balance: f64) -> Result<(), CoreError> {
        self.portfolio_service
            .update_balance(&mut self.portfolio, id, new_balance, Utc::now())?;
        self.portfolio_dirty = true;
        Ok(())
    }

    /// Deposit cash into a bank/savings position and record it as income.
    pub fn deposit_cash(&mut self, id: Uuid, amount: f64) -> Result<(), CoreError> {
        let now = Utc::now();
        self.portfolio_service
            .deposit(&mut self.portfolio, id, amount, now)?;
        self.portfolio_dirty = true;

        if let Some(position) = self.portfolio.find_by_id(id) {
            let position = position.clone();
            self.ledger_service
                .record_cash_deposit(&mut self.ledger, &position, amount, now)?;
            self.ledger_dirty = true;
        }
        Ok(())
    }

    /// Withdraw cash from a bank/savings position. Rejected outright when
    /// the balance does not cover the amount — no entry, no mutation.
    pub fn withdraw_cash(&mut self, id: Uuid, amount: f64) -> Result<(), CoreError> {
        let now = Utc::now();
        self.portfolio_service
            .withdraw(&mut self.portfolio, id, amount, now)?;
        self.portfolio_dirty = true;

        if let Some(position) = self.portfolio.find_by_id(id) {
            let position = position.clone();
            self.ledger_service
                .record_cash_withdrawal(&mut self.ledger, &position, amount, now)?;
            self.ledger_dirty = true;
        }
        Ok(())
    }

    /// Move cash between two cash-like positions. Recorded as two linked
    /// entries of the same amount; net portfolio value is unchanged.
    pub fn transfer_cash(&mut self, from: Uuid, to: Uuid, amount: f64) -> Result<(), CoreError> {
        if from == to {
            return Err(CoreError::Validation(
                "Cannot transfer a position to itself".into(),
            ));
        }
        let now = Utc::now();

        // Both sides must be valid cash accounts before anything moves.
        self.portfolio_service.cash_balance(&self.portfolio, to)?;
        self.portfolio_service
            .withdraw(&mut self.portfolio, from, amount, now)?;
        self.portfolio_service
            .deposit(&mut self.portfolio, to, amount, now)?;
        self.portfolio_dirty = true;

        let from_position = self
            .portfolio
            .find_by_id(from)
            .cloned()
            .ok_or_else(|| CoreError::PositionNotFound(from.to_string()))?;
        let to_position = self
            .portfolio
            .find_by_id(to)
            .cloned()
            .ok_or_else(|| CoreError::PositionNotFound(to.to_string()))?;
        self.ledger_service.record_transfer(
            &mut self.ledger,
            &from_position,
            &to_position,
            amount,
            now,
        )?;
        self.ledger_dirty = true;
        Ok(())
    }

    /// Get a position by id.
    #[must_use]
    pub fn get_position(&self, id: Uuid) -> Option<&Position> {
        self.portfolio.find_by_id(id)
    }

    /// All positions, in insertion order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.portfolio.positions
    }

    /// Current balance of a cash-like position.
    pub fn cash_balance(&self, id: Uuid) -> Result<f64, CoreError> {
        self.portfolio_service.cash_balance(&self.portfolio, id)
    }

    // ── Prices & Interest ───────────────────────────────────────────

    /// Refresh current prices for every live-priced position.
    /// Returns the number of positions updated; total failure of one
    /// symbol never aborts the batch or zeroes a price.
    pub async fn refresh_prices(&mut self) -> usize {
        let updated = self
            .price_service
            .refresh_all(&mut self.portfolio, Utc::now())
            .await;
        if updated > 0 {
            self.portfolio_dirty = true;
        }
        updated
    }

    /// Run the monthly interest check over all interest-bearing positions,
    /// crediting and recording whatever is due at `now`. Safe to call at
    /// any frequency — the calendar-month gate makes it idempotent.
    pub fn process_interest_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Vec<AccrualReceipt>, CoreError> {
        let receipts = self.accrual_service.process_all(&mut self.portfolio, now);
        if receipts.is_empty() {
            return Ok(receipts);
        }
        self.portfolio_dirty = true;
        for receipt in &receipts {
            self.ledger_service
                .record_interest(&mut self.ledger, receipt, now)?;
        }
        self.ledger_dirty = true;
        Ok(receipts)
    }

    /// `process_interest_at` with the current wall clock.
    pub fn process_interest(&mut self) -> Result<Vec<AccrualReceipt>, CoreError> {
        self.process_interest_at(Utc::now())
    }

    /// Search for assets matching a symbol or name fragment.
    pub async fn search_assets(&self, query: &str, class: AssetClass) -> Vec<SearchResult> {
        self.price_service.search(query, class).await
    }

    /// Probe every configured quote provider and report reachability.
    pub async fn test_providers(&self) -> HashMap<String, bool> {
        self.price_service.test_all_providers().await
    }

    /// Check if at least one live provider can quote an asset class.
    #[must_use]
    pub fn is_provider_available(&self, class: AssetClass) -> bool {
        self.price_service.has_provider_for(class)
    }

    // ── Ledger ──────────────────────────────────────────────────────

    /// Record a manual income entry.
    pub fn record_income(
        &mut self,
        category: &str,
        amount: f64,
        description: &str,
    ) -> Result<Uuid, CoreError> {
        let id = self.ledger_service.record_manual(
            &mut self.ledger,
            TransactionKind::Income,
            category,
            amount,
            description,
            Utc::now(),
        )?;
        self.ledger_dirty = true;
        Ok(id)
    }

    /// Record a manual expense entry.
    pub fn record_expense(
        &mut self,
        category: &str,
        amount: f64,
        description: &str,
    ) -> Result<Uuid, CoreError> {
        let id = self.ledger_service.record_manual(
            &mut self.ledger,
            TransactionKind::Expense,
            category,
            amount,
            description,
            Utc::now(),
        )?;
        self.ledger_dirty = true;
        Ok(id)
    }

    /// Remove a transaction by id. Position state is never touched.
    pub fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        let removed = self.ledger_service.remove(&mut self.ledger, id)?;
        self.ledger_dirty = true;
        Ok(removed)
    }

    /// All transactions, newest-first.
    #[must_use]
    pub fn transactions(&self) -> Vec<&Transaction> {
        let mut all: Vec<&Transaction> = self.ledger.transactions.iter().collect();
        all.reverse(); // internal storage is append-ordered (oldest-first)
        all
    }

    /// Transactions inside one calendar month, newest-first.
    #[must_use]
    pub fn transactions_for_month(&self, year: i32, month: u32) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self
            .finance_service
            .transactions_in_month(&self.ledger, year, month)
            .collect();
        txs.reverse();
        txs
    }

    /// Aggregate one calendar month of ledger activity.
    #[must_use]
    pub fn monthly_summary(&self, year: i32, month: u32) -> MonthlySummary {
        self.finance_service.monthly_summary(&self.ledger, year, month)
    }

    /// Total interest credited in a calendar month.
    #[must_use]
    pub fn monthly_interest_earned(&self, year: i32, month: u32) -> f64 {
        self.finance_service
            .monthly_interest_earned(&self.ledger, year, month)
    }

    /// Fraction of the monthly budget consumed by the month's expenses.
    #[must_use]
    pub fn budget_utilization(&self, year: i32, month: u32) -> f64 {
        self.finance_service
            .budget_utilization(&self.ledger, year, month)
    }

    /// Set the monthly spending budget (0 clears it).
    pub fn set_monthly_budget(&mut self, budget: f64) -> Result<(), CoreError> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(CoreError::Validation(format!(
                "Budget must be a non-negative number, got {budget}"
            )));
        }
        self.ledger.monthly_budget = budget;
        self.ledger_dirty = true;
        Ok(())
    }

    /// Add a category label for manual entries.
    pub fn add_category(&mut self, category: impl Into<String>) {
        self.ledger_service.add_category(&mut self.ledger, category);
        self.ledger_dirty = true;
    }

    /// The category labels offered for manual entries.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.ledger.categories
    }

    // ── Aggregates ──────────────────────────────────────────────────

    /// Total market value of the whole portfolio, in the base currency.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.portfolio.total_value()
    }

    /// Total cost basis of the whole portfolio.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.portfolio.total_cost()
    }

    /// Unrealized profit/loss across the whole portfolio.
    #[must_use]
    pub fn total_profit_loss(&self) -> f64 {
        self.portfolio.total_profit_loss()
    }

    /// Unrealized P&L as a percentage of total cost basis.
    #[must_use]
    pub fn total_profit_loss_pct(&self) -> f64 {
        self.portfolio.total_profit_loss_pct()
    }

    /// Combined market value of one asset class.
    #[must_use]
    pub fn class_subtotal(&self, class: AssetClass) -> f64 {
        self.portfolio.class_subtotal(class)
    }

    // ── Currency ────────────────────────────────────────────────────

    /// Refresh the exchange-rate snapshot when it has gone stale.
    /// Returns `true` when fresh rates were installed; failures keep the
    /// previous (or default) rates and never raise.
    pub async fn refresh_exchange_rates(&mut self) -> bool {
        self.currency_service.refresh_if_stale(Utc::now()).await
    }

    /// Convert a base-currency amount into the configured display currency.
    #[must_use]
    pub fn convert_to_display(&self, amount: f64) -> f64 {
        self.currency_service
            .convert(amount, &self.settings.base_currency, &self.settings.display_currency)
    }

    /// Set the display currency (3-letter code).
    pub fn set_display_currency(&mut self, currency: &str) -> Result<(), CoreError> {
        let trimmed = currency.trim().to_uppercase();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Validation(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters"
            )));
        }
        self.settings.display_currency = trimmed;
        self.portfolio_dirty = true;
        Ok(())
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Settings / API Keys ─────────────────────────────────────────

    /// Set an API key for a provider (e.g., "coinmarketcap", "finnhub").
    /// Rebuilds the provider registry so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.settings.api_keys.insert(provider, key);
        self.rebuild_price_service();
        self.portfolio_dirty = true;
    }

    /// Remove an API key. Rebuilds the provider registry on removal.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.rebuild_price_service();
            self.portfolio_dirty = true;
        }
        removed
    }

    // ── Internal ────────────────────────────────────────────────────

    fn rebuild_price_service(&mut self) {
        let registry = ProviderRegistry::new_with_defaults(&self.settings.api_keys);
        self.price_service = PriceService::new(registry);
    }

    fn build(portfolio: Portfolio, ledger: Ledger, settings: Settings) -> Self {
        let registry = ProviderRegistry::new_with_defaults(&settings.api_keys);
        Self {
            portfolio,
            ledger,
            settings,
            portfolio_service: PortfolioService::new(),
            price_service: PriceService::new(registry),
            accrual_service: AccrualService::new(),
            ledger_service: LedgerService::new(),
            finance_service: FinanceService::new(),
            currency_service: CurrencyService::new(),
            storage: StorageManager::new(),
            portfolio_dirty: false,
            ledger_dirty: false,
        }
    }
}
