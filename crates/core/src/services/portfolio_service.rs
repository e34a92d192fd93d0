use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::position::{AssetClass, InterestKind, Position};

/// The position book: owns every balance-affecting mutation of the
/// `Portfolio` — weighted-average-cost merges, cash balance updates,
/// and price application.
///
/// Pure business logic — no I/O, no network, no ledger calls. The facade
/// coordinates this service with the ledger recorder for each logical event.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Acquire an asset: merge into the existing `(symbol, class)` position
    /// or create a new one. Returns the id of the touched position.
    ///
    /// Merging uses weighted-average cost:
    /// `new_avg = (old_qty × old_avg + qty × cost) / (old_qty + qty)`.
    /// The current price is deliberately left untouched by merges — it is
    /// refreshed separately by the price aggregator. For interest-bearing
    /// positions a freshly supplied rate overwrites the stored one.
    #[allow(clippy::too_many_arguments)]
    pub fn add_or_merge(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
        name: &str,
        class: AssetClass,
        quantity: f64,
        unit_cost: f64,
        annual_rate: Option<f64>,
        interest_kind: Option<InterestKind>,
        now: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        Self::validate_acquisition(symbol, quantity, unit_cost, annual_rate)?;

        if let Some(existing) = portfolio.find_mut(symbol, class) {
            if class.is_cash_like() {
                // Cash accounts track a balance: "buying more" of a bank
                // account means depositing, which raises the balance.
                // Quantity stays pinned at 1.
                existing.current_price += quantity * unit_cost;
                existing.average_cost += quantity * unit_cost;
            } else {
                let total_quantity = existing.quantity + quantity;
                let total_cost = existing.cost_basis() + quantity * unit_cost;
                existing.average_cost = total_cost / total_quantity;
                existing.quantity = total_quantity;
            }

            if class == AssetClass::Interest {
                if annual_rate.is_some() {
                    existing.annual_rate = annual_rate;
                }
                if interest_kind.is_some() {
                    existing.interest_kind = interest_kind;
                }
            }
            return Ok(existing.id);
        }

        let mut position = Position::new(symbol, name, class, quantity, unit_cost, now);
        if class == AssetClass::Interest {
            position.annual_rate = annual_rate;
            position.interest_kind = interest_kind.or(Some(InterestKind::Investment));
        }
        let id = position.id;
        portfolio.positions.push(position);
        Ok(id)
    }

    /// Delete a position by id. No side effect on the ledger.
    pub fn remove(&self, portfolio: &mut Portfolio, id: Uuid) -> Result<Position, CoreError> {
        let idx = portfolio
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::PositionNotFound(id.to_string()))?;
        Ok(portfolio.positions.remove(idx))
    }

    /// Set the balance of a cash-like position directly.
    /// Quantity stays 1; the price IS the balance.
    pub fn update_balance(
        &self,
        portfolio: &mut Portfolio,
        id: Uuid,
        new_balance: f64,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if !new_balance.is_finite() || new_balance < 0.0 {
            return Err(CoreError::Validation(format!(
                "Balance must be a non-negative number, got {new_balance}"
            )));
        }

        let position = portfolio
            .find_by_id_mut(id)
            .ok_or_else(|| CoreError::PositionNotFound(id.to_string()))?;

        if !position.class.is_cash_like() {
            return Err(CoreError::Validation(format!(
                "Cannot set a balance on a {} position — only bank and savings accounts track balances",
                position.class
            )));
        }

        position.current_price = new_balance;
        position.last_updated = now;
        Ok(())
    }

    /// Add to the balance of a cash-like position.
    pub fn deposit(
        &self,
        portfolio: &mut Portfolio,
        id: Uuid,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        Self::validate_cash_amount(amount)?;
        let balance = self.cash_balance(portfolio, id)?;
        self.update_balance(portfolio, id, balance + amount, now)
    }

    /// Take from the balance of a cash-like position.
    /// Rejects before mutating when the balance does not cover the amount.
    pub fn withdraw(
        &self,
        portfolio: &mut Portfolio,
        id: Uuid,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        Self::validate_cash_amount(amount)?;
        let balance = self.cash_balance(portfolio, id)?;
        if balance < amount {
            return Err(CoreError::InsufficientBalance {
                available: balance,
                requested: amount,
            });
        }
        self.update_balance(portfolio, id, balance - amount, now)
    }

    /// Apply a freshly fetched market price to the matching position.
    /// Returns `false` (no-op) when no position matches; rejects prices
    /// that are not finite or are negative.
    pub fn apply_price(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
        class: AssetClass,
        price: f64,
        now: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::Validation(format!(
                "Price must be a non-negative number, got {price}"
            )));
        }

        match portfolio.find_mut(symbol, class) {
            Some(position) => {
                position.current_price = price;
                position.last_updated = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Current balance of a cash-like position.
    pub fn cash_balance(&self, portfolio: &Portfolio, id: Uuid) -> Result<f64, CoreError> {
        let position = portfolio
            .find_by_id(id)
            .ok_or_else(|| CoreError::PositionNotFound(id.to_string()))?;
        if !position.class.is_cash_like() {
            return Err(CoreError::Validation(format!(
                "{} is a {} position, not a cash account",
                position.name, position.class
            )));
        }
        Ok(position.current_price)
    }

    fn validate_acquisition(
        symbol: &str,
        quantity: f64,
        unit_cost: f64,
        annual_rate: Option<f64>,
    ) -> Result<(), CoreError> {
        if symbol.trim().is_empty() {
            return Err(CoreError::Validation("Symbol must not be empty".into()));
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }
        if !unit_cost.is_finite() || unit_cost < 0.0 {
            return Err(CoreError::Validation(format!(
                "Unit cost must be non-negative, got {unit_cost}"
            )));
        }
        if let Some(rate) = annual_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(CoreError::Validation(format!(
                    "Annual interest rate must be non-negative, got {rate}"
                )));
            }
        }
        Ok(())
    }

    fn validate_cash_amount(amount: f64) -> Result<(), CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Amount must be positive, got {amount}"
            )));
        }
        Ok(())
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
