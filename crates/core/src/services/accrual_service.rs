use chrono::{DateTime, Datelike, Utc};

use crate::models::portfolio::Portfolio;
use crate::models::position::{AssetClass, InterestPayment, Position};

/// Details of one credited interest payment, handed to the ledger recorder
/// by the orchestrating caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualReceipt {
    pub symbol: String,
    pub name: String,
    pub annual_rate: f64,
    pub amount: f64,
}

/// Computes and applies monthly interest on interest-bearing positions.
///
/// Payment is gated by calendar-month boundaries, not elapsed duration:
/// a payment made on January 31st is due again on February 1st, while a
/// payment made on March 1st is not due again anywhere inside March.
/// That gate also makes the engine idempotent at any check frequency.
pub struct AccrualService;

impl AccrualService {
    pub fn new() -> Self {
        Self
    }

    /// Is this position due for an interest credit at `now`?
    pub fn is_due(&self, position: &Position, now: DateTime<Utc>) -> bool {
        if position.class != AssetClass::Interest || position.annual_rate.is_none() {
            return false;
        }
        match position.last_interest_payment {
            InterestPayment::NeverPaid => true,
            InterestPayment::PaidAt(last) => {
                now.year() > last.year()
                    || (now.year() == last.year() && now.month() > last.month())
            }
        }
    }

    /// One month of interest on the position's current value:
    /// `quantity × current_price × annual_rate / 12 / 100`.
    /// Zero when the rate is unset or the class is not interest-bearing.
    pub fn monthly_interest(&self, position: &Position) -> f64 {
        if position.class != AssetClass::Interest {
            return 0.0;
        }
        position.market_value() * position.monthly_rate()
    }

    /// Credit one month of interest when due. The interest is folded into
    /// the unit price so the position's value grows (and next month's
    /// interest compounds on it); the payment timestamp moves to `now`.
    ///
    /// Returns the credited amount, or `None` when nothing was due.
    pub fn apply(&self, position: &mut Position, now: DateTime<Utc>) -> Option<f64> {
        if !self.is_due(position, now) {
            return None;
        }
        let interest = self.monthly_interest(position);
        if interest <= 0.0 {
            return None;
        }

        let new_total = position.market_value() + interest;
        position.current_price = new_total / position.quantity;
        position.last_interest_payment = InterestPayment::PaidAt(now);
        position.last_updated = now;
        Some(interest)
    }

    /// Run the accrual check over the whole portfolio. Returns one receipt
    /// per credited position, for the caller to record as income.
    pub fn process_all(&self, portfolio: &mut Portfolio, now: DateTime<Utc>) -> Vec<AccrualReceipt> {
        let mut receipts = Vec::new();
        for position in &mut portfolio.positions {
            let rate = position.annual_rate.unwrap_or(0.0);
            if let Some(amount) = self.apply(position, now) {
                receipts.push(AccrualReceipt {
                    symbol: position.symbol.clone(),
                    name: position.name.clone(),
                    annual_rate: rate,
                    amount,
                });
            }
        }
        receipts
    }
}

impl Default for AccrualService {
    fn default() -> Self {
        Self::new()
    }
}
