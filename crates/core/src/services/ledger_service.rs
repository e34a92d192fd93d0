use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::position::{AssetClass, InterestKind, Position};
use crate::models::transaction::{Ledger, Transaction, TransactionKind};
use crate::services::accrual_service::AccrualReceipt;

/// The ledger recorder: maps completed domain events to immutable
/// transaction records. Pure mapping — it never mutates the portfolio,
/// and a failure here never corrupts position state (and vice versa).
///
/// Amounts are always strictly positive; direction lives in the
/// classification kind, never in the sign.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Record an asset acquisition that already went through the position
    /// book. The classification follows the asset class; for interest
    /// positions the explicit `InterestKind` decides between deposit-income
    /// and investment-outflow semantics.
    ///
    /// Zero-cost acquisitions (free shares, airdrops) are not an economic
    /// movement and produce no entry.
    pub fn record_acquisition(
        &self,
        ledger: &mut Ledger,
        position: &Position,
        quantity: f64,
        unit_cost: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, CoreError> {
        let amount = quantity * unit_cost;
        if amount == 0.0 {
            return Ok(None);
        }

        let (kind, category, description) = match position.class {
            AssetClass::Bank => (
                TransactionKind::Income,
                "Bank Deposit",
                format!("Deposit of {amount:.2} into {}", position.name),
            ),
            AssetClass::Savings => (
                TransactionKind::Income,
                "Savings",
                format!("Deposit of {amount:.2} into {}", position.name),
            ),
            AssetClass::Interest => {
                let rate = position.annual_rate.unwrap_or(0.0);
                match position.interest_kind.unwrap_or(InterestKind::Investment) {
                    InterestKind::DepositAccount => (
                        TransactionKind::Income,
                        "Interest Savings",
                        format!(
                            "Deposit of {amount:.2} into {} at {rate:.1}% per year",
                            position.name
                        ),
                    ),
                    InterestKind::Investment => (
                        TransactionKind::InterestInvestment,
                        "Interest Investments",
                        format!(
                            "Invested {amount:.2} in {} ({rate:.1}% per year)",
                            position.name
                        ),
                    ),
                }
            }
            AssetClass::Crypto => (
                TransactionKind::CryptoBuy,
                "Crypto Investments",
                format!(
                    "Bought {quantity} {} at {unit_cost:.2} each",
                    position.symbol
                ),
            ),
            AssetClass::Equity => (
                TransactionKind::EquityBuy,
                "Equity Investments",
                format!(
                    "Bought {quantity} shares of {} at {unit_cost:.2} each",
                    position.symbol
                ),
            ),
        };

        let entry = Transaction::new(now, kind, category, amount, description).with_asset(
            position.symbol.clone(),
            Some(quantity),
            Some(unit_cost),
        );
        Ok(Some(self.push(ledger, entry)?))
    }

    /// Record a credited interest payment as income.
    pub fn record_interest(
        &self,
        ledger: &mut Ledger,
        receipt: &AccrualReceipt,
        now: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        let entry = Transaction::new(
            now,
            TransactionKind::InterestEarned,
            "Interest Received",
            receipt.amount,
            format!(
                "Monthly interest on {} ({:.1}% per year)",
                receipt.name, receipt.annual_rate
            ),
        )
        .with_asset(receipt.symbol.clone(), None, None);
        self.push(ledger, entry)
    }

    /// Record a direct cash deposit into a bank/savings position.
    /// Direct deposits count as income (see the summary policy).
    pub fn record_cash_deposit(
        &self,
        ledger: &mut Ledger,
        position: &Position,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        let category = match position.class {
            AssetClass::Savings => "Savings",
            _ => "Bank Deposit",
        };
        let entry = Transaction::new(
            now,
            TransactionKind::Income,
            category,
            amount,
            format!("Deposit of {amount:.2} into {}", position.name),
        )
        .with_asset(position.symbol.clone(), None, None);
        self.push(ledger, entry)
    }

    /// Record a cash withdrawal from a bank/savings position.
    /// Withdrawals are neutral — taking money out is not an expense.
    pub fn record_cash_withdrawal(
        &self,
        ledger: &mut Ledger,
        position: &Position,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        let kind = match position.class {
            AssetClass::Savings => TransactionKind::SavingsWithdrawal,
            _ => TransactionKind::BankWithdrawal,
        };
        let entry = Transaction::new(
            now,
            kind,
            "Bank Transfers",
            amount,
            format!("Withdrawal of {amount:.2} from {}", position.name),
        )
        .with_asset(position.symbol.clone(), None, None);
        self.push(ledger, entry)
    }

    /// Record an internal transfer as exactly two linked entries of the
    /// same amount: a withdrawal-classified one on the source and a
    /// deposit-classified one on the destination. Net portfolio value is
    /// unaffected while each account keeps a complete history.
    pub fn record_transfer(
        &self,
        ledger: &mut Ledger,
        from: &Position,
        to: &Position,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<(Uuid, Uuid), CoreError> {
        let out_kind = match from.class {
            AssetClass::Savings => TransactionKind::SavingsWithdrawal,
            _ => TransactionKind::BankWithdrawal,
        };
        let in_kind = match to.class {
            AssetClass::Savings => TransactionKind::SavingsDeposit,
            _ => TransactionKind::BankDeposit,
        };

        let transfer_id = Uuid::new_v4();

        let mut out_entry = Transaction::new(
            now,
            out_kind,
            "Bank Transfers",
            amount,
            format!("Transfer of {amount:.2} to {}", to.name),
        )
        .with_asset(from.symbol.clone(), None, None);
        out_entry.transfer_id = Some(transfer_id);

        let mut in_entry = Transaction::new(
            now,
            in_kind,
            "Bank Transfers",
            amount,
            format!("Transfer of {amount:.2} from {}", from.name),
        )
        .with_asset(to.symbol.clone(), None, None);
        in_entry.transfer_id = Some(transfer_id);

        let out_id = self.push(ledger, out_entry)?;
        let in_id = self.push(ledger, in_entry)?;
        Ok((out_id, in_id))
    }

    /// Record a manual income or expense entry.
    pub fn record_manual(
        &self,
        ledger: &mut Ledger,
        kind: TransactionKind,
        category: &str,
        amount: f64,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        if !matches!(kind, TransactionKind::Income | TransactionKind::Expense) {
            return Err(CoreError::Validation(format!(
                "Manual entries must be Income or Expense, got {kind}"
            )));
        }
        let entry = Transaction::new(now, kind, category, amount, description);
        self.push(ledger, entry)
    }

    /// Remove an entry by id. Explicit user action only — removal never
    /// cascades back into position state.
    pub fn remove(&self, ledger: &mut Ledger, id: Uuid) -> Result<Transaction, CoreError> {
        let idx = ledger
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
        Ok(ledger.transactions.remove(idx))
    }

    /// Add a category label for manual entries (deduplicated).
    pub fn add_category(&self, ledger: &mut Ledger, category: impl Into<String>) {
        let category = category.into();
        if !ledger.categories.contains(&category) {
            ledger.categories.push(category);
        }
    }

    /// Append an entry after enforcing the positivity invariant.
    fn push(&self, ledger: &mut Ledger, entry: Transaction) -> Result<Uuid, CoreError> {
        if !entry.amount.is_finite() || entry.amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Transaction amount must be strictly positive, got {}",
                entry.amount
            )));
        }
        let id = entry.id;
        ledger.transactions.push(entry);
        Ok(id)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
