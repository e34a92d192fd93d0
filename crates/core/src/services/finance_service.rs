use chrono::Datelike;

use crate::models::summary::MonthlySummary;
use crate::models::transaction::{Ledger, Transaction, TransactionKind};

/// Categories whose deposit-classified entries count toward the monthly
/// deposits total.
const DEPOSIT_CATEGORIES: &[&str] = &["Bank Deposit", "Savings", "Interest Savings", "Bank Transfers"];

/// Derives aggregate finance views from the ledger. Everything here is a
/// pure function over the transaction collection — recomputed on demand,
/// never cached, so it can never diverge from the ledger.
pub struct FinanceService;

impl FinanceService {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate one calendar month of ledger activity.
    ///
    /// Policy: income counts `Income` and `InterestEarned` entries (direct
    /// deposits into cash accounts are recorded as `Income`); deposit-
    /// classified transfer halves are neutral and only show up in
    /// `deposits`; the final balance is income − expenses − invested.
    pub fn monthly_summary(&self, ledger: &Ledger, year: i32, month: u32) -> MonthlySummary {
        let mut income = 0.0;
        let mut expenses = 0.0;
        let mut invested = 0.0;
        let mut deposits = 0.0;
        let mut count = 0;

        for tx in self.transactions_in_month(ledger, year, month) {
            count += 1;
            if tx.kind.is_income() {
                income += tx.amount;
            } else if tx.kind == TransactionKind::Expense {
                expenses += tx.amount;
            } else if tx.kind.is_investment_outflow() {
                invested += tx.amount;
            }

            if tx.kind.is_deposit_like() && DEPOSIT_CATEGORIES.contains(&tx.category.as_str()) {
                deposits += tx.amount;
            }
        }

        MonthlySummary {
            year,
            month,
            income,
            expenses,
            invested,
            deposits,
            balance: income - expenses - invested,
            transaction_count: count,
        }
    }

    /// All transactions dated inside the given calendar month.
    pub fn transactions_in_month<'a>(
        &self,
        ledger: &'a Ledger,
        year: i32,
        month: u32,
    ) -> impl Iterator<Item = &'a Transaction> {
        ledger
            .transactions
            .iter()
            .filter(move |t| t.date.year() == year && t.date.month() == month)
    }

    /// Total interest credited in the given calendar month.
    pub fn monthly_interest_earned(&self, ledger: &Ledger, year: i32, month: u32) -> f64 {
        self.transactions_in_month(ledger, year, month)
            .filter(|t| t.kind == TransactionKind::InterestEarned)
            .map(|t| t.amount)
            .sum()
    }

    /// How much of the monthly budget the month's expenses have consumed,
    /// as a fraction (0 when no budget is set).
    pub fn budget_utilization(&self, ledger: &Ledger, year: i32, month: u32) -> f64 {
        if ledger.monthly_budget <= 0.0 {
            return 0.0;
        }
        let summary = self.monthly_summary(ledger, year, month);
        summary.expenses / ledger.monthly_budget
    }
}

impl Default for FinanceService {
    fn default() -> Self {
        Self::new()
    }
}
