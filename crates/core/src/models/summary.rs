use serde::{Deserialize, Serialize};

/// Aggregate view of one calendar month of ledger activity.
/// Always derived from the ledger on demand, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Calendar year the summary covers
    pub year: i32,

    /// Calendar month (1-12)
    pub month: u32,

    /// Income + interest earned
    pub income: f64,

    /// Generic expenses
    pub expenses: f64,

    /// Money moved into investments (crypto, equity, interest instruments)
    pub invested: f64,

    /// Deposit-classified inflows with a recognized deposit category.
    /// Neutral transfers land here, never in `income`.
    pub deposits: f64,

    /// income − expenses − invested
    pub balance: f64,

    /// Number of transactions that fell inside the month
    pub transaction_count: usize,
}
