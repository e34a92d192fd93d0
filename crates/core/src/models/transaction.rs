use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a ledger entry. Direction (inflow/outflow) is implied
/// by the kind — amounts are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Generic income (salary, direct deposits into bank/savings positions)
    Income,
    /// Generic expense (groceries, fuel, ...)
    Expense,
    /// Bank account deposit (transfer destination)
    BankDeposit,
    /// Bank account withdrawal (transfer source)
    BankWithdrawal,
    /// Savings account deposit (transfer destination)
    SavingsDeposit,
    /// Savings account withdrawal (transfer source)
    SavingsWithdrawal,
    /// Cryptocurrency purchase
    CryptoBuy,
    /// Cryptocurrency sale
    CryptoSell,
    /// Equity purchase
    EquityBuy,
    /// Equity sale
    EquitySell,
    /// Monthly interest credited on an interest-bearing position
    InterestEarned,
    /// Purchase of an interest-bearing instrument (certificates, bonds)
    InterestInvestment,
}

impl TransactionKind {
    /// Kinds that count toward monthly income.
    /// Direct deposits into cash positions are recorded as `Income`;
    /// transfer-generated deposit entries stay neutral.
    pub fn is_income(&self) -> bool {
        matches!(self, TransactionKind::Income | TransactionKind::InterestEarned)
    }

    /// Kinds that represent money moved into investments this month.
    pub fn is_investment_outflow(&self) -> bool {
        matches!(
            self,
            TransactionKind::CryptoBuy
                | TransactionKind::EquityBuy
                | TransactionKind::InterestInvestment
        )
    }

    /// Deposit-classified entries (the inflow half of cash movements).
    pub fn is_deposit_like(&self) -> bool {
        matches!(self, TransactionKind::BankDeposit | TransactionKind::SavingsDeposit)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::BankDeposit => "Bank Deposit",
            TransactionKind::BankWithdrawal => "Bank Withdrawal",
            TransactionKind::SavingsDeposit => "Savings Deposit",
            TransactionKind::SavingsWithdrawal => "Savings Withdrawal",
            TransactionKind::CryptoBuy => "Crypto Buy",
            TransactionKind::CryptoSell => "Crypto Sell",
            TransactionKind::EquityBuy => "Equity Buy",
            TransactionKind::EquitySell => "Equity Sell",
            TransactionKind::InterestEarned => "Interest Earned",
            TransactionKind::InterestInvestment => "Interest Investment",
        };
        write!(f, "{label}")
    }
}

/// An immutable record of one monetary movement. Created exactly once per
/// economically meaningful event, append-only; removal is an explicit user
/// action and never cascades back into position state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// When the movement happened
    pub date: DateTime<Utc>,

    /// Classification — implies direction
    pub kind: TransactionKind,

    /// Free-text category label (e.g., "Crypto Investments", "Groceries")
    pub category: String,

    /// Monetary amount, strictly positive
    pub amount: f64,

    /// Human-readable description
    pub description: String,

    /// Symbol of the associated position, if any
    #[serde(default)]
    pub symbol: Option<String>,

    /// Units involved, for asset purchases
    #[serde(default)]
    pub quantity: Option<f64>,

    /// Unit price paid, for asset purchases
    #[serde(default)]
    pub unit_price: Option<f64>,

    /// Links the two halves of an internal transfer
    #[serde(default)]
    pub transfer_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(
        date: DateTime<Utc>,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            category: category.into(),
            amount,
            description: description.into(),
            symbol: None,
            quantity: None,
            unit_price: None,
            transfer_id: None,
        }
    }

    /// Attach a position reference (symbol / quantity / unit price).
    pub fn with_asset(
        mut self,
        symbol: impl Into<String>,
        quantity: Option<f64>,
        unit_price: Option<f64>,
    ) -> Self {
        self.symbol = Some(symbol.into());
        self.quantity = quantity;
        self.unit_price = unit_price;
        self
    }
}

/// The transaction ledger plus the user-facing finance configuration that
/// travels with it (category list, monthly budget).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// All recorded transactions, append-ordered
    pub transactions: Vec<Transaction>,

    /// User-editable category labels offered for manual entries
    pub categories: Vec<String>,

    /// Monthly spending budget (0 = unset)
    pub monthly_budget: f64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            categories: vec![
                "Groceries".to_string(),
                "Transport".to_string(),
                "Housing".to_string(),
                "Health".to_string(),
                "Entertainment".to_string(),
                "Bank Transfers".to_string(),
                "Savings".to_string(),
                "Crypto Investments".to_string(),
                "Equity Investments".to_string(),
                "Interest Investments".to_string(),
                "Other".to_string(),
            ],
            monthly_budget: 0.0,
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }
}
