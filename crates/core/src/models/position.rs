use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The class of a held asset.
/// Determines the pricing source and the ledger classification of acquisitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Checking/current account — balance tracked directly, no market price
    Bank,
    /// Savings account — balance tracked directly, no market price
    Savings,
    /// Cryptocurrencies (BTC, ETH, etc.)
    Crypto,
    /// Stocks / equities (AAPL, MSFT, etc.)
    Equity,
    /// Interest-bearing instruments (savings certificates, bonds, term deposits)
    Interest,
}

impl AssetClass {
    /// Cash-like classes track a balance: quantity is pinned at 1 and
    /// `current_price` IS the account balance.
    pub fn is_cash_like(&self) -> bool {
        matches!(self, AssetClass::Bank | AssetClass::Savings)
    }

    /// Classes with a live market quote (crypto exchanges, stock exchanges).
    pub fn is_market_priced(&self) -> bool {
        matches!(self, AssetClass::Crypto | AssetClass::Equity)
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Bank => write!(f, "Bank"),
            AssetClass::Savings => write!(f, "Savings"),
            AssetClass::Crypto => write!(f, "Crypto"),
            AssetClass::Equity => write!(f, "Equity"),
            AssetClass::Interest => write!(f, "Interest"),
        }
    }
}

/// Whether an interest-bearing position behaves like a deposit account
/// (money parked somewhere that pays interest) or like an investment
/// instrument (certificates, bonds). Chosen explicitly at creation time;
/// drives the ledger classification of the acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestKind {
    /// Savings-style account with interest — acquisitions are deposits (income)
    DepositAccount,
    /// Certificates/bonds — acquisitions are investment outflows
    Investment,
}

/// The accrual state machine for interest-bearing positions:
/// either interest has never been credited, or it was last credited at a
/// known instant. The calendar-month gate in the accrual engine matches
/// exhaustively on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterestPayment {
    #[default]
    NeverPaid,
    PaidAt(DateTime<Utc>),
}

/// A held asset position. Identity within a portfolio is the
/// `(symbol, class)` pair; `id` is the stable handle handed to the UI.
///
/// For cash-like classes (`Bank`, `Savings`) the quantity is always exactly 1
/// and `current_price` represents the account balance directly — depositing
/// into a bank account raises its price, never its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique identifier
    pub id: Uuid,

    /// Ticker symbol, uppercased (e.g., "BTC", "AAPL", "CHECKING")
    pub symbol: String,

    /// Human-readable name (e.g., "Bitcoin", "Apple Inc.", "Main Account")
    pub name: String,

    /// Asset class — determines pricing source and ledger classification
    pub class: AssetClass,

    /// Units held (always 1 for cash-like classes)
    pub quantity: f64,

    /// Weighted-average cost per unit
    pub average_cost: f64,

    /// Latest known unit price (the balance, for cash-like classes)
    pub current_price: f64,

    /// When `current_price` was last refreshed
    pub last_updated: DateTime<Utc>,

    /// Annual interest rate in percent (meaningful only for `Interest` class)
    #[serde(default)]
    pub annual_rate: Option<f64>,

    /// Deposit-account vs. investment semantics for `Interest` positions
    #[serde(default)]
    pub interest_kind: Option<InterestKind>,

    /// When interest was last credited
    #[serde(default)]
    pub last_interest_payment: InterestPayment,
}

impl Position {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        class: AssetClass,
        quantity: f64,
        unit_cost: f64,
        now: DateTime<Utc>,
    ) -> Self {
        // Cash-like accounts track a balance, not units: the opening
        // balance is the full amount paid in, and quantity stays 1 so the
        // booked value always equals quantity × unit_cost.
        let (quantity, unit_cost) = if class.is_cash_like() {
            (1.0, quantity * unit_cost)
        } else {
            (quantity, unit_cost)
        };
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            class,
            quantity,
            average_cost: unit_cost,
            current_price: unit_cost,
            last_updated: now,
            annual_rate: None,
            interest_kind: None,
            last_interest_payment: InterestPayment::NeverPaid,
        }
    }

    /// Total market value: quantity × current price.
    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }

    /// Total cost basis: quantity × weighted-average cost.
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.average_cost
    }

    /// Unrealized profit/loss: market value − cost basis.
    pub fn profit_loss(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }

    /// Unrealized P&L as a percentage of cost basis (0 when cost basis is 0).
    pub fn profit_loss_pct(&self) -> f64 {
        let cost = self.cost_basis();
        if cost > 0.0 {
            (self.profit_loss() / cost) * 100.0
        } else {
            0.0
        }
    }

    /// Monthly interest rate as a decimal fraction (annual % / 12 / 100).
    pub fn monthly_rate(&self) -> f64 {
        match self.annual_rate {
            Some(rate) => rate / 12.0 / 100.0,
            None => 0.0,
        }
    }
}
