use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::position::{AssetClass, Position};

/// The authoritative collection of asset positions. Serialized, encrypted,
/// and snapshotted wholesale after every mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub positions: Vec<Position>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a position by its `(symbol, class)` identity (case-insensitive).
    pub fn find(&self, symbol: &str, class: AssetClass) -> Option<&Position> {
        let upper = symbol.to_uppercase();
        self.positions
            .iter()
            .find(|p| p.symbol == upper && p.class == class)
    }

    pub fn find_mut(&mut self, symbol: &str, class: AssetClass) -> Option<&mut Position> {
        let upper = symbol.to_uppercase();
        self.positions
            .iter_mut()
            .find(|p| p.symbol == upper && p.class == class)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: Uuid) -> Option<&mut Position> {
        self.positions.iter_mut().find(|p| p.id == id)
    }

    /// Total market value of all positions.
    pub fn total_value(&self) -> f64 {
        self.positions.iter().map(Position::market_value).sum()
    }

    /// Total cost basis of all positions.
    pub fn total_cost(&self) -> f64 {
        self.positions.iter().map(Position::cost_basis).sum()
    }

    /// Total unrealized profit/loss.
    pub fn total_profit_loss(&self) -> f64 {
        self.total_value() - self.total_cost()
    }

    /// Total P&L as a percentage of total cost basis (0 when cost basis is 0).
    pub fn total_profit_loss_pct(&self) -> f64 {
        let cost = self.total_cost();
        if cost > 0.0 {
            (self.total_profit_loss() / cost) * 100.0
        } else {
            0.0
        }
    }

    /// Sum of market values for a single asset class.
    pub fn class_subtotal(&self, class: AssetClass) -> f64 {
        self.positions
            .iter()
            .filter(|p| p.class == class)
            .map(Position::market_value)
            .sum()
    }
}
