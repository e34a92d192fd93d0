pub mod catalog;
pub mod registry;
pub mod traits;

// Quote provider implementations
pub mod alphavantage;
pub mod coinmarketcap;
pub mod finnhub;
pub mod twelvedata;
#[cfg(not(target_arch = "wasm32"))]
pub mod yahoo_finance;
