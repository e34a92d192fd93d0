use crate::models::position::AssetClass;

use super::traits::SearchResult;

/// Nominal unit value used for interest-bearing instruments when no live
/// bond market provider is wired.
pub const NOMINAL_BOND_PRICE: f64 = 1000.0;

/// Popular cryptocurrencies offered when every remote search fails.
pub const POPULAR_CRYPTOS: &[(&str, &str)] = &[
    ("BTC", "Bitcoin"),
    ("ETH", "Ethereum"),
    ("ADA", "Cardano"),
    ("SOL", "Solana"),
    ("DOT", "Polkadot"),
    ("XRP", "XRP"),
    ("LTC", "Litecoin"),
    ("LINK", "Chainlink"),
];

/// Popular equities offered when every remote search fails.
pub const POPULAR_STOCKS: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("TSLA", "Tesla Inc."),
    ("MSFT", "Microsoft Corp."),
    ("AMZN", "Amazon.com Inc."),
    ("GOOGL", "Alphabet Inc."),
    ("NVDA", "NVIDIA Corp."),
];

/// Common euro-zone sovereign/savings instruments: (symbol, name, annual rate %).
/// There is no live bond market in this design — these quote at the nominal value.
pub const BOND_CATALOG: &[(&str, &str, f64)] = &[
    ("PGB", "Portuguese Treasury Bonds 10Y", 3.2),
    ("CA", "Savings Certificates", 2.5),
    ("CT", "Treasury Certificates", 1.8),
    ("OT", "Treasury Bonds", 3.0),
    ("BUND", "German Bund 10Y", 2.1),
    ("OAT", "French OAT 10Y", 2.8),
    ("BTP", "Italian BTP 10Y", 4.2),
];

/// Case-insensitive substring filter over a built-in (symbol, name) list.
fn filter_pairs(list: &[(&str, &str)], query: &str, class: AssetClass) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    list.iter()
        .filter(|(symbol, name)| {
            symbol.to_lowercase().contains(&q) || name.to_lowercase().contains(&q)
        })
        .map(|(symbol, name)| SearchResult::new(*symbol, *name, class, None))
        .collect()
}

/// Built-in fallback search for a class, used when every remote provider
/// fails or none is configured. Blank queries return an empty list.
pub fn search_builtin(query: &str, class: AssetClass) -> Vec<SearchResult> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match class {
        AssetClass::Crypto => filter_pairs(POPULAR_CRYPTOS, trimmed, class),
        AssetClass::Equity => filter_pairs(POPULAR_STOCKS, trimmed, class),
        AssetClass::Interest => {
            let q = trimmed.to_lowercase();
            BOND_CATALOG
                .iter()
                .filter(|(symbol, name, _)| {
                    symbol.to_lowercase().contains(&q) || name.to_lowercase().contains(&q)
                })
                .map(|(symbol, name, _)| {
                    SearchResult::new(*symbol, *name, class, Some(NOMINAL_BOND_PRICE))
                })
                .collect()
        }
        AssetClass::Bank | AssetClass::Savings => Vec::new(),
    }
}

/// Look up the catalog rate for a known bond symbol.
pub fn bond_rate(symbol: &str) -> Option<f64> {
    let upper = symbol.to_uppercase();
    BOND_CATALOG
        .iter()
        .find(|(s, _, _)| *s == upper)
        .map(|(_, _, rate)| *rate)
}
