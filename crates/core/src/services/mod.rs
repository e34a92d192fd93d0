pub mod accrual_service;
pub mod currency_service;
pub mod finance_service;
pub mod ledger_service;
pub mod portfolio_service;
pub mod price_service;
