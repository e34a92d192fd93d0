pub mod portfolio;
pub mod position;
pub mod rates;
pub mod settings;
pub mod summary;
pub mod transaction;
