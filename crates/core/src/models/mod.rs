pub mod diagnostic;
pub mod holding;
pub mod performance;
pub mod portfolio;
pub mod position;
pub mod price;
pub mod transaction;
