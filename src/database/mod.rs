pub mod db;
pub mod due;
pub mod ledger;

pub use due::DueSetSelector;
pub use ledger::CardLedger;
