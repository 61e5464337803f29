pub mod balance;
pub mod eth;
pub mod fee;
pub mod registry;
pub mod transfer;
