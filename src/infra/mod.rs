pub mod blockchain;
pub mod cli;
pub mod config;
pub mod erc20;
pub mod metrics;
pub mod signer;

pub use self::config::Config;
