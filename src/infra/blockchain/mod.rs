//! Access to the JSON-RPC nodes of the configured chains.
//!
//! A [`Node`] is a handle onto exactly one chain's endpoint. Nodes are created
//! per chain and per operation by a [`Connect`] implementation; the engine
//! never keeps connections around between operations.

use {
    crate::domain::{eth, fee::FeeData, registry::ChainDescriptor},
    alloy::{rpc::types::TransactionRequest, signers::local::PrivateKeySigner},
    std::{fmt::Display, sync::Arc, time::Duration},
};

mod rpc;
mod timeout;

pub use self::{
    rpc::{Connector, Rpc},
    timeout::{Timeout, Timeouts},
};

/// The part of a transaction receipt the engine cares about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Receipt {
    /// Hash of the mined transaction. Nodes are expected to always include
    /// it, some don't.
    pub transaction_hash: Option<eth::TxHash>,
    /// Whether the transaction executed without reverting.
    pub success: bool,
}

/// The RPC methods the engine needs from a chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    /// Native balance of `owner` in wei.
    async fn balance(&self, owner: eth::Address) -> Result<eth::U256, Error>;

    /// Executes a read-only call against a contract and returns the raw
    /// return data.
    async fn call(&self, to: eth::Address, data: eth::Bytes) -> Result<eth::Bytes, Error>;

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, Error>;

    /// Current network fee data. Fields the network doesn't support are
    /// `None`.
    async fn fee_data(&self) -> Result<FeeData, Error>;

    /// Signs and broadcasts a transaction, returning its hash. Only nodes
    /// connected with a signer can do this.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<eth::TxHash, Error>;

    /// Waits until the transaction is included in a block.
    async fn receipt(&self, hash: eth::TxHash) -> Result<Receipt, Error>;
}

/// Creates [`Node`]s for registry chains.
pub trait Connect: Send + Sync {
    /// Connects a read-only node.
    fn connect(&self, chain: &ChainDescriptor) -> Result<Arc<dyn Node>, Error>;

    /// Connects a node that signs the transactions it sends with `signer`.
    fn connect_signer(
        &self,
        chain: &ChainDescriptor,
        signer: &PrivateKeySigner,
    ) -> Result<Arc<dyn Node>, Error>;
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported rpc endpoint {0}")]
    InvalidEndpoint(reqwest::Url),
    #[error("{method} failed: {reason}")]
    Rpc { method: &'static str, reason: String },
    #[error("{method} timed out after {timeout:?}")]
    Timeout {
        method: &'static str,
        timeout: Duration,
    },
    #[error("failed to decode {method} result: {reason}")]
    Decode { method: &'static str, reason: String },
}

impl Error {
    pub fn rpc<E: Display>(method: &'static str) -> impl FnOnce(E) -> Self {
        move |err| Self::Rpc {
            method,
            reason: err.to_string(),
        }
    }

    pub fn decode<E: Display>(method: &'static str) -> impl FnOnce(E) -> Self {
        move |err| Self::Decode {
            method,
            reason: err.to_string(),
        }
    }
}
