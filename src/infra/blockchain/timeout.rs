use {
    super::{Error, Node, Receipt},
    crate::domain::{eth, fee::FeeData},
    alloy::rpc::types::TransactionRequest,
    std::{future::Future, time::Duration},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timeouts {
    /// Limit for every individual RPC request.
    pub rpc: Duration,
    /// Limit for waiting on a transaction to be mined.
    pub confirmation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            rpc: Duration::from_secs(10),
            confirmation: Duration::from_secs(300),
        }
    }
}

/// Bounds every call of the wrapped node so that a hanging endpoint fails
/// the call instead of stalling it forever.
#[derive(Debug)]
pub struct Timeout<N> {
    inner: N,
    timeouts: Timeouts,
}

impl<N> Timeout<N> {
    pub fn new(inner: N, timeouts: Timeouts) -> Self {
        Self { inner, timeouts }
    }
}

async fn bounded<T>(
    method: &'static str,
    timeout: Duration,
    call: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| Error::Timeout { method, timeout })?
}

#[async_trait::async_trait]
impl<N: Node> Node for Timeout<N> {
    async fn balance(&self, owner: eth::Address) -> Result<eth::U256, Error> {
        bounded("eth_getBalance", self.timeouts.rpc, self.inner.balance(owner)).await
    }

    async fn call(&self, to: eth::Address, data: eth::Bytes) -> Result<eth::Bytes, Error> {
        bounded("eth_call", self.timeouts.rpc, self.inner.call(to, data)).await
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, Error> {
        bounded("eth_estimateGas", self.timeouts.rpc, self.inner.estimate_gas(tx)).await
    }

    async fn fee_data(&self) -> Result<FeeData, Error> {
        bounded("fee data", self.timeouts.rpc, self.inner.fee_data()).await
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<eth::TxHash, Error> {
        bounded(
            "eth_sendRawTransaction",
            self.timeouts.rpc,
            self.inner.send_transaction(tx),
        )
        .await
    }

    async fn receipt(&self, hash: eth::TxHash) -> Result<Receipt, Error> {
        bounded(
            "eth_getTransactionReceipt",
            self.timeouts.confirmation,
            self.inner.receipt(hash),
        )
        .await
    }
}
