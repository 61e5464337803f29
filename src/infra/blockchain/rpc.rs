use {
    super::{Connect, Error, Node, Receipt, Timeout, Timeouts},
    crate::domain::{eth, fee::FeeData, registry::ChainDescriptor},
    alloy::{
        eips::BlockNumberOrTag,
        network::{EthereumWallet, TransactionBuilder},
        providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    std::sync::Arc,
};

/// Priority fee used when the node doesn't implement
/// `eth_maxPriorityFeePerGas`.
const DEFAULT_PRIORITY_FEE: u128 = 1_000_000_000;

/// A [`Node`] talking JSON-RPC over HTTP through an alloy provider.
#[derive(Clone, Debug)]
pub struct Rpc {
    provider: DynProvider,
}

impl Rpc {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Node for Rpc {
    async fn balance(&self, owner: eth::Address) -> Result<eth::U256, Error> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(Error::rpc("eth_getBalance"))
    }

    async fn call(&self, to: eth::Address, data: eth::Bytes) -> Result<eth::Bytes, Error> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider
            .call(tx)
            .await
            .map_err(Error::rpc("eth_call"))
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, Error> {
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(Error::rpc("eth_estimateGas"))
    }

    async fn fee_data(&self) -> Result<FeeData, Error> {
        let (block, gas_price) = tokio::try_join!(
            async {
                self.provider
                    .get_block_by_number(BlockNumberOrTag::Latest)
                    .await
                    .map_err(Error::rpc("eth_getBlockByNumber"))
            },
            async {
                self.provider
                    .get_gas_price()
                    .await
                    .map_err(Error::rpc("eth_gasPrice"))
            },
        )?;

        // Networks without a base fee in their latest block don't support
        // EIP-1559 transactions.
        let Some(base_fee) = block.and_then(|block| block.header.base_fee_per_gas) else {
            return Ok(FeeData::legacy(gas_price));
        };
        let priority_fee = match self.provider.get_max_priority_fee_per_gas().await {
            Ok(fee) => fee,
            Err(err) => {
                tracing::debug!(?err, "falling back to default priority fee");
                DEFAULT_PRIORITY_FEE
            }
        };
        Ok(FeeData::with_base_fee(
            gas_price,
            u128::from(base_fee),
            priority_fee,
        ))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<eth::TxHash, Error> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(Error::rpc("eth_sendRawTransaction"))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, hash: eth::TxHash) -> Result<Receipt, Error> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .get_receipt()
            .await
            .map_err(Error::rpc("eth_getTransactionReceipt"))?;
        Ok(Receipt {
            transaction_hash: Some(receipt.transaction_hash),
            success: receipt.status(),
        })
    }
}

/// Connects [`Rpc`] nodes to the HTTP endpoints from the registry, bounded
/// by the configured timeouts.
#[derive(Clone, Debug)]
pub struct Connector {
    timeouts: Timeouts,
}

impl Connector {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }

    fn endpoint(chain: &ChainDescriptor) -> Result<reqwest::Url, Error> {
        match chain.rpc_url.scheme() {
            "http" | "https" => Ok(chain.rpc_url.clone()),
            _ => Err(Error::InvalidEndpoint(chain.rpc_url.clone())),
        }
    }

    fn node(&self, provider: DynProvider) -> Arc<dyn Node> {
        Arc::new(Timeout::new(Rpc::new(provider), self.timeouts))
    }
}

impl Connect for Connector {
    fn connect(&self, chain: &ChainDescriptor) -> Result<Arc<dyn Node>, Error> {
        let provider = ProviderBuilder::new()
            .connect_http(Self::endpoint(chain)?)
            .erased();
        Ok(self.node(provider))
    }

    fn connect_signer(
        &self,
        chain: &ChainDescriptor,
        signer: &PrivateKeySigner,
    ) -> Result<Arc<dyn Node>, Error> {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(Self::endpoint(chain)?)
            .erased();
        Ok(self.node(provider))
    }
}
