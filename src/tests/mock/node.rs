use {
    crate::{
        domain::{eth, fee::FeeData, registry::ChainDescriptor},
        infra::{
            blockchain::{self, Error, Receipt},
            erc20,
        },
    },
    alloy::{
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
        sol_types::{SolCall, SolValue},
    },
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        time::Duration,
    },
};

/// Hash every scripted node returns for a submitted transaction.
pub const SUBMITTED: eth::TxHash = eth::TxHash::repeat_byte(0xaa);

/// Hash every scripted node reports in a mined receipt.
pub const MINED: eth::TxHash = eth::TxHash::repeat_byte(0xbb);

#[derive(Clone, Copy, Debug, Default)]
pub enum ReceiptMode {
    /// Mined successfully, the receipt carries [`MINED`].
    #[default]
    Mined,
    /// Mined successfully, the receipt carries [`SUBMITTED`].
    Submitted,
    /// Mined successfully but the node leaves out the hash.
    WithoutHash,
    Reverted,
    /// Waiting for the receipt fails.
    Fails,
}

/// What a node was asked to do.
#[derive(Debug, Default)]
pub struct Calls {
    pub balance: usize,
    pub call: usize,
    pub estimate_gas: usize,
    pub fee_data: usize,
    pub sent: Vec<TransactionRequest>,
}

/// A node answering from a script. Anything left unscripted fails.
#[derive(Debug, Default)]
pub struct Node {
    native: Option<eth::U256>,
    tokens: HashMap<eth::Address, eth::U256>,
    decimals: HashMap<eth::Address, u8>,
    symbols: HashMap<eth::Address, String>,
    allowances: HashMap<eth::Address, eth::U256>,
    gas: Option<u64>,
    fee_data: Option<FeeData>,
    receipt: ReceiptMode,
    delay: Duration,
    calls: Mutex<Calls>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native balance in wei.
    pub fn native(mut self, wei: eth::U256) -> Self {
        self.native = Some(wei);
        self
    }

    pub fn token(mut self, token: eth::Address, units: eth::U256) -> Self {
        self.tokens.insert(token, units);
        self
    }

    pub fn decimals(mut self, token: eth::Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    pub fn symbol(mut self, token: eth::Address, symbol: &str) -> Self {
        self.symbols.insert(token, symbol.to_owned());
        self
    }

    pub fn allowance(mut self, token: eth::Address, units: eth::U256) -> Self {
        self.allowances.insert(token, units);
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn fee_data(mut self, fee_data: FeeData) -> Self {
        self.fee_data = Some(fee_data);
        self
    }

    pub fn receipt(mut self, receipt: ReceiptMode) -> Self {
        self.receipt = receipt;
        self
    }

    /// Makes every balance read take `delay`.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs `f` on the calls recorded so far.
    pub fn calls<T>(&self, f: impl FnOnce(&Calls) -> T) -> T {
        f(&self.calls.lock().unwrap())
    }

    fn record(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap())
    }
}

fn unscripted(method: &'static str) -> Error {
    Error::Rpc {
        method,
        reason: "unscripted".to_owned(),
    }
}

#[async_trait::async_trait]
impl blockchain::Node for Node {
    async fn balance(&self, _: eth::Address) -> Result<eth::U256, Error> {
        self.record(|calls| calls.balance += 1);
        tokio::time::sleep(self.delay).await;
        self.native.ok_or_else(|| unscripted("eth_getBalance"))
    }

    async fn call(&self, to: eth::Address, data: eth::Bytes) -> Result<eth::Bytes, Error> {
        self.record(|calls| calls.call += 1);
        tokio::time::sleep(self.delay).await;
        let selector = &data[..4];
        let result = if selector == erc20::balanceOfCall::SELECTOR {
            self.tokens.get(&to).map(|units| units.abi_encode())
        } else if selector == erc20::decimalsCall::SELECTOR {
            self.decimals
                .get(&to)
                .map(|decimals| eth::U256::from(*decimals).abi_encode())
        } else if selector == erc20::symbolCall::SELECTOR {
            self.symbols.get(&to).map(|symbol| symbol.abi_encode())
        } else if selector == erc20::allowanceCall::SELECTOR {
            self.allowances.get(&to).map(|units| units.abi_encode())
        } else {
            None
        };
        result
            .map(Into::into)
            .ok_or_else(|| unscripted("eth_call"))
    }

    async fn estimate_gas(&self, _: TransactionRequest) -> Result<u64, Error> {
        self.record(|calls| calls.estimate_gas += 1);
        self.gas.ok_or_else(|| unscripted("eth_estimateGas"))
    }

    async fn fee_data(&self) -> Result<FeeData, Error> {
        self.record(|calls| calls.fee_data += 1);
        self.fee_data.ok_or_else(|| unscripted("fee data"))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<eth::TxHash, Error> {
        self.record(|calls| calls.sent.push(tx));
        Ok(SUBMITTED)
    }

    async fn receipt(&self, _: eth::TxHash) -> Result<Receipt, Error> {
        match self.receipt {
            ReceiptMode::Mined => Ok(Receipt {
                transaction_hash: Some(MINED),
                success: true,
            }),
            ReceiptMode::Submitted => Ok(Receipt {
                transaction_hash: Some(SUBMITTED),
                success: true,
            }),
            ReceiptMode::WithoutHash => Ok(Receipt {
                transaction_hash: None,
                success: true,
            }),
            ReceiptMode::Reverted => Ok(Receipt {
                transaction_hash: Some(MINED),
                success: false,
            }),
            ReceiptMode::Fails => Err(unscripted("eth_getTransactionReceipt")),
        }
    }
}

/// Hands out the scripted node of a chain. Chains without a node are
/// unavailable.
#[derive(Default)]
pub struct Connector {
    nodes: HashMap<String, Arc<Node>>,
    signers: Mutex<Vec<eth::Address>>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: &str, node: Node) -> Self {
        self.nodes.insert(chain.to_owned(), Arc::new(node));
        self
    }

    pub fn node(&self, chain: &str) -> &Node {
        &self.nodes[chain]
    }

    /// Addresses of the signers nodes were connected with, in order.
    pub fn signers(&self) -> Vec<eth::Address> {
        self.signers.lock().unwrap().clone()
    }
}

impl blockchain::Connect for Connector {
    fn connect(&self, chain: &ChainDescriptor) -> Result<Arc<dyn blockchain::Node>, Error> {
        let node = self
            .nodes
            .get(&chain.id.0)
            .ok_or_else(|| Error::InvalidEndpoint(chain.rpc_url.clone()))?;
        Ok(node.clone())
    }

    fn connect_signer(
        &self,
        chain: &ChainDescriptor,
        signer: &PrivateKeySigner,
    ) -> Result<Arc<dyn blockchain::Node>, Error> {
        self.signers.lock().unwrap().push(signer.address());
        self.connect(chain)
    }
}
