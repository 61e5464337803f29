//! Signing, submitting and confirming native and ERC20 transfers.

use {
    crate::{
        domain::{eth, fee::GasEstimate, registry::ChainDescriptor},
        infra::{blockchain, erc20, metrics},
        util::conv,
    },
    alloy::{
        network::TransactionBuilder,
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    bigdecimal::BigDecimal,
    std::sync::{
        Arc,
        atomic::{self, AtomicU64},
    },
    tracing::Instrument,
};

/// The final state of a submitted transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransactionOutcome {
    Confirmed { hash: eth::TxHash },
    Failed { error: String },
}

impl TransactionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn hash(&self) -> Option<eth::TxHash> {
        match self {
            Self::Confirmed { hash } => Some(*hash),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Confirmed { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// A transfer of `amount` tokens, in whole token units.
#[derive(Clone, Debug)]
pub struct TokenTransfer {
    pub token: eth::TokenAddress,
    pub to: eth::Address,
    pub amount: BigDecimal,
}

/// Allows `spender` to move up to `amount` tokens, in whole token units.
#[derive(Clone, Debug)]
pub struct TokenApproval {
    pub token: eth::TokenAddress,
    pub spender: eth::Address,
    pub amount: BigDecimal,
}

/// Submits transactions and waits for their receipts. Failures are reported
/// as [`TransactionOutcome::Failed`] and never retried.
pub struct Executor {
    connector: Arc<dyn blockchain::Connect>,
}

impl Executor {
    pub fn new(connector: Arc<dyn blockchain::Connect>) -> Self {
        Self { connector }
    }

    /// Sends `amount` of the native asset to `to`. A supplied estimate is used
    /// as is, otherwise gas and fees are estimated right before sending.
    pub async fn send_native(
        &self,
        signer: &PrivateKeySigner,
        to: eth::Address,
        amount: &BigDecimal,
        chain: &ChainDescriptor,
        estimate: Option<&GasEstimate>,
    ) -> TransactionOutcome {
        let result = async {
            let value = conv::decimal_to_ether(amount)
                .ok_or_else(|| TransactionError::InvalidAmount(amount.clone()))?;
            let node = self.signing_node(chain, signer)?;
            let tx = TransactionRequest::default()
                .with_from(signer.address())
                .with_to(to)
                .with_value(value.0);
            submit(node.as_ref(), tx, estimate).await
        };
        self.execute(chain, "native", result).await
    }

    /// Sends ERC20 tokens. The token's decimals are read from its contract.
    pub async fn send_token(
        &self,
        signer: &PrivateKeySigner,
        transfer: &TokenTransfer,
        chain: &ChainDescriptor,
        estimate: Option<&GasEstimate>,
    ) -> TransactionOutcome {
        let result = async {
            let node = self.signing_node(chain, signer)?;
            let amount = token_units(node.as_ref(), chain, transfer.token, &transfer.amount).await?;
            let tx = TransactionRequest::default()
                .with_from(signer.address())
                .with_to(transfer.token.0)
                .with_input(erc20::transfer(transfer.to, amount));
            submit(node.as_ref(), tx, estimate).await
        };
        self.execute(chain, "token", result).await
    }

    /// Sets the ERC20 allowance of `approval.spender`.
    pub async fn approve(
        &self,
        signer: &PrivateKeySigner,
        approval: &TokenApproval,
        chain: &ChainDescriptor,
        estimate: Option<&GasEstimate>,
    ) -> TransactionOutcome {
        let result = async {
            let node = self.signing_node(chain, signer)?;
            let amount = token_units(node.as_ref(), chain, approval.token, &approval.amount).await?;
            let tx = TransactionRequest::default()
                .with_from(signer.address())
                .with_to(approval.token.0)
                .with_input(erc20::approve(approval.spender, amount));
            submit(node.as_ref(), tx, estimate).await
        };
        self.execute(chain, "approve", result).await
    }

    /// How many tokens `spender` may still move on behalf of `owner`.
    pub async fn allowance(
        &self,
        chain: &ChainDescriptor,
        token: eth::TokenAddress,
        owner: eth::Address,
        spender: eth::Address,
    ) -> Result<BigDecimal, blockchain::Error> {
        let node = self.connector.connect(chain)?;
        let node = node.as_ref();
        let (decimals, allowance) = tokio::try_join!(
            erc20::decimals(node, token),
            erc20::allowance(node, token, owner, spender)
        )?;
        Ok(conv::units_to_decimal(&allowance, decimals))
    }

    fn signing_node(
        &self,
        chain: &ChainDescriptor,
        signer: &PrivateKeySigner,
    ) -> Result<Arc<dyn blockchain::Node>, TransactionError> {
        self.connector
            .connect_signer(chain, signer)
            .map_err(TransactionError::ChainUnavailable)
    }

    async fn execute(
        &self,
        chain: &ChainDescriptor,
        kind: &'static str,
        result: impl Future<Output = Result<eth::TxHash, TransactionError>>,
    ) -> TransactionOutcome {
        // Set up a tracing span to make debugging of submissions easier.
        static ID: AtomicU64 = AtomicU64::new(0);
        let id = ID.fetch_add(1, atomic::Ordering::Relaxed);
        let result = result
            .instrument(tracing::trace_span!("submit", id = %id, chain = %chain.id, kind))
            .await;

        match result {
            Ok(hash) => {
                tracing::info!(
                    chain = %chain.id,
                    kind,
                    %hash,
                    explorer = %chain.explorer_url(&hash),
                    "transaction confirmed"
                );
                metrics::transaction("confirmed");
                TransactionOutcome::Confirmed { hash }
            }
            Err(err) => {
                tracing::warn!(chain = %chain.id, kind, ?err, "transaction failed");
                metrics::transaction("failed");
                TransactionOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}

/// Converts a whole token amount into the token's smallest unit using the
/// decimals reported by the contract.
async fn token_units(
    node: &dyn blockchain::Node,
    chain: &ChainDescriptor,
    token: eth::TokenAddress,
    amount: &BigDecimal,
) -> Result<eth::U256, TransactionError> {
    let decimals = erc20::decimals(node, token).await?;
    if let Some(configured) = chain.tokens.iter().find(|t| t.address == token) {
        if configured.decimals != decimals {
            tracing::warn!(
                chain = %chain.id,
                symbol = %configured.symbol,
                configured = configured.decimals,
                actual = decimals,
                "token decimals differ from the registry"
            );
        }
    }
    conv::decimal_to_units(amount, decimals)
        .ok_or_else(|| TransactionError::InvalidAmount(amount.clone()))
}

/// Prices, sends and confirms a transaction. Returns the receipt's hash when
/// the node reports one and the submission hash otherwise.
async fn submit(
    node: &dyn blockchain::Node,
    tx: TransactionRequest,
    estimate: Option<&GasEstimate>,
) -> Result<eth::TxHash, TransactionError> {
    let (gas_limit, fees) = match estimate {
        Some(estimate) => (estimate.gas_limit, estimate.fees),
        None => {
            let (gas_limit, fee_data) =
                tokio::try_join!(node.estimate_gas(tx.clone()), node.fee_data())?;
            let fees = fee_data.select().ok_or(TransactionError::NoFeeData)?;
            (gas_limit, fees)
        }
    };
    let tx = fees.apply(tx.with_gas_limit(gas_limit));

    let submitted = node.send_transaction(tx).await?;
    tracing::debug!(hash = %submitted, "transaction submitted");
    let receipt = node.receipt(submitted).await?;
    let hash = match receipt.transaction_hash {
        Some(mined) if mined != submitted => {
            tracing::warn!(%submitted, %mined, "receipt hash differs from the submitted hash");
            mined
        }
        Some(mined) => mined,
        None => submitted,
    };
    if !receipt.success {
        return Err(TransactionError::Reverted(hash));
    }
    Ok(hash)
}

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("chain unavailable: {0}")]
    ChainUnavailable(blockchain::Error),
    #[error(transparent)]
    Node(#[from] blockchain::Error),
    #[error("invalid amount {0}")]
    InvalidAmount(BigDecimal),
    #[error("no fee data available")]
    NoFeeData,
    #[error("transaction {0} reverted")]
    Reverted(eth::TxHash),
}
