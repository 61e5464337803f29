//! Network fee negotiation: picking between EIP-1559 and legacy pricing,
//! estimating the total fee of a transfer and reserving it from the amount a
//! user can send.

use {
    crate::{
        domain::{eth, registry::ChainDescriptor},
        infra::{blockchain, metrics},
        util::conv,
    },
    alloy::{network::TransactionBuilder, rpc::types::TransactionRequest},
    bigdecimal::{BigDecimal, Zero},
    num::BigInt,
    std::{cmp, sync::Arc},
};

/// Fee data as reported by a node. Networks that don't support a pricing
/// model leave its fields empty.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FeeData {
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
    /// Fee data of a network without EIP-1559 support.
    pub fn legacy(gas_price: u128) -> Self {
        Self {
            gas_price: Some(gas_price),
            ..Default::default()
        }
    }

    /// Fee data of an EIP-1559 network. The max fee leaves room for the base
    /// fee to double before the transaction gets included.
    pub fn with_base_fee(gas_price: u128, base_fee: u128, priority_fee: u128) -> Self {
        Self {
            gas_price: Some(gas_price),
            max_fee_per_gas: Some(base_fee.saturating_mul(2).saturating_add(priority_fee)),
            max_priority_fee_per_gas: Some(priority_fee),
        }
    }

    /// Chooses the pricing model. EIP-1559 wins whenever both of its fields
    /// are present, legacy gas price is the fallback.
    pub fn select(&self) -> Option<Fees> {
        match *self {
            Self {
                max_fee_per_gas: Some(max_fee_per_gas),
                max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
                ..
            } => Some(Fees::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            }),
            Self {
                gas_price: Some(gas_price),
                ..
            } => Some(Fees::Legacy { gas_price }),
            _ => None,
        }
    }
}

/// The fee fields attached to a transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fees {
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        gas_price: u128,
    },
}

impl Fees {
    /// The highest price per gas unit the transaction may pay.
    pub fn max_price_per_gas(&self) -> u128 {
        match self {
            Self::Eip1559 {
                max_fee_per_gas, ..
            } => *max_fee_per_gas,
            Self::Legacy { gas_price } => *gas_price,
        }
    }

    /// Sets the fee fields on a transaction, marking EIP-1559 transactions as
    /// type 2.
    pub fn apply(&self, tx: TransactionRequest) -> TransactionRequest {
        match *self {
            Self::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let mut tx = tx
                    .with_max_fee_per_gas(max_fee_per_gas)
                    .with_max_priority_fee_per_gas(max_priority_fee_per_gas);
                tx.transaction_type = Some(2);
                tx
            }
            Self::Legacy { gas_price } => tx.with_gas_price(gas_price),
        }
    }
}

/// A priced gas estimate for a transfer.
#[derive(Clone, Debug, PartialEq)]
pub struct GasEstimate {
    pub gas_limit: u64,
    pub fees: Fees,
    /// `gas_limit * max price per gas`, in native units (ETH, not wei).
    pub network_fee: BigDecimal,
}

impl GasEstimate {
    pub fn new(gas_limit: u64, fees: Fees) -> Self {
        let wei = eth::U256::from(gas_limit) * eth::U256::from(fees.max_price_per_gas());
        Self {
            gas_limit,
            fees,
            network_fee: conv::ether_to_decimal(&eth::Ether(wei)),
        }
    }
}

/// Amount held back on top of the estimated fee to absorb fee changes
/// between estimation and submission: 0.0001 native units.
pub fn safety_buffer() -> BigDecimal {
    BigDecimal::new(BigInt::from(1), 4)
}

/// The largest amount of the native asset that can be sent from `balance`
/// while leaving enough for the network fee. Without an estimate (because
/// estimation failed) the whole balance is returned.
pub fn max_sendable(balance: &BigDecimal, estimate: Option<&GasEstimate>) -> BigDecimal {
    let Some(estimate) = estimate else {
        return balance.clone();
    };
    let zero = BigDecimal::zero();
    let raw = cmp::max(zero.clone(), balance - &estimate.network_fee);
    cmp::max(zero, raw - safety_buffer())
}

/// Estimates network fees for native transfers.
pub struct Estimator {
    connector: Arc<dyn blockchain::Connect>,
}

impl Estimator {
    pub fn new(connector: Arc<dyn blockchain::Connect>) -> Self {
        Self { connector }
    }

    /// Estimates the gas and network fee for sending `amount` of the native
    /// asset from `from` to `to`.
    pub async fn estimate(
        &self,
        chain: &ChainDescriptor,
        from: eth::Address,
        to: eth::Address,
        amount: &BigDecimal,
    ) -> Result<GasEstimate, EstimationError> {
        let result = self.try_estimate(chain, from, to, amount).await;
        match &result {
            Ok(estimate) => tracing::debug!(
                chain = %chain.id,
                gas_limit = estimate.gas_limit,
                fees = ?estimate.fees,
                network_fee = %estimate.network_fee,
                "estimated network fee"
            ),
            Err(err) => {
                tracing::warn!(chain = %chain.id, ?err, "network fee estimation failed");
                metrics::estimation_failed(err.format_variant());
            }
        }
        result
    }

    async fn try_estimate(
        &self,
        chain: &ChainDescriptor,
        from: eth::Address,
        to: eth::Address,
        amount: &BigDecimal,
    ) -> Result<GasEstimate, EstimationError> {
        let value = conv::decimal_to_ether(amount)
            .ok_or_else(|| EstimationError::InvalidAmount(amount.clone()))?;
        let node = self
            .connector
            .connect(chain)
            .map_err(EstimationError::ChainUnavailable)?;

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value.0);
        let (gas_limit, fee_data) = tokio::try_join!(node.estimate_gas(tx), node.fee_data())?;
        let fees = fee_data.select().ok_or(EstimationError::NoFeeData)?;

        Ok(GasEstimate::new(gas_limit, fees))
    }

    /// [`max_sendable`] for the native `balance` of `from`, falling back to
    /// the full balance when the fee can't be estimated.
    pub async fn max_sendable(
        &self,
        chain: &ChainDescriptor,
        from: eth::Address,
        to: eth::Address,
        balance: &BigDecimal,
    ) -> MaxSendable {
        match self.estimate(chain, from, to, balance).await {
            Ok(estimate) => MaxSendable {
                amount: max_sendable(balance, Some(&estimate)),
                estimation_error: None,
            },
            Err(err) => {
                tracing::info!(
                    chain = %chain.id,
                    "sending the full balance since the network fee is unknown"
                );
                MaxSendable {
                    amount: max_sendable(balance, None),
                    estimation_error: Some(err),
                }
            }
        }
    }
}

/// The amount that can be sent, along with the reason the network fee
/// couldn't be reserved, if it couldn't.
#[derive(Debug)]
pub struct MaxSendable {
    pub amount: BigDecimal,
    pub estimation_error: Option<EstimationError>,
}

#[derive(Debug, thiserror::Error)]
pub enum EstimationError {
    #[error("invalid native amount {0}")]
    InvalidAmount(BigDecimal),
    #[error("chain unavailable: {0}")]
    ChainUnavailable(blockchain::Error),
    #[error(transparent)]
    Node(#[from] blockchain::Error),
    #[error("no fee data available")]
    NoFeeData,
}

impl EstimationError {
    /// for instrumentization purposes
    pub fn format_variant(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "InvalidAmount",
            Self::ChainUnavailable(_) => "ChainUnavailable",
            Self::Node(_) => "Node",
            Self::NoFeeData => "NoFeeData",
        }
    }
}
