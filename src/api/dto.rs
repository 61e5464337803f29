use {
    crate::domain::{balance, eth, fee, registry::ChainDescriptor, transfer},
    bigdecimal::BigDecimal,
    serde::Serialize,
    serde_with::{DisplayFromStr, serde_as},
    std::collections::BTreeMap,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    pub owner: eth::Address,
    pub chains: BTreeMap<String, ChainBalances>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBalances {
    pub native: Balance,
    pub tokens: BTreeMap<String, Balance>,
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: BigDecimal,
    pub value: f64,
    pub state: LoadState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    Loading,
    Loaded,
    Error,
}

impl Balances {
    pub fn from_domain(owner: eth::Address, balances: &balance::AggregatedBalances) -> Self {
        Self {
            owner,
            chains: balances
                .0
                .iter()
                .map(|(chain, set)| {
                    let set = ChainBalances {
                        native: Balance::from_domain(&set.native),
                        tokens: set
                            .tokens
                            .iter()
                            .map(|(symbol, entry)| (symbol.clone(), Balance::from_domain(entry)))
                            .collect(),
                    };
                    (chain.0.clone(), set)
                })
                .collect(),
        }
    }
}

impl Balance {
    fn from_domain(entry: &balance::BalanceEntry) -> Self {
        Self {
            amount: entry.amount.clone(),
            value: entry.value(),
            state: match entry.state {
                balance::LoadState::Loading => LoadState::Loading,
                balance::LoadState::Loaded => LoadState::Loaded,
                balance::LoadState::Error => LoadState::Error,
            },
        }
    }
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub gas_limit: u64,
    #[serde(flatten)]
    pub fees: Fees,
    #[serde_as(as = "DisplayFromStr")]
    pub network_fee: BigDecimal,
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(tag = "feeMode", rename_all = "camelCase")]
pub enum Fees {
    #[serde(rename_all = "camelCase")]
    Eip1559 {
        #[serde_as(as = "DisplayFromStr")]
        max_fee_per_gas: u128,
        #[serde_as(as = "DisplayFromStr")]
        max_priority_fee_per_gas: u128,
    },
    #[serde(rename_all = "camelCase")]
    Legacy {
        #[serde_as(as = "DisplayFromStr")]
        gas_price: u128,
    },
}

impl Estimate {
    pub fn from_domain(estimate: &fee::GasEstimate) -> Self {
        Self {
            gas_limit: estimate.gas_limit,
            fees: match estimate.fees {
                fee::Fees::Eip1559 {
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                } => Fees::Eip1559 {
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                },
                fee::Fees::Legacy { gas_price } => Fees::Legacy { gas_price },
            },
            network_fee: estimate.network_fee.clone(),
        }
    }
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSendable {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: BigDecimal,
    /// Why the fee couldn't be reserved, in which case `amount` is the whole
    /// balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimation_error: Option<String>,
}

impl MaxSendable {
    pub fn from_domain(max: &fee::MaxSendable) -> Self {
        Self {
            amount: max.amount.clone(),
            estimation_error: max.estimation_error.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    #[serde(rename_all = "camelCase")]
    Confirmed {
        hash: eth::TxHash,
        explorer_url: String,
    },
    Failed {
        error: String,
    },
}

impl Outcome {
    pub fn from_domain(chain: &ChainDescriptor, outcome: &transfer::TransactionOutcome) -> Self {
        match outcome {
            transfer::TransactionOutcome::Confirmed { hash } => Self::Confirmed {
                hash: *hash,
                explorer_url: chain.explorer_url(hash),
            },
            transfer::TransactionOutcome::Failed { error } => Self::Failed {
                error: error.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::registry::ChainId,
        maplit::btreemap,
        serde_json::json,
    };

    #[test]
    fn balances() {
        let balances = balance::AggregatedBalances(btreemap! {
            ChainId::from("Ethereum") => balance::ChainBalanceSet {
                native: balance::BalanceEntry::loaded("1.5".parse().unwrap()),
                tokens: btreemap! {
                    "USDC".to_owned() => balance::BalanceEntry::error(),
                },
            },
        });
        let owner = eth::Address::repeat_byte(0x2a);

        assert_eq!(
            serde_json::to_value(Balances::from_domain(owner, &balances)).unwrap(),
            json!({
                "owner": "0x2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a",
                "chains": {
                    "Ethereum": {
                        "native": { "amount": "1.5", "value": 1.5, "state": "loaded" },
                        "tokens": {
                            "USDC": { "amount": "0", "value": 0.0, "state": "error" },
                        },
                    },
                },
            })
        );
    }

    #[test]
    fn estimate() {
        let estimate = fee::GasEstimate::new(
            21_000,
            fee::Fees::Eip1559 {
                max_fee_per_gas: 50_000_000_000,
                max_priority_fee_per_gas: 2_000_000_000,
            },
        );

        assert_eq!(
            serde_json::to_value(Estimate::from_domain(&estimate)).unwrap(),
            json!({
                "gasLimit": 21000,
                "feeMode": "eip1559",
                "maxFeePerGas": "50000000000",
                "maxPriorityFeePerGas": "2000000000",
                "networkFee": "0.00105",
            })
        );
    }

    #[test]
    fn max_sendable_without_fee() {
        let max = fee::MaxSendable {
            amount: "2".parse().unwrap(),
            estimation_error: Some(fee::EstimationError::NoFeeData),
        };

        assert_eq!(
            serde_json::to_value(MaxSendable::from_domain(&max)).unwrap(),
            json!({ "amount": "2", "estimationError": "no fee data available" })
        );
    }

    #[test]
    fn failed_outcome() {
        let chain = ChainDescriptor {
            id: "Ethereum".into(),
            rpc_url: "http://localhost:8545".parse().unwrap(),
            native_symbol: "ETH".to_owned(),
            explorer_url: "https://etherscan.io/tx/".to_owned(),
            tokens: vec![],
        };
        let outcome = transfer::TransactionOutcome::Failed {
            error: "no fee data available".to_owned(),
        };

        assert_eq!(
            serde_json::to_value(Outcome::from_domain(&chain, &outcome)).unwrap(),
            json!({ "status": "failed", "error": "no fee data available" })
        );
    }
}
