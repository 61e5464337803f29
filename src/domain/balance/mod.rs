//! Balances of one address across every registry chain.

use {
    crate::domain::registry::{ChainDescriptor, ChainId, Registry},
    bigdecimal::{BigDecimal, ToPrimitive, Zero},
    std::collections::BTreeMap,
};

mod aggregator;
mod cache;

pub use self::{
    aggregator::Aggregator,
    cache::{Cache, Config as CacheConfig},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded,
    Error,
}

/// A single balance, already adjusted for the asset's decimals.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceEntry {
    pub amount: BigDecimal,
    pub state: LoadState,
}

impl BalanceEntry {
    pub fn loading() -> Self {
        Self {
            amount: BigDecimal::zero(),
            state: LoadState::Loading,
        }
    }

    pub fn loaded(amount: BigDecimal) -> Self {
        Self {
            amount,
            state: LoadState::Loaded,
        }
    }

    /// A balance that couldn't be fetched. Displayed as zero.
    pub fn error() -> Self {
        Self {
            amount: BigDecimal::zero(),
            state: LoadState::Error,
        }
    }

    /// The amount as a float, for display only.
    pub fn value(&self) -> f64 {
        self.amount.to_f64().unwrap_or_default()
    }
}

/// The native balance and all supported token balances on one chain. Tokens
/// are keyed by symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainBalanceSet {
    pub native: BalanceEntry,
    pub tokens: BTreeMap<String, BalanceEntry>,
}

impl ChainBalanceSet {
    /// A set where the native and every token balance of `chain` is `entry`.
    pub fn uniform(chain: &ChainDescriptor, entry: BalanceEntry) -> Self {
        Self {
            tokens: chain
                .tokens
                .iter()
                .map(|token| (token.symbol.clone(), entry.clone()))
                .collect(),
            native: entry,
        }
    }
}

/// Balances of one address on every registry chain. Every chain and every
/// supported token of the registry it was built for has an entry.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedBalances(pub BTreeMap<ChainId, ChainBalanceSet>);

impl AggregatedBalances {
    /// The placeholder shown while the first fetch is in flight.
    pub fn loading(registry: &Registry) -> Self {
        Self(
            registry
                .chains()
                .iter()
                .map(|chain| {
                    (
                        chain.id.clone(),
                        ChainBalanceSet::uniform(chain, BalanceEntry::loading()),
                    )
                })
                .collect(),
        )
    }

    pub fn chain(&self, id: &str) -> Option<&ChainBalanceSet> {
        self.0.get(&ChainId::from(id))
    }

    /// Iterates over all entries as `(chain, symbol, entry)`, native entries
    /// first within each chain. Native entries have no symbol.
    pub fn entries(&self) -> impl Iterator<Item = (&ChainId, Option<&str>, &BalanceEntry)> {
        self.0.iter().flat_map(|(chain, set)| {
            std::iter::once((chain, None, &set.native)).chain(
                set.tokens
                    .iter()
                    .map(move |(symbol, entry)| (chain, Some(symbol.as_str()), entry)),
            )
        })
    }
}
