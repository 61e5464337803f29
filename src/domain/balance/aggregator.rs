use {
    super::{AggregatedBalances, BalanceEntry, ChainBalanceSet},
    crate::{
        domain::{
            eth,
            registry::{ChainDescriptor, Registry, TokenDescriptor},
        },
        infra::{blockchain, erc20, metrics},
        util::conv,
    },
    futures::future,
    std::sync::{
        Arc,
        atomic::{self, AtomicU64},
    },
    tracing::Instrument,
};

/// Fetches the balances of an address from every registry chain.
pub struct Aggregator {
    registry: Arc<Registry>,
    connector: Arc<dyn blockchain::Connect>,
}

impl Aggregator {
    pub fn new(registry: Arc<Registry>, connector: Arc<dyn blockchain::Connect>) -> Self {
        Self {
            registry,
            connector,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Fetches the native and token balances of `owner` on all chains
    /// concurrently. Never fails: balances that can't be fetched are reported
    /// as errors and don't affect any other balance.
    pub async fn fetch_all_balances(&self, owner: eth::Address) -> AggregatedBalances {
        static ID: AtomicU64 = AtomicU64::new(0);
        let id = ID.fetch_add(1, atomic::Ordering::Relaxed);

        let chains = self.registry.chains().iter().map(|chain| async move {
            (chain.id.clone(), self.fetch_chain(chain, owner).await)
        });
        let balances = future::join_all(chains)
            .instrument(tracing::trace_span!("balances", id = %id, %owner))
            .await;
        AggregatedBalances(balances.into_iter().collect())
    }

    async fn fetch_chain(&self, chain: &ChainDescriptor, owner: eth::Address) -> ChainBalanceSet {
        let node = match self.connector.connect(chain) {
            Ok(node) => node,
            Err(err) => {
                tracing::warn!(chain = %chain.id, ?err, "chain unavailable");
                metrics::balance_fetch_error("chain");
                return ChainBalanceSet::uniform(chain, BalanceEntry::error());
            }
        };
        let node = node.as_ref();

        let tokens = chain.tokens.iter().map(|token| async move {
            let entry = fetch_token(node, chain, token, owner).await;
            (token.symbol.clone(), entry)
        });
        let (native, tokens) =
            tokio::join!(fetch_native(node, chain, owner), future::join_all(tokens));

        ChainBalanceSet {
            native,
            tokens: tokens.into_iter().collect(),
        }
    }

    /// Reads the symbol of a token contract, e.g. for tokens that aren't in
    /// the registry.
    pub async fn token_symbol(
        &self,
        chain: &ChainDescriptor,
        token: eth::TokenAddress,
    ) -> Result<String, blockchain::Error> {
        let node = self.connector.connect(chain)?;
        erc20::symbol(node.as_ref(), token).await
    }
}

async fn fetch_native(
    node: &dyn blockchain::Node,
    chain: &ChainDescriptor,
    owner: eth::Address,
) -> BalanceEntry {
    match node.balance(owner).await {
        Ok(wei) => BalanceEntry::loaded(conv::ether_to_decimal(&eth::Ether(wei))),
        Err(err) => {
            tracing::warn!(
                chain = %chain.id,
                symbol = %chain.native_symbol,
                ?err,
                "failed to fetch native balance"
            );
            metrics::balance_fetch_error("native");
            BalanceEntry::error()
        }
    }
}

async fn fetch_token(
    node: &dyn blockchain::Node,
    chain: &ChainDescriptor,
    token: &TokenDescriptor,
    owner: eth::Address,
) -> BalanceEntry {
    match erc20::balance_of(node, token.address, owner).await {
        Ok(units) => BalanceEntry::loaded(conv::units_to_decimal(&units, token.decimals)),
        Err(err) => {
            tracing::warn!(
                chain = %chain.id,
                symbol = %token.symbol,
                ?err,
                "failed to fetch token balance"
            );
            metrics::balance_fetch_error("token");
            BalanceEntry::error()
        }
    }
}
