use {
    crate::{
        domain::{
            balance::{self, Aggregator},
            fee::Estimator,
            registry::{ChainDescriptor, Registry},
            transfer::Executor,
        },
        infra::{self, blockchain},
    },
    std::sync::Arc,
};

/// The wallet engine: the registry plus the services operating on it. All of
/// them share one connector, nodes are connected per operation.
pub struct Engine {
    registry: Arc<Registry>,
    balances: balance::Cache,
    estimator: Estimator,
    executor: Executor,
}

impl Engine {
    /// An engine talking to the configured chains over JSON-RPC.
    pub fn new(config: infra::Config) -> Self {
        let connector = Arc::new(blockchain::Connector::new(config.timeouts));
        Self::with_connector(config.registry, connector, config.cache)
    }

    pub fn with_connector(
        registry: Arc<Registry>,
        connector: Arc<dyn blockchain::Connect>,
        cache: balance::CacheConfig,
    ) -> Self {
        let aggregator = Aggregator::new(registry.clone(), connector.clone());
        Self {
            balances: balance::Cache::new(aggregator, cache),
            estimator: Estimator::new(connector.clone()),
            executor: Executor::new(connector),
            registry,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Looks up a registry chain by id.
    pub fn chain(&self, id: &str) -> Result<&ChainDescriptor, UnknownChain> {
        self.registry
            .chain(id)
            .ok_or_else(|| UnknownChain(id.to_owned()))
    }

    pub fn balances(&self) -> &balance::Cache {
        &self.balances
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}

#[derive(Debug, thiserror::Error)]
#[error("chain {0} is not in the registry")]
pub struct UnknownChain(pub String);
