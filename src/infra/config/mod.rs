use {
    crate::{domain::balance, domain::registry::Registry, infra::blockchain},
    std::sync::Arc,
};

pub mod file;

/// Everything needed to assemble an [`crate::Engine`].
#[derive(Clone, Debug)]
pub struct Config {
    pub registry: Arc<Registry>,
    pub timeouts: blockchain::Timeouts,
    pub cache: balance::CacheConfig,
}
