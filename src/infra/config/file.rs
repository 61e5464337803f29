use {
    crate::{
        domain::{
            balance,
            eth,
            registry::{ChainDescriptor, Registry, TokenDescriptor},
        },
        infra::blockchain,
    },
    serde::Deserialize,
    serde_with::serde_as,
    std::{path::Path, sync::Arc, time::Duration},
    tokio::fs,
};

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// Upper bound for a single RPC request.
    #[serde(with = "humantime_serde", default = "default_rpc_timeout")]
    rpc_timeout: Duration,

    /// How long to wait for a submitted transaction to be mined.
    #[serde(with = "humantime_serde", default = "default_confirmation_timeout")]
    confirmation_timeout: Duration,

    /// How long fetched balances are served from the cache.
    #[serde(with = "humantime_serde", default = "default_cache_ttl")]
    cache_ttl: Duration,

    /// Coalesce concurrent balance fetches for the same address.
    #[serde(default)]
    single_flight: bool,

    /// The supported chains, in display order.
    chains: Vec<ChainConfig>,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ChainConfig {
    id: String,

    /// JSON-RPC endpoint of the chain.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    rpc_url: reqwest::Url,

    native_symbol: String,

    /// Transaction hashes get appended to this to link to a block explorer.
    explorer_url: String,

    #[serde(default)]
    tokens: Vec<TokenConfig>,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TokenConfig {
    symbol: String,
    name: String,
    decimals: u8,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    address: eth::Address,
    #[serde(default)]
    icon: Option<String>,
}

fn default_rpc_timeout() -> Duration {
    blockchain::Timeouts::default().rpc
}

fn default_confirmation_timeout() -> Duration {
    blockchain::Timeouts::default().confirmation
}

fn default_cache_ttl() -> Duration {
    balance::CacheConfig::default().ttl
}

/// Load the wallet engine configuration from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> super::Config {
    let data = fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("I/O error while reading {path:?}: {e:?}"));
    let config = toml::de::from_str::<Config>(&data)
        .unwrap_or_else(|e| panic!("TOML syntax error while reading {path:?}: {e}"));

    let chains = config
        .chains
        .into_iter()
        .map(|chain| ChainDescriptor {
            id: chain.id.into(),
            rpc_url: chain.rpc_url,
            native_symbol: chain.native_symbol,
            explorer_url: chain.explorer_url,
            tokens: chain
                .tokens
                .into_iter()
                .map(|token| TokenDescriptor {
                    symbol: token.symbol,
                    name: token.name,
                    decimals: token.decimals,
                    address: token.address.into(),
                    icon: token.icon,
                })
                .collect(),
        })
        .collect();
    let registry =
        Registry::new(chains).unwrap_or_else(|e| panic!("invalid registry in {path:?}: {e}"));

    super::Config {
        registry: Arc::new(registry),
        timeouts: blockchain::Timeouts {
            rpc: config.rpc_timeout,
            confirmation: config.confirmation_timeout,
        },
        cache: balance::CacheConfig {
            ttl: config.cache_ttl,
            single_flight: config.single_flight,
        },
    }
}
