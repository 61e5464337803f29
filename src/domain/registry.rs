//! The static chain and token registry. Built once at startup from
//! configuration and shared read-only with every component.

use {
    crate::domain::eth,
    std::{
        collections::HashSet,
        fmt::{self, Display, Formatter},
    },
};

/// Identifies a chain in the registry, e.g. `Ethereum` or `Polygon`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChainId(pub String);

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An ERC20 token supported on a chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub name: String,
    /// Decimals as configured. Used for displaying balances only, transfers
    /// always read the decimals from the token contract.
    pub decimals: u8,
    pub address: eth::TokenAddress,
    /// Display metadata (icon name or URL), opaque to the engine.
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainDescriptor {
    pub id: ChainId,
    pub rpc_url: reqwest::Url,
    pub native_symbol: String,
    /// Prefix that a transaction hash gets appended to.
    pub explorer_url: String,
    pub tokens: Vec<TokenDescriptor>,
}

impl ChainDescriptor {
    /// Returns the block explorer link for a transaction on this chain.
    pub fn explorer_url(&self, hash: &eth::TxHash) -> String {
        format!("{}{hash:#x}", self.explorer_url)
    }

    pub fn token(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|token| token.symbol == symbol)
    }
}

/// All chains the wallet knows about, in display order.
#[derive(Clone, Debug)]
pub struct Registry {
    chains: Vec<ChainDescriptor>,
}

impl Registry {
    pub fn new(chains: Vec<ChainDescriptor>) -> Result<Self, InvalidRegistry> {
        let mut ids = HashSet::new();
        for chain in &chains {
            if !ids.insert(&chain.id) {
                return Err(InvalidRegistry::DuplicateChain(chain.id.clone()));
            }
            let mut symbols = HashSet::new();
            for token in &chain.tokens {
                if !symbols.insert(&token.symbol) {
                    return Err(InvalidRegistry::DuplicateToken {
                        chain: chain.id.clone(),
                        symbol: token.symbol.clone(),
                    });
                }
            }
        }
        Ok(Self { chains })
    }

    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    pub fn chain(&self, id: &str) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|chain| chain.id.0 == id)
    }

    /// Returns the block explorer link for a transaction, if the chain is
    /// known.
    pub fn explorer_url(&self, chain: &str, hash: &eth::TxHash) -> Option<String> {
        self.chain(chain).map(|chain| chain.explorer_url(hash))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidRegistry {
    #[error("chain {0} is configured more than once")]
    DuplicateChain(ChainId),
    #[error("token {symbol} is configured more than once on chain {chain}")]
    DuplicateToken { chain: ChainId, symbol: String },
}
