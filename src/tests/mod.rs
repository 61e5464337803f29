//! Tests running the engine against scripted chains.

use {
    crate::{
        domain::{
            balance,
            eth,
            registry::{ChainDescriptor, Registry, TokenDescriptor},
        },
        engine::Engine,
    },
    alloy::{primitives::address, signers::local::PrivateKeySigner},
    bigdecimal::BigDecimal,
    std::sync::Arc,
};

pub mod mock;

pub const OWNER: eth::Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const RECIPIENT: eth::Address = address!("0x2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a");

pub const USDC: eth::Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
pub const USDT: eth::Address = address!("0xdAC17F958D2ee523a2206206994597C13D831ec7");
pub const POLYGON_USDC: eth::Address = address!("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359");
pub const BASE_DAI: eth::Address = address!("0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb");

/// Three chains: Ethereum with USDC and USDT, Polygon with USDC and Base
/// with DAI.
pub fn registry() -> Arc<Registry> {
    let token = |symbol: &str, name: &str, decimals: u8, address: eth::Address| TokenDescriptor {
        symbol: symbol.to_owned(),
        name: name.to_owned(),
        decimals,
        address: address.into(),
        icon: None,
    };
    let chain = |id: &str, port: u16, native: &str, explorer: &str, tokens: Vec<_>| {
        ChainDescriptor {
            id: id.into(),
            rpc_url: format!("http://localhost:{port}").parse().unwrap(),
            native_symbol: native.to_owned(),
            explorer_url: explorer.to_owned(),
            tokens,
        }
    };

    Arc::new(
        Registry::new(vec![
            chain(
                "Ethereum",
                8545,
                "ETH",
                "https://etherscan.io/tx/",
                vec![
                    token("USDC", "USD Coin", 6, USDC),
                    token("USDT", "Tether USD", 6, USDT),
                ],
            ),
            chain(
                "Polygon",
                8546,
                "POL",
                "https://polygonscan.com/tx/",
                vec![token("USDC", "USD Coin", 6, POLYGON_USDC)],
            ),
            chain(
                "Base",
                8547,
                "ETH",
                "https://basescan.org/tx/",
                vec![token("DAI", "Dai Stablecoin", 18, BASE_DAI)],
            ),
        ])
        .unwrap(),
    )
}

/// A node holding nothing but answering every balance request of its chain.
pub fn empty_node(chain: &str) -> mock::Node {
    let node = mock::Node::new().native(eth::U256::ZERO);
    registry()
        .chain(chain)
        .unwrap()
        .tokens
        .iter()
        .fold(node, |node, token| node.token(token.address.0, eth::U256::ZERO))
}

pub fn engine(connector: Arc<mock::Connector>, cache: balance::CacheConfig) -> Engine {
    Engine::with_connector(registry(), connector, cache)
}

pub fn decimal(value: &str) -> BigDecimal {
    value.parse().unwrap()
}

pub fn ether(value: &str) -> eth::U256 {
    crate::util::conv::decimal_to_ether(&decimal(value)).unwrap().0
}

/// The account of [`OWNER`].
pub fn signer() -> PrivateKeySigner {
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        .parse()
        .unwrap()
}
