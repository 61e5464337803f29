pub use alloy::primitives::{Address, Bytes, TxHash, U256};

/// The number of decimals of every EVM chain's native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// An ERC20 token address.
///
/// https://eips.ethereum.org/EIPS/eip-20
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TokenAddress(pub Address);

impl From<Address> for TokenAddress {
    fn from(inner: Address) -> Self {
        Self(inner)
    }
}

/// A native asset amount in wei.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ether(pub U256);

impl From<U256> for Ether {
    fn from(value: U256) -> Self {
        Self(value)
    }
}
