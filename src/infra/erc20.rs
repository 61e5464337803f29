//! Bindings to the parts of the ERC20 token standard the wallet uses.
//!
//! https://eips.ethereum.org/EIPS/eip-20

use {
    crate::{
        domain::eth,
        infra::blockchain::{Error, Node},
    },
    alloy::sol_types::SolCall,
};

mod abi {
    alloy::sol! {
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

pub use abi::{
    allowanceCall,
    approveCall,
    balanceOfCall,
    decimalsCall,
    symbolCall,
    transferCall,
};

/// Token balance of `owner` in the token's smallest unit.
pub async fn balance_of(
    node: &dyn Node,
    token: eth::TokenAddress,
    owner: eth::Address,
) -> Result<eth::U256, Error> {
    let data = abi::balanceOfCall { owner }.abi_encode();
    let result = node.call(token.0, data.into()).await?;
    abi::balanceOfCall::abi_decode_returns(&result).map_err(Error::decode("balanceOf"))
}

pub async fn decimals(node: &dyn Node, token: eth::TokenAddress) -> Result<u8, Error> {
    let data = abi::decimalsCall {}.abi_encode();
    let result = node.call(token.0, data.into()).await?;
    abi::decimalsCall::abi_decode_returns(&result).map_err(Error::decode("decimals"))
}

pub async fn symbol(node: &dyn Node, token: eth::TokenAddress) -> Result<String, Error> {
    let data = abi::symbolCall {}.abi_encode();
    let result = node.call(token.0, data.into()).await?;
    abi::symbolCall::abi_decode_returns(&result).map_err(Error::decode("symbol"))
}

pub async fn allowance(
    node: &dyn Node,
    token: eth::TokenAddress,
    owner: eth::Address,
    spender: eth::Address,
) -> Result<eth::U256, Error> {
    let data = abi::allowanceCall { owner, spender }.abi_encode();
    let result = node.call(token.0, data.into()).await?;
    abi::allowanceCall::abi_decode_returns(&result).map_err(Error::decode("allowance"))
}

/// Calldata for transferring `amount` tokens to `to`.
pub fn transfer(to: eth::Address, amount: eth::U256) -> eth::Bytes {
    abi::transferCall { to, amount }.abi_encode().into()
}

/// Calldata for allowing `spender` to move up to `amount` tokens.
pub fn approve(spender: eth::Address, amount: eth::U256) -> eth::Bytes {
    abi::approveCall { spender, amount }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::infra::blockchain::MockNode,
        alloy::{
            primitives::{U256, address},
            sol_types::SolValue,
        },
    };

    const USDC: eth::TokenAddress =
        eth::TokenAddress(address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));

    #[test]
    fn transfer_calldata_layout() {
        let to = address!("0x9008D19f58AAbD9eD0D60971565AA8510560ab41");
        let data = transfer(to, U256::from(10_000_000));

        assert_eq!(data[..4], transferCall::SELECTOR);
        assert_eq!(data[16..36], to[..]);
        assert_eq!(data[36..68], U256::from(10_000_000).to_be_bytes::<32>());
    }

    #[tokio::test]
    async fn decodes_balance_and_decimals() {
        let mut node = MockNode::new();
        node.expect_call()
            .withf(|to, data| *to == USDC.0 && data[..4] == balanceOfCall::SELECTOR)
            .returning(|_, _| Ok(U256::from(1_500_000).abi_encode().into()));
        node.expect_call()
            .withf(|to, data| *to == USDC.0 && data[..4] == decimalsCall::SELECTOR)
            .returning(|_, _| Ok(U256::from(6).abi_encode().into()));

        assert_eq!(
            balance_of(&node, USDC, eth::Address::ZERO).await.unwrap(),
            U256::from(1_500_000)
        );
        assert_eq!(decimals(&node, USDC).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn malformed_return_data_is_a_decode_error() {
        let mut node = MockNode::new();
        node.expect_call()
            .returning(|_, _| Ok(eth::Bytes::from_static(&[1, 2, 3])));

        assert!(matches!(
            balance_of(&node, USDC, eth::Address::ZERO).await,
            Err(Error::Decode {
                method: "balanceOf",
                ..
            })
        ));
    }
}
