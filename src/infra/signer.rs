//! Local signers for submitting transactions.

use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};

/// A signer for a hex encoded private key, with or without `0x` prefix.
pub fn from_private_key(key: &str) -> Result<PrivateKeySigner, Error> {
    let key = key.trim();
    key.strip_prefix("0x")
        .unwrap_or(key)
        .parse()
        .map_err(|_| Error::InvalidPrivateKey)
}

/// The signer of account `index` of a BIP-39 phrase, derived along the
/// standard Ethereum path `m/44'/60'/0'/0/{index}`.
pub fn from_mnemonic(phrase: &str, index: u32) -> Result<PrivateKeySigner, Error> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase.trim())
        .index(index)
        .map_err(|err| Error::InvalidMnemonic(err.to_string()))?
        .build()
        .map_err(|err| Error::InvalidMnemonic(err.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Never include the key material.
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
}
