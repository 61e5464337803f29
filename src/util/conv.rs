//! Conversion utilities.

use {
    crate::domain::eth,
    alloy::primitives::U256,
    bigdecimal::{BigDecimal, num_bigint::ToBigInt},
    num::{BigInt, BigUint, One, Zero},
};

pub fn biguint_to_u256(i: &BigUint) -> Option<U256> {
    let bytes = i.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    Some(U256::from_be_slice(&bytes))
}

pub fn u256_to_biguint(i: &U256) -> BigUint {
    BigUint::from_bytes_be(&i.to_be_bytes::<32>())
}

pub fn bigint_to_u256(i: &BigInt) -> Option<U256> {
    if i.sign() == num::bigint::Sign::Minus {
        return None;
    }
    biguint_to_u256(i.magnitude())
}

pub fn bigdecimal_to_u256(d: &BigDecimal) -> Option<U256> {
    let d = d.to_bigint()?;
    bigint_to_u256(&d)
}

/// Converts a decimal amount into the smallest unit of an asset with the
/// specified number of decimals. Returns `None` for negative amounts, amounts
/// with more fractional digits than `decimals` and amounts that overflow a
/// `U256`.
pub fn decimal_to_units(d: &BigDecimal, decimals: u8) -> Option<U256> {
    let scaled = d * BigDecimal::new(BigInt::one(), -i64::from(decimals));
    if scaled.with_scale(0) != scaled {
        return None;
    }
    bigdecimal_to_u256(&scaled)
}

/// Converts an amount in an asset's smallest unit into its decimal
/// representation, without trailing zeros.
pub fn units_to_decimal(amount: &U256, decimals: u8) -> BigDecimal {
    if amount.is_zero() {
        return BigDecimal::zero();
    }
    BigDecimal::new(u256_to_biguint(amount).into(), i64::from(decimals)).normalized()
}

/// Converts a `BigDecimal` amount in Ether units to wei.
pub fn decimal_to_ether(d: &BigDecimal) -> Option<eth::Ether> {
    decimal_to_units(d, eth::NATIVE_DECIMALS).map(eth::Ether)
}

/// Converts an `eth::Ether` amount into a `BigDecimal` representation.
pub fn ether_to_decimal(e: &eth::Ether) -> BigDecimal {
    units_to_decimal(&e.0, eth::NATIVE_DECIMALS)
}
