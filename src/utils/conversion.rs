//! Type conversion and decimal arithmetic utilities.
//!
//! Raw on-chain amounts arrive as U256 integers; everything the pricing
//! code touches is a `BigDecimal` in whole token units.

use alloy::primitives::{hex, U256};
use anyhow::Context;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use once_cell::sync::Lazy;
use std::str::FromStr;

// ============================================
// Decimal Constants
// ============================================

pub static ZERO_BD: Lazy<BigDecimal> = Lazy::new(BigDecimal::zero);
pub static ONE_BD: Lazy<BigDecimal> = Lazy::new(|| BigDecimal::from(1));
pub static TWO_BD: Lazy<BigDecimal> = Lazy::new(|| BigDecimal::from(2));

// ============================================
// Hex Encoding
// ============================================

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// ============================================
// Decimal Arithmetic
// ============================================

/// Divide `numerator` by `denominator`, returning zero when the denominator is zero.
///
/// Pools without liquidity are an expected state, so every division in the
/// pricing path goes through here instead of panicking.
pub fn safe_div(numerator: &BigDecimal, denominator: &BigDecimal) -> BigDecimal {
    if denominator.is_zero() {
        ZERO_BD.clone()
    } else {
        numerator / denominator
    }
}

// ============================================
// U256 Conversions
// ============================================

/// Convert a raw U256 token amount to whole token units.
///
/// Exact: the integer becomes the unscaled value and `decimals` the scale,
/// so no precision is lost for any 256-bit amount.
///
/// # Example
/// ```ignore
/// let value = U256::from(1_500_000u64);
/// let usdc = convert_token_to_decimal(value, 6); // 1.5
/// ```
pub fn convert_token_to_decimal(value: U256, decimals: u8) -> BigDecimal {
    let bytes: [u8; 32] = value.to_le_bytes();
    let big_int = BigInt::from_bytes_le(Sign::Plus, &bytes);
    BigDecimal::new(big_int, decimals as i64)
}

/// Parse a raw amount string (decimal, or `0x` hex) and convert it to token units.
pub fn parse_token_amount(raw: &str, decimals: u8) -> anyhow::Result<BigDecimal> {
    let value = U256::from_str(raw.trim())
        .with_context(|| format!("Invalid raw token amount '{}'", raw))?;
    Ok(convert_token_to_decimal(value, decimals))
}
