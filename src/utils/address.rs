use alloy::primitives::Address;
use anyhow::Context;
use std::str::FromStr;

use super::conversion::hex_encode;

/// Parse an EVM address and return it as lowercase `0x` hex.
///
/// Entity ids and configuration addresses are compared as strings, so every
/// address entering the system goes through here once.
pub fn normalize_address(address: &str) -> anyhow::Result<String> {
    let parsed = Address::from_str(address.trim())
        .with_context(|| format!("Invalid address '{}'", address))?;
    Ok(hex_encode(parsed.as_slice()))
}
