//! Utility functions for the pricing core.
//!
//! - [`conversion`] - Decimal constants, zero-safe division, raw amount conversion
//! - [`address`] - EVM address parsing and normalisation

mod address;
mod conversion;

// ============================================
// Re-exports
// ============================================

pub use address::normalize_address;

pub use conversion::{
    convert_token_to_decimal, hex_encode, parse_token_amount, safe_div, ONE_BD, TWO_BD, ZERO_BD,
};
