use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Token metadata and derived price state.
///
/// Primary Key: id (lowercase token address)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    pub decimals: u8,

    /// Price in native-asset units, unset until first derived.
    /// Multiply by the bundle's native USD price for a USD value.
    #[serde(default)]
    pub derived_native: Option<BigDecimal>,
}

impl Token {
    pub fn new(id: String, symbol: String, decimals: u8) -> Self {
        Self {
            // Always lowercase addresses for consistent comparisons
            id: id.to_lowercase(),
            symbol,
            decimals,
            derived_native: None,
        }
    }
}
