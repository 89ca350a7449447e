use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Id of the singleton bundle.
pub const BUNDLE_ID: &str = "1";

/// Current USD price of the chain's native asset.
///
/// Exactly one bundle exists per store, keyed [`BUNDLE_ID`]. It is created
/// the first time the native price is refreshed and only the price
/// resolver writes to it. A zero price means "unpriced".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub native_price_usd: BigDecimal,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Bundle {
    pub fn new() -> Self {
        Self {
            id: BUNDLE_ID.to_string(),
            native_price_usd: BigDecimal::zero(),
            updated_at: None,
        }
    }

    pub fn with_price(native_price_usd: BigDecimal) -> Self {
        Self {
            native_price_usd,
            ..Self::new()
        }
    }

    /// Store a new price. `updated_at` only moves when the price changes.
    ///
    /// Returns whether the price changed.
    pub fn set_price(&mut self, native_price_usd: BigDecimal) -> bool {
        if self.native_price_usd == native_price_usd {
            return false;
        }
        self.native_price_usd = native_price_usd;
        self.updated_at = Some(Utc::now());
        true
    }

    pub fn is_priced(&self) -> bool {
        !self.native_price_usd.is_zero()
    }
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new()
    }
}
