use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::{config::TokenSlot, utils::safe_div};

/// Liquidity pair state.
///
/// Primary Key: id (lowercase pair address)
///
/// Price convention (Uniswap V2 style):
/// - token0_price = token0 per token1 = reserve0 / reserve1
/// - token1_price = token1 per token0 = reserve1 / reserve0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub id: String,
    pub token0: String,
    pub token1: String,

    // Reserves in whole token units
    #[serde(default)]
    pub reserve0: BigDecimal,
    #[serde(default)]
    pub reserve1: BigDecimal,

    // Reserve totals derived from token prices
    #[serde(default)]
    pub reserve_native: BigDecimal,
    #[serde(default)]
    pub reserve_usd: BigDecimal,
    #[serde(default)]
    pub tracked_reserve_native: BigDecimal,

    // Spot prices
    #[serde(default)]
    pub token0_price: BigDecimal,
    #[serde(default)]
    pub token1_price: BigDecimal,

    #[serde(default)]
    pub liquidity_provider_count: u64,

    // Lifetime stats
    #[serde(default)]
    pub volume_usd: BigDecimal,
    #[serde(default)]
    pub untracked_volume_usd: BigDecimal,
    #[serde(default)]
    pub tx_count: u64,
}

impl Pair {
    pub fn new(id: String, token0: String, token1: String) -> Self {
        Self {
            id: id.to_lowercase(),
            token0: token0.to_lowercase(),
            token1: token1.to_lowercase(),
            reserve0: BigDecimal::default(),
            reserve1: BigDecimal::default(),
            reserve_native: BigDecimal::default(),
            reserve_usd: BigDecimal::default(),
            tracked_reserve_native: BigDecimal::default(),
            token0_price: BigDecimal::default(),
            token1_price: BigDecimal::default(),
            liquidity_provider_count: 0,
            volume_usd: BigDecimal::default(),
            untracked_volume_usd: BigDecimal::default(),
            tx_count: 0,
        }
    }

    /// Replace reserves and recompute both spot prices.
    pub fn set_reserves(&mut self, reserve0: BigDecimal, reserve1: BigDecimal) {
        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
        self.update_spot_prices();
    }

    /// Recompute spot prices from reserves; an empty side yields zero.
    pub fn update_spot_prices(&mut self) {
        self.token0_price = safe_div(&self.reserve0, &self.reserve1);
        self.token1_price = safe_div(&self.reserve1, &self.reserve0);
    }

    /// Which slot `token` occupies in this pair, if any.
    pub fn slot_of(&self, token: &str) -> Option<TokenSlot> {
        if self.token0 == token {
            Some(TokenSlot::Token0)
        } else if self.token1 == token {
            Some(TokenSlot::Token1)
        } else {
            None
        }
    }

    pub fn token(&self, slot: TokenSlot) -> &str {
        match slot {
            TokenSlot::Token0 => &self.token0,
            TokenSlot::Token1 => &self.token1,
        }
    }

    pub fn reserve(&self, slot: TokenSlot) -> &BigDecimal {
        match slot {
            TokenSlot::Token0 => &self.reserve0,
            TokenSlot::Token1 => &self.reserve1,
        }
    }

    /// Spot price named after `slot`: units of that token per unit of the other.
    pub fn price(&self, slot: TokenSlot) -> &BigDecimal {
        match slot {
            TokenSlot::Token0 => &self.token0_price,
            TokenSlot::Token1 => &self.token1_price,
        }
    }
}
