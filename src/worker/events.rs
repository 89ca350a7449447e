use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::db::Snapshot;

/// A decoded pair event, in canonical chain order.
///
/// Amounts and reserves are raw on-chain integers (decimal or `0x` hex
/// strings) and are scaled by the token's decimals when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PairEvent {
    PairCreated {
        pair: String,
        token0: String,
        token1: String,
    },
    Sync {
        pair: String,
        reserve0: String,
        reserve1: String,
    },
    Swap {
        pair: String,
        amount0_in: String,
        amount1_in: String,
        amount0_out: String,
        amount1_out: String,
    },
    Mint {
        pair: String,
        amount0: String,
        amount1: String,
    },
    Burn {
        pair: String,
        amount0: String,
        amount1: String,
    },
}

impl PairEvent {
    pub fn pair(&self) -> &str {
        match self {
            PairEvent::PairCreated { pair, .. }
            | PairEvent::Sync { pair, .. }
            | PairEvent::Swap { pair, .. }
            | PairEvent::Mint { pair, .. }
            | PairEvent::Burn { pair, .. } => pair,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            PairEvent::PairCreated { .. } => "pair_created",
            PairEvent::Sync { .. } => "sync",
            PairEvent::Swap { .. } => "swap",
            PairEvent::Mint { .. } => "mint",
            PairEvent::Burn { .. } => "burn",
        }
    }
}

/// What processing an event computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventOutcome {
    PairCreated {
        pair: String,
    },
    Sync {
        pair: String,
        native_price_usd: BigDecimal,
        reserve_native: BigDecimal,
        reserve_usd: BigDecimal,
        tracked_reserve_native: BigDecimal,
    },
    Swap {
        pair: String,
        tracked_volume_usd: BigDecimal,
        untracked_volume_usd: BigDecimal,
    },
    Liquidity {
        pair: String,
        tracked_liquidity_usd: BigDecimal,
    },
}

/// Replay input: starting entities plus the events to apply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayInput {
    #[serde(default)]
    pub snapshot: Snapshot,
    #[serde(default)]
    pub events: Vec<PairEvent>,
}
