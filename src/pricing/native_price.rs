use bigdecimal::BigDecimal;
use log::debug;

use super::PriceResolver;
use crate::{
    config::{TokenSlot, MAX_STABLECOIN_PAIRS},
    db::{models::Pair, EntityStore},
    utils::{safe_div, ZERO_BD},
};

impl PriceResolver {
    /// USD price of one unit of the native asset.
    ///
    /// Stablecoin pairs are consulted in trust order and only the leading
    /// run of pairs that exist is used: if the first pair has not been
    /// created yet the result is zero even when later ones exist. A position
    /// left empty in configuration ends the run the same way.
    ///
    /// - No pairs: zero (unpriced)
    /// - One pair: its stablecoin-per-native spot price
    /// - Several: average of their prices weighted by native reserves
    ///
    /// ## Orientation:
    /// The configured `stable_slot` decides which reserve is native and which
    /// spot price applies. With the stablecoin in slot 1, native reserve is
    /// reserve0 and the price is token1_price (token1 per token0).
    pub fn native_price_usd<S: EntityStore + ?Sized>(&self, store: &S) -> BigDecimal {
        let mut available: Vec<(Pair, TokenSlot)> = Vec::with_capacity(MAX_STABLECOIN_PAIRS);
        for stable in &self.deployment.stablecoin_pairs {
            let Some(stable) = stable else {
                break;
            };
            match store.load_pair(&stable.address) {
                Some(pair) => available.push((pair, stable.stable_slot)),
                None => break,
            }
        }

        match available.as_slice() {
            [] => {
                debug!("[{}] No stablecoin pair available", self.deployment.name);
                ZERO_BD.clone()
            },
            [(pair, stable_slot)] => pair.price(*stable_slot).clone(),
            pairs => {
                // sum(reserve_native_i * price_i) / sum(reserve_native_i)
                let mut weighted = BigDecimal::default();
                let mut total_native = BigDecimal::default();
                for (pair, stable_slot) in pairs {
                    let native_reserve = pair.reserve(stable_slot.other());
                    weighted += native_reserve * pair.price(*stable_slot);
                    total_native += native_reserve;
                }
                safe_div(&weighted, &total_native)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{fixtures::*, PriceResolver};
    use crate::{
        config::Deployment,
        db::{models::Pair, EntityStore, MemoryStore},
    };
    use num_traits::Zero;
    use std::sync::Arc;

    /// Stablecoin pair with `native` units of native reserve and the given
    /// stablecoin-per-native price, oriented like the configured slot.
    fn stable_pair(id: &str, native: &str, price: &str) -> Pair {
        let stable = addr(0x5000);
        let mut pair = if id == STABLE_PAIR_C {
            let mut p = Pair::new(id.to_string(), stable, NATIVE.to_string());
            p.reserve1 = bd(native);
            p.token0_price = bd(price);
            p
        } else {
            let mut p = Pair::new(id.to_string(), NATIVE.to_string(), stable);
            p.reserve0 = bd(native);
            p.token1_price = bd(price);
            p
        };
        pair.liquidity_provider_count = 10;
        pair
    }

    #[test]
    fn test_no_pairs_is_zero() {
        let store = MemoryStore::new();
        assert!(resolver().native_price_usd(&store).is_zero());
    }

    #[test]
    fn test_single_pair_price_returned_directly() {
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "0", "1.25"));
        // Reserves are not consulted when only one pair exists
        assert_eq!(resolver().native_price_usd(&store), bd("1.25"));
    }

    #[test]
    fn test_two_pairs_reserve_weighted() {
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "100", "2"));
        store.register_pair(stable_pair(STABLE_PAIR_B, "300", "4"));
        // (100*2 + 300*4) / 400
        assert_eq!(resolver().native_price_usd(&store), bd("3.5"));
    }

    #[test]
    fn test_three_pairs_reserve_weighted() {
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "100", "1.00"));
        store.register_pair(stable_pair(STABLE_PAIR_B, "200", "1.01"));
        store.register_pair(stable_pair(STABLE_PAIR_C, "300", "0.99"));

        let expected = (bd("100") * bd("1.00") + bd("200") * bd("1.01") + bd("300") * bd("0.99"))
            / bd("600");
        assert_close(&resolver().native_price_usd(&store), &expected);
    }

    #[test]
    fn test_orientation_per_slot() {
        // Third pair has the stablecoin in slot 0: its weight is reserve1 and price token0_price
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "100", "1"));
        store.register_pair(stable_pair(STABLE_PAIR_B, "100", "1"));
        let mut c = stable_pair(STABLE_PAIR_C, "200", "4");
        // Noise on the other side must be ignored
        c.reserve0 = bd("999999");
        c.token1_price = bd("999999");
        store.register_pair(c);

        // (100*1 + 100*1 + 200*4) / 400
        assert_eq!(resolver().native_price_usd(&store), bd("2.5"));
    }

    #[test]
    fn test_missing_first_pair_is_zero() {
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_B, "100", "1"));
        store.register_pair(stable_pair(STABLE_PAIR_C, "100", "1"));
        assert!(resolver().native_price_usd(&store).is_zero());
    }

    #[test]
    fn test_gap_in_trust_order_stops_at_gap() {
        // First and third exist: only the first counts
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "100", "1.5"));
        store.register_pair(stable_pair(STABLE_PAIR_C, "900", "7"));
        assert_eq!(resolver().native_price_usd(&store), bd("1.5"));
    }

    #[test]
    fn test_empty_configured_slot_stops_at_gap() {
        let mut raw = settings();
        raw.stablecoin_pairs[1].address = String::new();
        let resolver = PriceResolver::new(Arc::new(Deployment::try_from(raw).unwrap()));

        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "100", "1.5"));
        store.register_pair(stable_pair(STABLE_PAIR_C, "900", "7"));
        assert_eq!(resolver.native_price_usd(&store), bd("1.5"));
    }

    #[test]
    fn test_zero_total_reserves_is_zero() {
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "0", "1"));
        store.register_pair(stable_pair(STABLE_PAIR_B, "0", "1"));
        assert!(resolver().native_price_usd(&store).is_zero());
    }

    #[test]
    fn test_idempotent() {
        let mut store = MemoryStore::new();
        store.register_pair(stable_pair(STABLE_PAIR_A, "100", "1.00"));
        store.register_pair(stable_pair(STABLE_PAIR_B, "200", "1.01"));
        let resolver = resolver();
        assert_eq!(resolver.native_price_usd(&store), resolver.native_price_usd(&store));
        assert!(store.load_bundle("1").is_none());
    }
}
