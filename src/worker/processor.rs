use anyhow::Context;
use log::{debug, error, info};

use super::events::{EventOutcome, PairEvent};
use crate::{
    db::{
        models::{Bundle, Pair, PairIndexEntry, Token, BUNDLE_ID},
        EntityStore,
    },
    pricing::PriceResolver,
    utils::{normalize_address, parse_token_amount, safe_div, TWO_BD},
};

/// Counts from a replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub processed: usize,
    pub failed: usize,
}

/// Applies pair events to an entity store, one at a time, in order.
///
/// Each event runs its full handler chain before returning:
/// reserve update -> native price refresh -> token price refresh ->
/// tracked volume/liquidity. The processor owns the store mutably, so two
/// events can never interleave.
pub struct EventProcessor<S: EntityStore> {
    resolver: PriceResolver,
    store: S,
}

impl<S: EntityStore> EventProcessor<S> {
    pub fn new(resolver: PriceResolver, store: S) -> Self {
        Self { resolver, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Apply every event, logging and skipping the ones that fail.
    pub fn replay<'a, I>(&mut self, events: I) -> ReplaySummary
    where
        I: IntoIterator<Item = &'a PairEvent>,
    {
        let mut summary = ReplaySummary::default();
        for event in events {
            match self.process(event) {
                Ok(outcome) => {
                    debug!("{:?}", outcome);
                    summary.processed += 1;
                },
                Err(e) => {
                    error!("Failed to apply {} event: {:#}", event.event_type(), e);
                    summary.failed += 1;
                },
            }
        }
        info!(
            "[{}] Replay finished: {} processed, {} failed",
            self.resolver.deployment().name,
            summary.processed,
            summary.failed
        );
        summary
    }

    /// Apply a single event.
    pub fn process(&mut self, event: &PairEvent) -> anyhow::Result<EventOutcome> {
        let pair_id = normalize_address(event.pair()).context("Invalid pair address")?;

        match event {
            PairEvent::PairCreated { token0, token1, .. } => {
                self.handle_pair_created(pair_id, token0, token1)
            },
            PairEvent::Sync {
                reserve0, reserve1, ..
            } => self.handle_sync(&pair_id, reserve0, reserve1),
            PairEvent::Swap {
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                ..
            } => self.handle_swap(&pair_id, [amount0_in, amount1_in, amount0_out, amount1_out]),
            PairEvent::Mint {
                amount0, amount1, ..
            }
            | PairEvent::Burn {
                amount0, amount1, ..
            } => self.handle_liquidity(&pair_id, amount0, amount1),
        }
    }

    fn handle_pair_created(
        &mut self,
        pair_id: String,
        token0: &str,
        token1: &str,
    ) -> anyhow::Result<EventOutcome> {
        if self.store.load_pair(&pair_id).is_some() {
            anyhow::bail!("Pair {} already exists", pair_id);
        }

        let token0 = normalize_address(token0).context("Invalid token0 address")?;
        let token1 = normalize_address(token1).context("Invalid token1 address")?;
        for token in [&token0, &token1] {
            if self.store.load_token(token).is_none() {
                anyhow::bail!("Pair {} references unknown token {}", pair_id, token);
            }
        }

        let pair = Pair::new(pair_id.clone(), token0, token1);
        let (forward, reverse) = PairIndexEntry::from_pair(&pair);
        self.store.save_pair_index_entry(forward);
        self.store.save_pair_index_entry(reverse);
        self.store.save_pair(pair);

        Ok(EventOutcome::PairCreated { pair: pair_id })
    }

    fn handle_sync(
        &mut self,
        pair_id: &str,
        reserve0: &str,
        reserve1: &str,
    ) -> anyhow::Result<EventOutcome> {
        let (mut pair, mut token0, mut token1) = self.load_pair_tokens(pair_id)?;

        let reserve0 = parse_token_amount(reserve0, token0.decimals).context("Sync reserve0")?;
        let reserve1 = parse_token_amount(reserve1, token1.decimals).context("Sync reserve1")?;
        pair.set_reserves(reserve0, reserve1);
        self.store.save_pair(pair.clone());

        let bundle = self.resolver.refresh_native_price(&mut self.store);
        let derived0 = self
            .resolver
            .refresh_derived_price(&mut self.store, &token0.id)
            .unwrap_or_default();
        let derived1 = self
            .resolver
            .refresh_derived_price(&mut self.store, &token1.id)
            .unwrap_or_default();
        token0.derived_native = Some(derived0.clone());
        token1.derived_native = Some(derived1.clone());

        pair.reserve_native = &pair.reserve0 * &derived0 + &pair.reserve1 * &derived1;
        pair.reserve_usd = &pair.reserve_native * &bundle.native_price_usd;

        let tracked_liquidity_usd = self.resolver.tracked_liquidity_usd(
            &bundle,
            &pair.reserve0,
            &token0,
            &pair.reserve1,
            &token1,
        );
        pair.tracked_reserve_native = safe_div(&tracked_liquidity_usd, &bundle.native_price_usd);

        let outcome = EventOutcome::Sync {
            pair: pair.id.clone(),
            native_price_usd: bundle.native_price_usd.clone(),
            reserve_native: pair.reserve_native.clone(),
            reserve_usd: pair.reserve_usd.clone(),
            tracked_reserve_native: pair.tracked_reserve_native.clone(),
        };
        self.store.save_pair(pair);

        Ok(outcome)
    }

    fn handle_swap(&mut self, pair_id: &str, amounts: [&String; 4]) -> anyhow::Result<EventOutcome> {
        let (mut pair, token0, token1) = self.load_pair_tokens(pair_id)?;
        let [amount0_in, amount1_in, amount0_out, amount1_out] = amounts;

        let amount0 = parse_token_amount(amount0_in, token0.decimals).context("Swap amount0In")?
            + parse_token_amount(amount0_out, token0.decimals).context("Swap amount0Out")?;
        let amount1 = parse_token_amount(amount1_in, token1.decimals).context("Swap amount1In")?
            + parse_token_amount(amount1_out, token1.decimals).context("Swap amount1Out")?;

        let bundle = self.bundle();
        let tracked_volume_usd = self.resolver.tracked_volume_usd(
            &bundle, &amount0, &token0, &amount1, &token1, &pair,
        );

        // Both sides at derived prices, no whitelist filtering
        let derived0 = self.resolver.derived_native(&token0);
        let derived1 = self.resolver.derived_native(&token1);
        let derived_amount_native =
            safe_div(&(&amount0 * &derived0 + &amount1 * &derived1), &TWO_BD);
        let untracked_volume_usd = &derived_amount_native * &bundle.native_price_usd;

        pair.volume_usd += &tracked_volume_usd;
        pair.untracked_volume_usd += &untracked_volume_usd;
        pair.tx_count += 1;
        let pair_id = pair.id.clone();
        self.store.save_pair(pair);

        Ok(EventOutcome::Swap {
            pair: pair_id,
            tracked_volume_usd,
            untracked_volume_usd,
        })
    }

    fn handle_liquidity(
        &mut self,
        pair_id: &str,
        amount0: &str,
        amount1: &str,
    ) -> anyhow::Result<EventOutcome> {
        let (mut pair, token0, token1) = self.load_pair_tokens(pair_id)?;

        let amount0 = parse_token_amount(amount0, token0.decimals).context("Liquidity amount0")?;
        let amount1 = parse_token_amount(amount1, token1.decimals).context("Liquidity amount1")?;

        let bundle = self.bundle();
        let tracked_liquidity_usd =
            self.resolver
                .tracked_liquidity_usd(&bundle, &amount0, &token0, &amount1, &token1);

        pair.tx_count += 1;
        let pair_id = pair.id.clone();
        self.store.save_pair(pair);

        Ok(EventOutcome::Liquidity {
            pair: pair_id,
            tracked_liquidity_usd,
        })
    }

    /// Current bundle, or an unpriced one if no price was computed yet.
    fn bundle(&self) -> Bundle {
        self.store.load_bundle(BUNDLE_ID).unwrap_or_default()
    }

    fn load_pair_tokens(&self, pair_id: &str) -> anyhow::Result<(Pair, Token, Token)> {
        let pair = self
            .store
            .load_pair(pair_id)
            .with_context(|| format!("Unknown pair {}", pair_id))?;
        let token0 = self
            .store
            .load_token(&pair.token0)
            .with_context(|| format!("Pair {} references missing token0 {}", pair_id, pair.token0))?;
        let token1 = self
            .store
            .load_token(&pair.token1)
            .with_context(|| format!("Pair {} references missing token1 {}", pair_id, pair.token1))?;
        Ok((pair, token0, token1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{EntityStore, MemoryStore},
        pricing::fixtures::*,
    };
    use bigdecimal::BigDecimal;
    use num_traits::Zero;

    const E18: &str = "000000000000000000";

    fn raw(whole: &str) -> String {
        format!("{}{}", whole, E18)
    }

    fn processor() -> EventProcessor<MemoryStore> {
        let mut store = MemoryStore::new();
        store.save_token(token(NATIVE, None));
        let mut usdc = token(USDC, None);
        usdc.decimals = 6;
        store.save_token(usdc);
        store.save_token(token(&addr(0xaa), None));
        EventProcessor::new(resolver(), store)
    }

    fn created(pair: &str, token0: &str, token1: &str) -> PairEvent {
        PairEvent::PairCreated {
            pair: pair.to_string(),
            token0: token0.to_string(),
            token1: token1.to_string(),
        }
    }

    fn sync(pair: &str, reserve0: String, reserve1: String) -> PairEvent {
        PairEvent::Sync {
            pair: pair.to_string(),
            reserve0,
            reserve1,
        }
    }

    /// Native/USDC stablecoin pair at 1500 USD, plus X/native pair where 1 X = 0.01 native.
    fn priced_processor() -> EventProcessor<MemoryStore> {
        let mut p = processor();
        let x = addr(0xaa);
        let events = vec![
            created(STABLE_PAIR_A, NATIVE, USDC),
            created(&addr(0xb0), &x, NATIVE),
            // 100 native / 150,000 USDC
            sync(STABLE_PAIR_A, raw("100"), "150000000000".to_string()),
            sync(STABLE_PAIR_A, raw("100"), "150000000000".to_string()),
            // 1,000 X / 10 native; second sync picks up the native reserve from the first
            sync(&addr(0xb0), raw("1000"), raw("10")),
            sync(&addr(0xb0), raw("1000"), raw("10")),
        ];
        let summary = p.replay(&events);
        assert_eq!(summary, ReplaySummary { processed: 6, failed: 0 });
        p
    }

    #[test]
    fn test_pair_created_indexes_both_directions() {
        let mut p = processor();
        p.process(&created(STABLE_PAIR_A, NATIVE, USDC)).unwrap();

        let store = p.store();
        assert_eq!(
            store.load_pair_index_entry(NATIVE, USDC).as_deref(),
            Some(STABLE_PAIR_A)
        );
        assert_eq!(
            store.load_pair_index_entry(USDC, NATIVE).as_deref(),
            Some(STABLE_PAIR_A)
        );
    }

    #[test]
    fn test_pair_created_rejects_unknown_token_and_duplicates() {
        let mut p = processor();
        assert!(p.process(&created(&addr(1), NATIVE, &addr(0xcc))).is_err());

        p.process(&created(&addr(1), NATIVE, USDC)).unwrap();
        assert!(p.process(&created(&addr(1), NATIVE, USDC)).is_err());
    }

    #[test]
    fn test_sync_refreshes_native_price_and_reserves() {
        let p = priced_processor();
        let store = p.store();

        assert_eq!(store.load_bundle(BUNDLE_ID).unwrap().native_price_usd, bd("1500"));

        let stable = store.load_pair(STABLE_PAIR_A).unwrap();
        assert_eq!(stable.reserve0, bd("100"));
        assert_eq!(stable.reserve1, bd("150000"));
        assert_eq!(stable.token1_price, bd("1500"));

        let usdc = store.load_token(USDC).unwrap();
        assert!(usdc.derived_native.unwrap() > BigDecimal::zero());
    }

    #[test]
    fn test_sync_derives_token_price_through_whitelist() {
        let p = priced_processor();
        let store = p.store();

        let x = store.load_token(&addr(0xaa)).unwrap();
        assert_eq!(x.derived_native, Some(bd("0.01")));

        let pair = store.load_pair(&addr(0xb0)).unwrap();
        // 1000 * 0.01 + 10 * 1
        assert_eq!(pair.reserve_native, bd("20"));
        assert_eq!(pair.reserve_usd, bd("30000"));
        // only native is whitelisted: 2 * 10 native
        assert_eq!(pair.tracked_reserve_native, bd("20"));
    }

    #[test]
    fn test_first_sync_leaves_new_token_unpriced() {
        let mut p = processor();
        let x = addr(0xaa);
        p.process(&created(&addr(0xb0), &x, NATIVE)).unwrap();
        p.process(&sync(&addr(0xb0), raw("1000"), raw("10"))).unwrap();

        // reserve_native was still zero when the price was derived
        let token = p.store().load_token(&x).unwrap();
        assert!(token.derived_native.unwrap().is_zero());
    }

    #[test]
    fn test_swap_tracks_whitelisted_side() {
        let mut p = priced_processor();
        let swap = PairEvent::Swap {
            pair: addr(0xb0),
            amount0_in: raw("100"),
            amount1_in: "0".to_string(),
            amount0_out: "0".to_string(),
            amount1_out: raw("1"),
        };

        let outcome = p.process(&swap).unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Swap {
                pair: addr(0xb0),
                // 1 native * 1500
                tracked_volume_usd: bd("1500"),
                // (100 * 0.01 + 1 * 1) / 2 * 1500
                untracked_volume_usd: bd("1500"),
            }
        );

        let pair = p.store().load_pair(&addr(0xb0)).unwrap();
        assert_eq!(pair.volume_usd, bd("1500"));
        assert_eq!(pair.tx_count, 1);
    }

    #[test]
    fn test_mint_tracks_doubled_liquidity() {
        let mut p = priced_processor();
        let mint = PairEvent::Mint {
            pair: addr(0xb0),
            amount0: raw("50"),
            amount1: "500000000000000000".to_string(),
        };

        match p.process(&mint).unwrap() {
            EventOutcome::Liquidity {
                tracked_liquidity_usd,
                ..
            } => assert_eq!(tracked_liquidity_usd, bd("1500")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_burn_tracks_liquidity_and_counts_transaction() {
        let mut p = priced_processor();
        let burn = PairEvent::Burn {
            pair: addr(0xb0),
            amount0: raw("100"),
            amount1: raw("1"),
        };

        // only the native side is whitelisted: 2 * 1 native * 1500
        assert_eq!(
            p.process(&burn).unwrap(),
            EventOutcome::Liquidity {
                pair: addr(0xb0),
                tracked_liquidity_usd: bd("3000"),
            }
        );

        let pair = p.store().load_pair(&addr(0xb0)).unwrap();
        assert_eq!(pair.tx_count, 1);
        // liquidity events leave volume alone
        assert!(pair.volume_usd.is_zero());
    }

    #[test]
    fn test_swap_before_any_price_is_zero() {
        let mut p = processor();
        p.process(&created(&addr(0xb0), &addr(0xaa), NATIVE)).unwrap();
        let swap = PairEvent::Swap {
            pair: addr(0xb0),
            amount0_in: raw("1"),
            amount1_in: "0".to_string(),
            amount0_out: "0".to_string(),
            amount1_out: raw("1"),
        };

        match p.process(&swap).unwrap() {
            EventOutcome::Swap {
                tracked_volume_usd,
                untracked_volume_usd,
                ..
            } => {
                assert!(tracked_volume_usd.is_zero());
                assert!(untracked_volume_usd.is_zero());
            },
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_replay_skips_failed_events() {
        let mut p = processor();
        let events = vec![
            sync(&addr(0xdead), raw("1"), raw("1")),
            created(&addr(0xb0), &addr(0xaa), NATIVE),
            sync(&addr(0xb0), "bogus".to_string(), raw("1")),
            sync(&addr(0xb0), raw("1"), raw("1")),
        ];
        let summary = p.replay(&events);
        assert_eq!(summary, ReplaySummary { processed: 2, failed: 2 });
    }
}
