use bigdecimal::BigDecimal;
use log::debug;

use super::PriceResolver;
use crate::{
    db::models::{Bundle, Pair, Token},
    utils::{safe_div, TWO_BD, ZERO_BD},
};

impl PriceResolver {
    /// USD amount of a swap that counts toward tracked volume.
    ///
    /// Pairs with fewer liquidity providers than the configured minimum
    /// must first hold enough whitelisted USD reserves, otherwise the whole
    /// volume is dropped:
    /// - both whitelisted: reserve0_usd + reserve1_usd >= threshold
    /// - one whitelisted: 2 * that side's reserve_usd >= threshold
    ///
    /// Then:
    /// - both whitelisted: average of the two USD amounts
    /// - one whitelisted: that side's USD amount only
    /// - neither: zero
    pub fn tracked_volume_usd(
        &self,
        bundle: &Bundle,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
        pair: &Pair,
    ) -> BigDecimal {
        let deployment = &self.deployment;
        let price0 = self.token_price_usd(token0, bundle);
        let price1 = self.token_price_usd(token1, bundle);

        let token0_whitelisted = deployment.is_whitelisted(&token0.id);
        let token1_whitelisted = deployment.is_whitelisted(&token1.id);

        if pair.liquidity_provider_count < deployment.min_liquidity_providers {
            let reserve0_usd = &pair.reserve0 * &price0;
            let reserve1_usd = &pair.reserve1 * &price1;

            let tracked_reserves_usd = match (token0_whitelisted, token1_whitelisted) {
                (true, true) => Some(reserve0_usd + reserve1_usd),
                (true, false) => Some(&reserve0_usd * &*TWO_BD),
                (false, true) => Some(&reserve1_usd * &*TWO_BD),
                (false, false) => None,
            };

            if let Some(reserves_usd) = tracked_reserves_usd {
                if reserves_usd < deployment.min_usd_new_pairs {
                    debug!(
                        "[{}] Pair {} has {} LPs and {} USD reserves, volume not tracked",
                        deployment.name, pair.id, pair.liquidity_provider_count, reserves_usd
                    );
                    return ZERO_BD.clone();
                }
            }
        }

        match (token0_whitelisted, token1_whitelisted) {
            (true, true) => {
                let total = amount0 * &price0 + amount1 * &price1;
                safe_div(&total, &TWO_BD)
            },
            (true, false) => amount0 * &price0,
            (false, true) => amount1 * &price1,
            (false, false) => ZERO_BD.clone(),
        }
    }

    /// USD amount of a liquidity change that counts toward tracked liquidity.
    ///
    /// No liquidity-provider guard applies here.
    /// - both whitelisted: sum of the two USD amounts
    /// - one whitelisted: double that side (pool value is split evenly)
    /// - neither: zero
    pub fn tracked_liquidity_usd(
        &self,
        bundle: &Bundle,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
    ) -> BigDecimal {
        let price0 = self.token_price_usd(token0, bundle);
        let price1 = self.token_price_usd(token1, bundle);

        match (
            self.deployment.is_whitelisted(&token0.id),
            self.deployment.is_whitelisted(&token1.id),
        ) {
            (true, true) => amount0 * &price0 + amount1 * &price1,
            (true, false) => &(amount0 * &price0) * &*TWO_BD,
            (false, true) => &(amount1 * &price1) * &*TWO_BD,
            (false, false) => ZERO_BD.clone(),
        }
    }
}
