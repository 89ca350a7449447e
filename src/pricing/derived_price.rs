use bigdecimal::BigDecimal;
use log::{debug, warn};

use super::PriceResolver;
use crate::{
    db::{models::Token, EntityStore},
    utils::{ONE_BD, ZERO_BD},
};

impl PriceResolver {
    /// Amount of native asset one unit of `token` is worth.
    ///
    /// Walks the whitelist in priority order and returns on the first
    /// candidate that has an indexed pair with more than the minimum native
    /// liquidity. This is deliberately first-match, not best-price: earlier
    /// whitelist entries are the preferred price sources.
    ///
    /// Broken references (index entry pointing at a missing pair, pair not
    /// containing the token, missing counterpart token) are logged and the
    /// candidate is skipped. A counterpart whose price was never derived is
    /// skipped as well.
    ///
    /// Returns zero when no candidate qualifies.
    pub fn native_per_token<S: EntityStore + ?Sized>(&self, store: &S, token: &Token) -> BigDecimal {
        let deployment = &self.deployment;
        if deployment.is_native(&token.id) {
            return ONE_BD.clone();
        }

        for candidate in deployment.whitelist.iter() {
            let Some(pair_address) = store.load_pair_index_entry(&token.id, candidate) else {
                continue;
            };

            let Some(pair) = store.load_pair(&pair_address) else {
                warn!(
                    "[{}] Pair index {}-{} points at missing pair {}",
                    deployment.name, token.id, candidate, pair_address
                );
                continue;
            };

            // Strictly greater than the threshold
            if pair.reserve_native <= deployment.min_liquidity_native {
                debug!(
                    "[{}] Pair {} below liquidity threshold ({} native)",
                    deployment.name, pair.id, pair.reserve_native
                );
                continue;
            }

            let Some(slot) = pair.slot_of(&token.id) else {
                warn!(
                    "[{}] Pair {} indexed for {} does not contain it",
                    deployment.name, pair.id, token.id
                );
                continue;
            };

            let counterpart_slot = slot.other();
            let counterpart_id = pair.token(counterpart_slot);

            let counterpart_derived = if deployment.is_native(counterpart_id) {
                ONE_BD.clone()
            } else {
                let Some(counterpart) = store.load_token(counterpart_id) else {
                    warn!(
                        "[{}] Pair {} references missing token {}",
                        deployment.name, pair.id, counterpart_id
                    );
                    continue;
                };
                let Some(derived) = counterpart.derived_native else {
                    debug!(
                        "[{}] Counterpart {} of {} has no derived price yet",
                        deployment.name, counterpart_id, token.id
                    );
                    continue;
                };
                derived
            };

            // counterpart per token * native per counterpart
            return pair.price(counterpart_slot) * &counterpart_derived;
        }

        ZERO_BD.clone()
    }
}
