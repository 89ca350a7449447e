//! Price resolution for the native asset, derived token prices, and
//! tracked volume/liquidity.
//!
//! - [`native_price`] - native/USD price from stablecoin pairs
//! - [`derived_price`] - native-per-token price via whitelist adjacency
//! - [`tracked`] - whitelist filtering of swap volume and liquidity

mod derived_price;
mod native_price;
mod tracked;

use bigdecimal::BigDecimal;
use log::{debug, warn};
use std::sync::Arc;

use crate::{
    config::Deployment,
    db::{
        models::{Bundle, Token, BUNDLE_ID},
        EntityStore,
    },
    utils::{ONE_BD, ZERO_BD},
};

/// Price resolution for one deployment.
///
/// Every computation is total: missing pairs, tokens, or liquidity resolve
/// to zero ("unpriced") rather than an error, so the event pipeline never
/// stalls early in a deployment's history.
///
/// Uses Uniswap's whitelist approach:
/// - Token prices are only derived through pairs with a whitelisted counterpart
/// - Only whitelisted sides of a swap or liquidity event count toward tracked USD
///
/// Holds no mutable state; the same entity state always yields the same result.
#[derive(Debug, Clone)]
pub struct PriceResolver {
    deployment: Arc<Deployment>,
}

impl PriceResolver {
    pub fn new(deployment: Arc<Deployment>) -> Self {
        Self { deployment }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Native units one `token` is worth as currently stored.
    ///
    /// The native token is always 1; any other underived token is zero.
    pub fn derived_native(&self, token: &Token) -> BigDecimal {
        if self.deployment.is_native(&token.id) {
            return ONE_BD.clone();
        }
        token.derived_native.clone().unwrap_or_else(|| ZERO_BD.clone())
    }

    /// USD price of one unit of `token`: derived native price times the bundle price.
    fn token_price_usd(&self, token: &Token, bundle: &Bundle) -> BigDecimal {
        self.derived_native(token) * &bundle.native_price_usd
    }

    /// Recompute the native USD price and write it to the bundle.
    ///
    /// The bundle is created here on first use; this is its only writer.
    pub fn refresh_native_price<S: EntityStore + ?Sized>(&self, store: &mut S) -> Bundle {
        let price = self.native_price_usd(store);

        let mut bundle = store.load_bundle(BUNDLE_ID).unwrap_or_default();
        let previous = bundle.native_price_usd.clone();
        if bundle.set_price(price) {
            debug!(
                "[{}] Native price {} -> {} USD",
                self.deployment.name, previous, bundle.native_price_usd
            );
        }
        store.save_bundle(bundle.clone());
        bundle
    }

    /// Recompute and save the derived native price of `token_id`.
    ///
    /// Returns `None` if the token does not exist.
    pub fn refresh_derived_price<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        token_id: &str,
    ) -> Option<BigDecimal> {
        let Some(mut token) = store.load_token(token_id) else {
            warn!(
                "[{}] Cannot refresh price of unknown token {}",
                self.deployment.name, token_id
            );
            return None;
        };

        let derived = self.native_per_token(store, &token);
        token.derived_native = Some(derived.clone());
        store.save_token(token);
        Some(derived)
    }
}
