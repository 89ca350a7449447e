use anyhow::Context;
use bigdecimal::BigDecimal;
use rustc_hash::FxHashSet;

use super::config::{parse_threshold, DeploymentSettings, TokenSlot};
use crate::utils::normalize_address;

/// Maximum number of stablecoin pairs the native price oracle weighs.
pub const MAX_STABLECOIN_PAIRS: usize = 3;

/// A validated stablecoin/native pair reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StablecoinPair {
    pub address: String,
    pub stable_slot: TokenSlot,
}

/// Ordered set of trusted tokens.
///
/// Order is search priority for price propagation; membership checks use
/// the hash set.
#[derive(Debug, Clone)]
pub struct Whitelist {
    ordered: Vec<String>,
    members: FxHashSet<String>,
}

impl Whitelist {
    pub fn new(tokens: Vec<String>) -> anyhow::Result<Self> {
        let mut members = FxHashSet::default();
        for token in &tokens {
            if !members.insert(token.clone()) {
                anyhow::bail!("Whitelist contains {} more than once", token);
            }
        }
        Ok(Self {
            ordered: tokens,
            members,
        })
    }

    pub fn contains(&self, token: &str) -> bool {
        self.members.contains(token)
    }

    /// Iterate in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Immutable, validated pricing configuration for one chain deployment.
///
/// All addresses are lowercase `0x` hex so they compare directly against
/// entity ids.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub name: String,
    pub native_token: String,
    /// Stablecoin pairs in trust order. `None` keeps the position of a pair
    /// that does not exist on this chain yet.
    pub stablecoin_pairs: Vec<Option<StablecoinPair>>,
    pub whitelist: Whitelist,
    pub min_liquidity_native: BigDecimal,
    pub min_usd_new_pairs: BigDecimal,
    pub min_liquidity_providers: u64,
}

impl Deployment {
    /// Stablecoin pairs actually configured, in trust order.
    pub fn configured_stablecoin_pairs(&self) -> impl Iterator<Item = &StablecoinPair> {
        self.stablecoin_pairs.iter().flatten()
    }

    pub fn is_native(&self, token: &str) -> bool {
        self.native_token == token
    }

    pub fn is_whitelisted(&self, token: &str) -> bool {
        self.whitelist.contains(token)
    }
}

impl TryFrom<DeploymentSettings> for Deployment {
    type Error = anyhow::Error;

    fn try_from(raw: DeploymentSettings) -> anyhow::Result<Self> {
        let name = raw.name;
        let ctx = || format!("Invalid configuration for deployment '{}'", name);

        let native_token = normalize_address(&raw.native_token).with_context(ctx)?;

        // Empty addresses mark pairs that do not exist on this chain yet
        let stablecoin_pairs = raw
            .stablecoin_pairs
            .into_iter()
            .map(|p| -> anyhow::Result<Option<StablecoinPair>> {
                if p.address.trim().is_empty() {
                    return Ok(None);
                }
                Ok(Some(StablecoinPair {
                    address: normalize_address(&p.address)?,
                    stable_slot: p.stable_slot,
                }))
            })
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(ctx)?;

        let configured = stablecoin_pairs.iter().flatten().count();
        if configured > MAX_STABLECOIN_PAIRS {
            anyhow::bail!(
                "Deployment '{}' lists {} stablecoin pairs, at most {} are supported",
                name,
                configured,
                MAX_STABLECOIN_PAIRS
            );
        }

        let tokens = raw
            .whitelist
            .iter()
            .map(|t| normalize_address(t))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(ctx)?;
        let whitelist = Whitelist::new(tokens).with_context(ctx)?;
        if whitelist.is_empty() {
            anyhow::bail!("Deployment '{}' has an empty whitelist", name);
        }

        let min_liquidity_native =
            parse_threshold("min_liquidity_native", &raw.min_liquidity_native).with_context(ctx)?;
        let min_usd_new_pairs =
            parse_threshold("min_usd_new_pairs", &raw.min_usd_new_pairs).with_context(ctx)?;

        Ok(Self {
            name,
            native_token,
            stablecoin_pairs,
            whitelist,
            min_liquidity_native,
            min_usd_new_pairs,
            min_liquidity_providers: raw.min_liquidity_providers,
        })
    }
}
