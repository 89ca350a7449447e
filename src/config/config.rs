use anyhow::Context;
use bigdecimal::BigDecimal;
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::str::FromStr;

use super::deployment::Deployment;

/// Which slot of a pair holds a given token.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenSlot {
    Token0,
    Token1,
}

impl TokenSlot {
    pub fn other(self) -> Self {
        match self {
            TokenSlot::Token0 => TokenSlot::Token1,
            TokenSlot::Token1 => TokenSlot::Token0,
        }
    }
}

/// A stablecoin/native pair used to derive the native USD price.
///
/// `stable_slot` is a static fact of the deployment: it tells the oracle
/// which reserve is the native asset without inspecting the pair.
#[derive(Debug, Deserialize, Clone)]
pub struct StablecoinPairSettings {
    pub address: String,
    pub stable_slot: TokenSlot,
}

/// Per-deployment pricing configuration.
///
/// Addresses are validated and normalised when converted into a
/// [`Deployment`]; thresholds are decimal strings so no float rounding
/// sneaks into the comparisons.
#[derive(Debug, Deserialize, Clone)]
pub struct DeploymentSettings {
    pub name: String,
    pub native_token: String,
    /// Stablecoin pairs in trust order (at most three)
    #[serde(default)]
    pub stablecoin_pairs: Vec<StablecoinPairSettings>,
    /// Tokens trusted for price and volume attribution, highest priority first
    pub whitelist: Vec<String>,
    /// Minimum pair reserve (in native units) before it can price a token
    #[serde(default = "default_min_liquidity_native")]
    pub min_liquidity_native: String,
    /// Minimum USD reserves required to track volume on pairs with few LPs
    #[serde(default = "default_min_usd_new_pairs")]
    pub min_usd_new_pairs: String,
    /// Pairs with fewer liquidity providers than this go through the new-pair check
    #[serde(default = "default_min_liquidity_providers")]
    pub min_liquidity_providers: u64,
}

fn default_min_liquidity_native() -> String {
    "2".to_string()
}

fn default_min_usd_new_pairs() -> String {
    "400000".to_string()
}

fn default_min_liquidity_providers() -> u64 {
    5
}

/// Logging configuration for the binary.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Replay run selection: which deployment to use and which event file to feed it.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySettings {
    pub deployment: String,
    pub input: String,
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    pub deployments: Vec<DeploymentSettings>,
    #[serde(default)]
    pub replay: Option<ReplaySettings>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_path("config")
    }

    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder().add_source(File::with_name(path)).build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    /// Validate and return the deployment called `name`.
    pub fn deployment(&self, name: &str) -> anyhow::Result<Deployment> {
        let raw = self
            .deployments
            .iter()
            .find(|d| d.name == name)
            .with_context(|| format!("No deployment named '{}' in configuration", name))?;

        Deployment::try_from(raw.clone())
    }
}

/// Parse a decimal threshold from configuration.
pub(crate) fn parse_threshold(field: &str, value: &str) -> anyhow::Result<BigDecimal> {
    let parsed = BigDecimal::from_str(value.trim())
        .with_context(|| format!("{} is not a decimal: '{}'", field, value))?;
    if parsed < BigDecimal::from(0) {
        anyhow::bail!("{} must be non-negative, got {}", field, parsed);
    }
    Ok(parsed)
}
