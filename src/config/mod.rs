mod config;
mod deployment;

pub use self::config::{
    DeploymentSettings, LoggingSettings, ReplaySettings, Settings, StablecoinPairSettings,
    TokenSlot,
};
pub use deployment::{Deployment, StablecoinPair, Whitelist, MAX_STABLECOIN_PAIRS};
