use std::{fs, str::FromStr, sync::Arc};

use anyhow::Context;
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

use runic_pricing::{
    worker::ReplayInput, EventProcessor, MemoryStore, PriceResolver, Settings,
};

fn main() -> anyhow::Result<()> {
    // Load configuration (optional path argument, defaults to ./config.yaml)
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_path(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    };

    let level = LevelFilter::from_str(&settings.logging.level)
        .with_context(|| format!("Invalid log level '{}'", settings.logging.level))?;
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("Failed to initialize logger")?;

    let replay = settings
        .replay
        .clone()
        .context("No replay section in configuration")?;

    let deployment = Arc::new(settings.deployment(&replay.deployment)?);
    info!(
        "Deployment '{}': native {}, {} stablecoin pairs, {} whitelisted tokens",
        deployment.name,
        deployment.native_token,
        deployment.configured_stablecoin_pairs().count(),
        deployment.whitelist.len()
    );

    let raw = fs::read_to_string(&replay.input)
        .with_context(|| format!("Failed to read replay input {}", replay.input))?;
    let input: ReplayInput = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse replay input {}", replay.input))?;

    info!(
        "Loaded {} tokens, {} pairs and {} events",
        input.snapshot.tokens.len(),
        input.snapshot.pairs.len(),
        input.events.len()
    );

    let store = MemoryStore::from_snapshot(input.snapshot);
    let mut processor = EventProcessor::new(PriceResolver::new(deployment), store);
    let summary = processor.replay(&input.events);

    if summary.failed > 0 {
        warn!("{} events could not be applied", summary.failed);
    }

    let snapshot = processor.into_store().snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
