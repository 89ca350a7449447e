pub mod config;
pub mod db;
pub mod pricing;
pub mod utils;
pub mod worker;

pub use config::{Deployment, Settings};
pub use db::{EntityStore, MemoryStore};
pub use pricing::PriceResolver;
pub use worker::{EventProcessor, PairEvent};
