pub mod events;
pub mod processor;

pub use events::{EventOutcome, PairEvent, ReplayInput};
pub use processor::{EventProcessor, ReplaySummary};
