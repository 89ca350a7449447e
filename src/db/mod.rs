//! Entity storage for the pricing core.
//!
//! The pricing code only sees the [`EntityStore`] trait. Persistence lives
//! outside this crate; [`MemoryStore`] backs replays and tests.

pub mod memory;
pub mod models;
pub mod store;

pub use memory::{MemoryStore, Snapshot};
pub use store::EntityStore;
