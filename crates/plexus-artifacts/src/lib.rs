//! Append-only artifact publish point for worker outputs, with atomic
//! writes and per-agent sequence manifests.

mod bus;
mod error;

pub use bus::ArtifactBus;
pub use error::{Error, Result};
