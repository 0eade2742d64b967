//! Loopcast - post a numbered video sequence to Bluesky, one per run
//!
//! This library provides the pieces of a single posting run: the tracking
//! file, the next-video lookup, the Bluesky client, and the run orchestration
//! that strings them together.

pub mod config;
pub mod error;
pub mod locator;
pub mod logging;
pub mod platforms;
pub mod publisher;
pub mod runner;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{LoopcastError, Result};
pub use publisher::PublishOutcome;
pub use runner::{RunContext, RunMode, RunOutcome};
pub use state::{PostedVideos, StateLoad, StateStore};
pub use types::{VideoId, VideoPost};
