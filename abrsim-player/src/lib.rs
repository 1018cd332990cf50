//! # ABR Playback Simulator (abrsim-player)
//!
//! Simulates adaptive-bitrate video playback over a fixed timeline of
//! segments.
//!
//! **Purpose:** Fill several quality tiers progressively at random, pick the
//! tier to render for the current segment, and advance playback only while
//! some tier has the segment buffered.
//!
//! **Architecture:** Each [`SimulationEngine`] owns its state behind one lock
//! and drives it from two cancellable timers (fill and playback). State
//! changes are published on a broadcast [`abrsim_common::events::EventBus`].

pub mod config;
pub mod error;
pub mod playback;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use playback::{EngineSnapshot, Selection, SimulationEngine};

/// Build metadata stamped by build.rs
pub mod build_info {
    pub const GIT_HASH: &str = env!("GIT_HASH");
    pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
    pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");
}
