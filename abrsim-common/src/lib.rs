//! # ABR Simulator Common Library
//!
//! Shared code for the adaptive-bitrate playback simulator:
//! - Quality tier ladder (ordered, best first)
//! - Event types (SimEvent enum) and the broadcast EventBus
//! - TOML configuration loading
//! - Utility functions

pub mod config;
pub mod error;
pub mod events;
pub mod tier;
pub mod time;

pub use error::{Error, Result};
pub use tier::{QualityTier, TierLadder};
