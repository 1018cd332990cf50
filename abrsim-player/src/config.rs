//! Validated engine configuration
//!
//! [`EngineConfig`] is built once from the raw TOML [`EngineSettings`] (plus any
//! command-line overrides) and is immutable for the lifetime of an engine.

use abrsim_common::config::EngineSettings;
use abrsim_common::{QualityTier, TierLadder};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::playback::Timeline;

/// Audited engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tiers best to worst
    pub ladder: TierLadder,
    pub timeline: Timeline,
    pub fill_interval: Duration,
    pub playback_interval: Duration,
    /// Fill-probability base constant
    pub fill_base_threshold: f64,
    /// Speed-factor increment per rank
    pub rank_speed_increment: f64,
    /// Preferred tier at startup
    pub preferred_tier: QualityTier,
    /// Fixed seed for the fill random source (entropy when None)
    pub seed: Option<u64>,
    /// Event channel capacity
    pub event_capacity: usize,
}

impl EngineConfig {
    /// Validate raw settings
    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        let ladder = TierLadder::from_values(&settings.tiers)?;

        if settings.segment_count == 0 {
            return Err(Error::Config(
                "segment_count must be at least 1".to_string(),
            ));
        }

        if settings.fill_interval_ms == 0 {
            return Err(Error::Config("fill_interval_ms must be positive".to_string()));
        }

        if settings.playback_interval_ms == 0 {
            return Err(Error::Config(
                "playback_interval_ms must be positive".to_string(),
            ));
        }

        let base = settings.fill_base_threshold;
        if !base.is_finite() || base <= 0.0 || base > 1.0 {
            return Err(Error::Config(format!(
                "fill_base_threshold must be in (0, 1], got {}",
                base
            )));
        }

        let increment = settings.rank_speed_increment;
        if !increment.is_finite() || increment < 0.0 {
            return Err(Error::Config(format!(
                "rank_speed_increment must be >= 0, got {}",
                increment
            )));
        }

        let preferred_tier = match settings.preferred_tier {
            Some(value) => {
                let tier = QualityTier::new(value);
                if !ladder.contains(tier) {
                    return Err(Error::Config(format!(
                        "preferred_tier {} is not one of the configured tiers",
                        tier
                    )));
                }
                tier
            }
            None => ladder.best(),
        };

        Ok(Self {
            ladder,
            timeline: Timeline::new(settings.segment_count),
            fill_interval: Duration::from_millis(settings.fill_interval_ms),
            playback_interval: Duration::from_millis(settings.playback_interval_ms),
            fill_base_threshold: base,
            rank_speed_increment: increment,
            preferred_tier,
            seed: settings.seed,
            event_capacity: 256,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.timeline.segment_count()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let ladder = TierLadder::default();
        Self {
            preferred_tier: ladder.best(),
            ladder,
            timeline: Timeline::new(12),
            fill_interval: Duration::from_millis(1500),
            playback_interval: Duration::from_millis(1200),
            fill_base_threshold: 0.6,
            rank_speed_increment: 0.2,
            seed: None,
            event_capacity: 256,
        }
    }
}
