//! Shared helpers for abrsim-player integration tests
//!
//! Engine tests run on a paused tokio clock (`start_paused = true`), so
//! `advance` moves simulated time instantly and timer ticks fire in order.

#![allow(dead_code)]

use std::time::Duration;

use abrsim_common::events::SimEvent;
use abrsim_common::{QualityTier, TierLadder};
use abrsim_player::playback::Timeline;
use abrsim_player::EngineConfig;
use tokio::sync::broadcast;

pub const T2160: QualityTier = QualityTier::new(2160);
pub const T1080: QualityTier = QualityTier::new(1080);
pub const T480: QualityTier = QualityTier::new(480);

pub const FILL_MS: u64 = 100;
pub const PLAYBACK_MS: u64 = 120;

/// Three tiers, twelve segments, fast timers, fixed seed
pub fn test_config(seed: u64) -> EngineConfig {
    EngineConfig {
        ladder: TierLadder::from_values(&[2160, 1080, 480]).unwrap(),
        timeline: Timeline::new(12),
        fill_interval: Duration::from_millis(FILL_MS),
        playback_interval: Duration::from_millis(PLAYBACK_MS),
        fill_base_threshold: 0.6,
        rank_speed_increment: 0.2,
        preferred_tier: T2160,
        seed: Some(seed),
        event_capacity: 4096,
    }
}

/// Config whose tiers fill on practically every tick
pub fn eager_fill_config(seed: u64) -> EngineConfig {
    EngineConfig {
        fill_base_threshold: 1e-9,
        ..test_config(seed)
    }
}

/// Config whose tiers never fill (threshold 1.0 at every rank)
pub fn starved_config(seed: u64) -> EngineConfig {
    EngineConfig {
        fill_base_threshold: 1.0,
        rank_speed_increment: 0.0,
        ..test_config(seed)
    }
}

/// Move the paused clock forward
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Collect every event currently queued on a receiver
pub fn drain(rx: &mut broadcast::Receiver<SimEvent>) -> Vec<SimEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn count_type(events: &[SimEvent], event_type: &str) -> usize {
    events
        .iter()
        .filter(|event| event.event_type() == event_type)
        .count()
}
