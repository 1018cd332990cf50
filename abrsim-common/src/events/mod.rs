//! Event types for the simulator event system
//!
//! Provides the shared event definitions and the EventBus every engine
//! publishes on. The external display collaborator subscribes here instead of
//! polling engine internals.

mod playback_types;
mod shared_types;

pub use playback_types::{PlaybackState, StreamStatus};
pub use shared_types::{DisplayState, TierProgress};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::tier::QualityTier;

/// Simulator event types
///
/// Every event names the engine it came from so that subscribers watching
/// several independent simulations can tell them apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// Engine created and fill timer running
    EngineStarted {
        engine_id: Uuid,
        /// Tiers best to worst
        tiers: Vec<QualityTier>,
        segment_count: usize,
        /// Seed of the fill random source (replay with `--seed`)
        seed: u64,
        timestamp: DateTime<Utc>,
    },

    /// Fill tick completed
    ///
    /// Carries the progress of the preferred tier (the progress bar) and the
    /// segments newly filled during this tick.
    BufferProgress {
        engine_id: Uuid,
        preferred: TierProgress,
        /// (tier, segment) pairs filled by this tick, in ladder order
        newly_filled: Vec<(QualityTier, usize)>,
        timestamp: DateTime<Utc>,
    },

    /// Display state republished (playback tick, scrub or preferred change)
    DisplayUpdated {
        engine_id: Uuid,
        display: DisplayState,
        timestamp: DateTime<Utc>,
    },

    /// Playback state changed (Stopped <-> Playing)
    PlaybackStateChanged {
        engine_id: Uuid,
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: DateTime<Utc>,
    },

    /// User scrubbed to a new position
    Scrubbed {
        engine_id: Uuid,
        /// Requested fraction after clamping to [0, 1]
        fraction: f64,
        from_segment: usize,
        to_segment: usize,
        timestamp: DateTime<Utc>,
    },

    /// Preferred tier changed
    PreferredChanged {
        engine_id: Uuid,
        old_tier: QualityTier,
        new_tier: QualityTier,
        timestamp: DateTime<Utc>,
    },

    /// Last segment reached; no further playback ticks are scheduled
    PlaybackFinished {
        engine_id: Uuid,
        segment: usize,
        timestamp: DateTime<Utc>,
    },

    /// Engine disposed; timers cancelled
    EngineDisposed {
        engine_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl SimEvent {
    /// Engine that emitted this event
    pub fn engine_id(&self) -> Uuid {
        match self {
            SimEvent::EngineStarted { engine_id, .. }
            | SimEvent::BufferProgress { engine_id, .. }
            | SimEvent::DisplayUpdated { engine_id, .. }
            | SimEvent::PlaybackStateChanged { engine_id, .. }
            | SimEvent::Scrubbed { engine_id, .. }
            | SimEvent::PreferredChanged { engine_id, .. }
            | SimEvent::PlaybackFinished { engine_id, .. }
            | SimEvent::EngineDisposed { engine_id, .. } => *engine_id,
        }
    }

    /// Short event name, matches the serde `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            SimEvent::EngineStarted { .. } => "EngineStarted",
            SimEvent::BufferProgress { .. } => "BufferProgress",
            SimEvent::DisplayUpdated { .. } => "DisplayUpdated",
            SimEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            SimEvent::Scrubbed { .. } => "Scrubbed",
            SimEvent::PreferredChanged { .. } => "PreferredChanged",
            SimEvent::PlaybackFinished { .. } => "PlaybackFinished",
            SimEvent::EngineDisposed { .. } => "EngineDisposed",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Event distribution bus for one or more engines
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block ticks)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use abrsim_common::events::{EventBus, SimEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(SimEvent::EngineDisposed {
///     engine_id: uuid::Uuid::new_v4(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SimEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: SimEvent) -> Result<usize, broadcast::error::SendError<SimEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SimEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
