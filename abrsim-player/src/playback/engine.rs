//! Simulation engine
//!
//! One [`SimulationEngine`] owns one independent simulation: the buffer store,
//! the seeded fill simulator, the playback controller and the two timers that
//! drive them.
//!
//! All mutable state sits behind a single `RwLock`. Every tick and every
//! command performs its whole mutation (and publishes its events) while
//! holding the write lock, so a playback tick observes a fill tick either
//! completely or not at all.
//!
//! Lock order is task slot first, then state. Timer ticks only ever take the
//! state lock.

use abrsim_common::events::{
    DisplayState, EventBus, PlaybackState, SimEvent, TierProgress,
};
use abrsim_common::QualityTier;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::buffer_store::BufferStore;
use super::controller::{PlaybackController, TickProgress};
use super::fill::FillSimulator;
use super::scheduler::{ScheduledTask, TaskControl};
use super::selector::Selection;
use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// Serializable point-in-time view of an engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub engine_id: Uuid,
    pub seed: u64,
    pub state: PlaybackState,
    pub segment: usize,
    pub segment_count: usize,
    pub preferred: QualityTier,
    /// Live selection for the current segment
    pub selection: Selection,
    /// Last published display state
    pub display: DisplayState,
    /// Fill progress per tier, best first
    pub tiers: Vec<TierProgress>,
}

struct EngineState {
    buffers: BufferStore,
    fill: FillSimulator<StdRng>,
    controller: PlaybackController,
    /// Last display state handed to the collaborator
    published: DisplayState,
    /// A live (uncancelled, unfinished) playback task exists
    playback_armed: bool,
    disposed: bool,
}

impl EngineState {
    fn ensure_live(&self, engine_id: Uuid) -> Result<()> {
        if self.disposed {
            Err(Error::Disposed(engine_id))
        } else {
            Ok(())
        }
    }

    fn publish_display(&mut self, engine_id: Uuid, events: &EventBus) {
        let display = self.controller.display(&self.buffers);
        self.published = display.clone();
        events.emit_lossy(SimEvent::DisplayUpdated {
            engine_id,
            display,
            timestamp: chrono::Utc::now(),
        });
    }
}

pub struct SimulationEngine {
    id: Uuid,
    config: Arc<EngineConfig>,
    seed: u64,
    state: Arc<RwLock<EngineState>>,
    events: EventBus,
    /// Parent of every timer token; cancelled on dispose or drop
    shutdown: CancellationToken,
    fill_task: Mutex<Option<ScheduledTask>>,
    playback_task: Mutex<Option<ScheduledTask>>,
}

impl SimulationEngine {
    /// Build a new simulation and start its fill timer
    ///
    /// Must be called from within a tokio runtime. Playback starts Stopped at
    /// segment 0 with every buffer empty.
    pub fn create(config: EngineConfig) -> Result<Self> {
        let id = Uuid::new_v4();
        let seed = config.seed.unwrap_or_else(rand::random);
        let config = Arc::new(config);
        let events = EventBus::new(config.event_capacity);

        let buffers = BufferStore::new(config.ladder.clone(), config.timeline);
        let controller = PlaybackController::new(
            config.timeline,
            config.ladder.clone(),
            config.preferred_tier,
        );
        let published = controller.display(&buffers);
        let fill = FillSimulator::seeded(
            seed,
            config.fill_base_threshold,
            config.rank_speed_increment,
        );

        for (rank, tier) in config.ladder.iter().enumerate() {
            debug!(
                engine_id = %id,
                %tier,
                rank,
                probability = fill.fill_probability(rank),
                "Per-tick fill probability"
            );
        }

        let state = Arc::new(RwLock::new(EngineState {
            buffers,
            fill,
            controller,
            published,
            playback_armed: false,
            disposed: false,
        }));

        let shutdown = CancellationToken::new();
        let fill_task = spawn_fill_task(
            id,
            &config,
            Arc::clone(&state),
            events.clone(),
            shutdown.child_token(),
        );

        info!(
            engine_id = %id,
            seed,
            tiers = ?config.ladder.as_slice(),
            segment_count = config.segment_count(),
            preferred = %config.preferred_tier,
            event_capacity = events.capacity(),
            "Simulation engine created"
        );

        events.emit_lossy(SimEvent::EngineStarted {
            engine_id: id,
            tiers: config.ladder.as_slice().to_vec(),
            segment_count: config.segment_count(),
            seed,
            timestamp: chrono::Utc::now(),
        });

        Ok(Self {
            id,
            config,
            seed,
            state,
            events,
            shutdown,
            fill_task: Mutex::new(Some(fill_task)),
            playback_task: Mutex::new(None),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seed of the fill random source
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn segment_count(&self) -> usize {
        self.config.segment_count()
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.events.subscribe()
    }

    // ========================================
    // Commands
    // ========================================

    /// Flip Stopped <-> Playing
    ///
    /// Entering Playing arms a playback timer; leaving it cancels the timer
    /// before this call returns.
    pub async fn toggle_play(&self) -> Result<PlaybackState> {
        self.transition(None).await
    }

    /// Start playback if stopped
    pub async fn play(&self) -> Result<PlaybackState> {
        self.transition(Some(PlaybackState::Playing)).await
    }

    /// Stop playback if playing
    pub async fn stop(&self) -> Result<PlaybackState> {
        self.transition(Some(PlaybackState::Stopped)).await
    }

    /// Toggle, or move to `target` if not already there
    ///
    /// The state check and the toggle happen under one acquisition of the
    /// task slot and the state lock.
    async fn transition(&self, target: Option<PlaybackState>) -> Result<PlaybackState> {
        let mut task_slot = self.playback_task.lock().await;
        let mut state = self.state.write().await;
        state.ensure_live(self.id)?;

        let old_state = state.controller.state();
        if target == Some(old_state) {
            return Ok(old_state);
        }
        let new_state = state.controller.toggle_play();

        if let Some(task) = task_slot.take() {
            task.cancel();
        }
        state.playback_armed = false;

        if new_state.is_playing() {
            *task_slot = Some(self.spawn_playback_task());
            state.playback_armed = true;
        }

        self.events.emit_lossy(SimEvent::PlaybackStateChanged {
            engine_id: self.id,
            old_state,
            new_state,
            timestamp: chrono::Utc::now(),
        });

        info!(
            engine_id = %self.id,
            segment = state.controller.current_segment(),
            "Playback state changed: {} -> {}",
            old_state,
            new_state
        );

        Ok(new_state)
    }

    /// Jump to a fraction of the timeline
    ///
    /// Fractions outside [0, 1] clamp; non-finite fractions are rejected. No
    /// buffering is forced at the target; the published state reads
    /// "buffering" until some tier fills it. If playback is on but its timer
    /// already ran off the end, scrubbing back re-arms it.
    pub async fn scrub(&self, fraction: f64) -> Result<usize> {
        let mut task_slot = self.playback_task.lock().await;
        let mut state = self.state.write().await;
        state.ensure_live(self.id)?;

        let from_segment = state.controller.current_segment();
        let to_segment = state.controller.scrub(fraction)?;

        self.events.emit_lossy(SimEvent::Scrubbed {
            engine_id: self.id,
            fraction: fraction.clamp(0.0, 1.0),
            from_segment,
            to_segment,
            timestamp: chrono::Utc::now(),
        });
        state.publish_display(self.id, &self.events);

        if state.controller.is_playing() && !state.playback_armed && !state.controller.at_end() {
            debug!(engine_id = %self.id, segment = to_segment, "Re-arming playback timer after scrub");
            if let Some(task) = task_slot.take() {
                task.cancel();
            }
            *task_slot = Some(self.spawn_playback_task());
            state.playback_armed = true;
        }

        info!(engine_id = %self.id, from_segment, to_segment, "Scrubbed");
        Ok(to_segment)
    }

    /// Change the preferred tier and republish the display state
    pub async fn set_preferred(&self, tier: QualityTier) -> Result<()> {
        let mut state = self.state.write().await;
        state.ensure_live(self.id)?;

        let old_tier = state.controller.set_preferred(tier)?;
        self.events.emit_lossy(SimEvent::PreferredChanged {
            engine_id: self.id,
            old_tier,
            new_tier: tier,
            timestamp: chrono::Utc::now(),
        });
        state.publish_display(self.id, &self.events);

        info!(engine_id = %self.id, "Preferred tier changed: {} -> {}", old_tier, tier);
        Ok(())
    }

    /// Stop both timers and wait for them to exit
    ///
    /// Idempotent. Queries keep answering with the final state; commands
    /// fail with [`Error::Disposed`].
    pub async fn dispose(&self) {
        {
            let mut state = self.state.write().await;
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.playback_armed = false;
        }
        self.shutdown.cancel();

        if let Some(task) = self.playback_task.lock().await.take() {
            task.shutdown().await;
        }
        if let Some(task) = self.fill_task.lock().await.take() {
            task.shutdown().await;
        }

        self.events.emit_lossy(SimEvent::EngineDisposed {
            engine_id: self.id,
            timestamp: chrono::Utc::now(),
        });
        info!(engine_id = %self.id, "Simulation engine disposed");
    }

    // ========================================
    // Queries
    // ========================================

    pub async fn is_disposed(&self) -> bool {
        self.state.read().await.disposed
    }

    pub async fn current_segment(&self) -> usize {
        self.state.read().await.controller.current_segment()
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.state.read().await.controller.state()
    }

    pub async fn preferred(&self) -> QualityTier {
        self.state.read().await.controller.preferred()
    }

    /// Fraction of `tier`'s segments filled (0.0 - 1.0)
    pub async fn fill_ratio(&self, tier: QualityTier) -> Result<f64> {
        if !self.config.ladder.contains(tier) {
            return Err(Error::UnknownTier(tier));
        }
        Ok(self.state.read().await.buffers.fill_ratio(tier))
    }

    /// Buffered share of the preferred tier as a percentage (0.0 - 100.0)
    pub async fn buffer_percent(&self) -> f64 {
        let state = self.state.read().await;
        state.buffers.progress(state.controller.preferred()).percent
    }

    /// True when `tier` has `segment` filled
    pub async fn is_filled(&self, tier: QualityTier, segment: usize) -> Result<bool> {
        if !self.config.ladder.contains(tier) {
            return Err(Error::UnknownTier(tier));
        }
        if !self.config.timeline.contains(segment) {
            return Err(Error::SegmentOutOfRange {
                segment,
                segment_count: self.segment_count(),
            });
        }
        Ok(self.state.read().await.buffers.is_filled(tier, segment))
    }

    /// Last published display state
    pub async fn display(&self) -> DisplayState {
        self.state.read().await.published.clone()
    }

    /// Live selection for the current segment
    pub async fn selection(&self) -> Selection {
        let state = self.state.read().await;
        state.controller.selection(&state.buffers)
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        let state = self.state.read().await;
        EngineSnapshot {
            engine_id: self.id,
            seed: self.seed,
            state: state.controller.state(),
            segment: state.controller.current_segment(),
            segment_count: state.controller.segment_count(),
            preferred: state.controller.preferred(),
            selection: state.controller.selection(&state.buffers),
            display: state.published.clone(),
            tiers: state.buffers.all_progress(),
        }
    }

    fn spawn_playback_task(&self) -> ScheduledTask {
        let engine_id = self.id;
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let token = self.shutdown.child_token();
        let own_token = token.clone();

        ScheduledTask::spawn("playback", self.config.playback_interval, token, move || {
            let state = Arc::clone(&state);
            let events = events.clone();
            let own_token = own_token.clone();
            async move { playback_tick(engine_id, &state, &events, &own_token).await }
        })
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn spawn_fill_task(
    engine_id: Uuid,
    config: &EngineConfig,
    state: Arc<RwLock<EngineState>>,
    events: EventBus,
    token: CancellationToken,
) -> ScheduledTask {
    ScheduledTask::spawn("fill", config.fill_interval, token, move || {
        let state = Arc::clone(&state);
        let events = events.clone();
        async move { fill_tick(engine_id, &state, &events).await }
    })
}

async fn fill_tick(engine_id: Uuid, state: &RwLock<EngineState>, events: &EventBus) -> TaskControl {
    let mut guard = state.write().await;
    if guard.disposed {
        return TaskControl::Finish;
    }

    let EngineState {
        buffers,
        fill,
        controller,
        ..
    } = &mut *guard;

    let report = fill.tick(buffers);
    let preferred = buffers.progress(controller.preferred());

    debug!(
        engine_id = %engine_id,
        filled = report.newly_filled.len(),
        preferred = %preferred.tier,
        percent = preferred.percent,
        "Fill tick"
    );

    events.emit_lossy(SimEvent::BufferProgress {
        engine_id,
        preferred,
        newly_filled: report.newly_filled,
        timestamp: chrono::Utc::now(),
    });

    TaskControl::Continue
}

async fn playback_tick(
    engine_id: Uuid,
    state: &RwLock<EngineState>,
    events: &EventBus,
    token: &CancellationToken,
) -> TaskControl {
    let mut guard = state.write().await;

    // Stopped (or superseded) while this tick waited for the lock
    if token.is_cancelled() || guard.disposed || !guard.controller.is_playing() {
        return TaskControl::Finish;
    }

    let outcome = {
        let EngineState {
            buffers, controller, ..
        } = &mut *guard;
        controller.tick(buffers)
    };

    match outcome.progress {
        TickProgress::Advanced { from, to } => {
            debug!(engine_id = %engine_id, from, to, "Playback advanced");
        }
        TickProgress::Stalled { segment } => {
            debug!(engine_id = %engine_id, segment, "Playback stalled, buffering");
        }
        TickProgress::Skipped => {}
    }

    guard.publish_display(engine_id, events);

    if outcome.reschedule {
        return TaskControl::Continue;
    }

    guard.playback_armed = false;
    let segment = guard.controller.current_segment();
    events.emit_lossy(SimEvent::PlaybackFinished {
        engine_id,
        segment,
        timestamp: chrono::Utc::now(),
    });
    info!(engine_id = %engine_id, segment, "Timeline exhausted, playback timer stopped");

    TaskControl::Finish
}
