//! Playback controller
//!
//! Owns the playback position, the play/stop state and the preferred tier.
//! Pure state machine: it never schedules anything itself. The engine calls
//! [`PlaybackController::tick`] from its playback timer and uses the returned
//! [`TickOutcome`] to decide whether another tick is due.

use abrsim_common::events::{DisplayState, PlaybackState};
use abrsim_common::{QualityTier, TierLadder};
use tracing::debug;

use super::buffer_store::BufferStore;
use super::selector::{QualitySelector, Selection};
use super::timeline::Timeline;
use crate::error::{Error, Result};

/// What one playback tick did to the position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickProgress {
    /// Playback was stopped; tick ignored
    Skipped,
    /// Some tier had the current segment; position moved (or stayed on the last segment)
    Advanced { from: usize, to: usize },
    /// No tier had the current segment; position held
    Stalled { segment: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub progress: TickProgress,
    /// True when another tick should be scheduled
    pub reschedule: bool,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    timeline: Timeline,
    ladder: TierLadder,
    current_segment: usize,
    state: PlaybackState,
    preferred: QualityTier,
}

impl PlaybackController {
    /// Stopped controller at segment 0
    ///
    /// Panics if `preferred` is not on `ladder`; engine configuration is
    /// validated before this point.
    pub fn new(timeline: Timeline, ladder: TierLadder, preferred: QualityTier) -> Self {
        assert!(
            ladder.contains(preferred),
            "preferred tier {} is not on the ladder",
            preferred
        );
        Self {
            timeline,
            ladder,
            current_segment: 0,
            state: PlaybackState::Stopped,
            preferred,
        }
    }

    pub fn current_segment(&self) -> usize {
        self.current_segment
    }

    pub fn segment_count(&self) -> usize {
        self.timeline.segment_count()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn preferred(&self) -> QualityTier {
        self.preferred
    }

    /// True once the last segment is reached
    pub fn at_end(&self) -> bool {
        self.current_segment >= self.timeline.last_segment()
    }

    /// Flip Stopped <-> Playing, returning the new state
    pub fn toggle_play(&mut self) -> PlaybackState {
        self.state = self.state.toggled();
        debug!(state = %self.state, segment = self.current_segment, "Playback toggled");
        self.state
    }

    /// Advance playback by one tick against a buffer snapshot
    pub fn tick(&mut self, buffers: &BufferStore) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome {
                progress: TickProgress::Skipped,
                reschedule: false,
            };
        }

        let from = self.current_segment;
        let progress = match QualitySelector::new(buffers).highest_available(from) {
            Some(_) => {
                self.current_segment = self.timeline.next_segment(from);
                TickProgress::Advanced {
                    from,
                    to: self.current_segment,
                }
            }
            None => TickProgress::Stalled { segment: from },
        };

        TickOutcome {
            progress,
            reschedule: !self.at_end(),
        }
    }

    /// Jump to a position fraction of the timeline
    ///
    /// Out-of-range fractions clamp to [0, 1]; NaN and infinities are rejected.
    /// Returns the new segment.
    pub fn scrub(&mut self, fraction: f64) -> Result<usize> {
        if !fraction.is_finite() {
            return Err(Error::InvalidFraction(fraction));
        }
        self.current_segment = self.timeline.segment_at_fraction(fraction);
        Ok(self.current_segment)
    }

    /// Change the preferred tier, returning the previous one
    pub fn set_preferred(&mut self, tier: QualityTier) -> Result<QualityTier> {
        if !self.ladder.contains(tier) {
            return Err(Error::UnknownTier(tier));
        }
        Ok(std::mem::replace(&mut self.preferred, tier))
    }

    /// Selection for the current segment
    pub fn selection(&self, buffers: &BufferStore) -> Selection {
        QualitySelector::new(buffers).select_for_playback(self.current_segment, self.preferred)
    }

    /// Display record for the current segment
    pub fn display(&self, buffers: &BufferStore) -> DisplayState {
        self.selection(buffers)
            .to_display(self.current_segment, self.segment_count())
    }
}
