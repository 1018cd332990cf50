//! Quality selection
//!
//! Pure functions over a [`BufferStore`] snapshot: which tier to render for a
//! segment given the user's preferred tier.
//!
//! Fallback is "best currently available", not "next worse than preferred":
//! when the preferred tier is missing, whichever tier ranks highest among the
//! filled ones wins, even if it is better than the preferred tier.

use abrsim_common::events::{DisplayState, StreamStatus};
use abrsim_common::QualityTier;
use serde::Serialize;

use super::buffer_store::BufferStore;

/// Tier chosen for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "tier", rename_all = "lowercase")]
pub enum Selection {
    /// Preferred tier is filled at the segment
    Preferred(QualityTier),
    /// Preferred tier missing; best filled tier rendered instead
    Fallback(QualityTier),
    /// No tier has the segment
    Buffering,
}

impl Selection {
    /// Tier to render, None while buffering
    pub fn tier(&self) -> Option<QualityTier> {
        match self {
            Selection::Preferred(tier) | Selection::Fallback(tier) => Some(*tier),
            Selection::Buffering => None,
        }
    }

    pub fn status(&self) -> StreamStatus {
        match self {
            Selection::Preferred(_) => StreamStatus::Preferred,
            Selection::Fallback(_) => StreamStatus::Fallback,
            Selection::Buffering => StreamStatus::Buffering,
        }
    }

    pub fn is_buffering(&self) -> bool {
        matches!(self, Selection::Buffering)
    }

    /// Status line shown next to the player
    pub fn message(&self) -> String {
        match self {
            Selection::Preferred(tier) => format!("playing at preferred quality {}", tier),
            Selection::Fallback(tier) => format!("playing at fallback quality {}", tier),
            Selection::Buffering => "buffering, no quality tier available".to_string(),
        }
    }

    /// Display record for `segment`
    pub fn to_display(&self, segment: usize, segment_count: usize) -> DisplayState {
        DisplayState {
            segment,
            segment_count,
            selected_tier: self.tier(),
            status: self.status(),
            message: self.message(),
        }
    }
}

/// Read-only view over a buffer snapshot
#[derive(Clone, Copy)]
pub struct QualitySelector<'a> {
    buffers: &'a BufferStore,
}

impl<'a> QualitySelector<'a> {
    pub fn new(buffers: &'a BufferStore) -> Self {
        Self { buffers }
    }

    /// Best tier filled at `segment`, scanning best to worst
    pub fn highest_available(&self, segment: usize) -> Option<QualityTier> {
        self.buffers
            .tiers()
            .find(|tier| self.buffers.is_filled(*tier, segment))
    }

    /// Tier to render at `segment` for a user preferring `preferred`
    pub fn select_for_playback(&self, segment: usize, preferred: QualityTier) -> Selection {
        if self.buffers.is_filled(preferred, segment) {
            return Selection::Preferred(preferred);
        }

        match self.highest_available(segment) {
            Some(tier) => Selection::Fallback(tier),
            None => Selection::Buffering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::timeline::Timeline;
    use abrsim_common::TierLadder;

    const T2160: QualityTier = QualityTier::new(2160);
    const T1080: QualityTier = QualityTier::new(1080);
    const T480: QualityTier = QualityTier::new(480);

    fn store() -> BufferStore {
        BufferStore::new(
            TierLadder::from_values(&[2160, 1080, 480]).unwrap(),
            Timeline::new(12),
        )
    }

    #[test]
    fn test_empty_store_is_buffering() {
        let buffers = store();
        let selector = QualitySelector::new(&buffers);

        assert_eq!(selector.highest_available(0), None);
        for preferred in [T2160, T1080, T480] {
            assert_eq!(selector.select_for_playback(0, preferred), Selection::Buffering);
        }
    }

    #[test]
    fn test_preferred_wins_when_filled() {
        let mut buffers = store();
        buffers.set_filled(T2160, 0);
        buffers.set_filled(T1080, 0);

        let selector = QualitySelector::new(&buffers);
        assert_eq!(selector.select_for_playback(0, T1080), Selection::Preferred(T1080));
        assert_eq!(selector.highest_available(0), Some(T2160));
    }

    #[test]
    fn test_fallback_may_be_worse() {
        let mut buffers = store();
        buffers.set_filled(T480, 0);

        let selection = QualitySelector::new(&buffers).select_for_playback(0, T2160);
        assert_eq!(selection, Selection::Fallback(T480));
        assert_eq!(selection.status(), StreamStatus::Fallback);
    }

    #[test]
    fn test_fallback_may_be_better() {
        let mut buffers = store();
        buffers.set_filled(T2160, 0);
        buffers.set_filled(T1080, 0);

        // Preferring 480 with only better tiers filled falls back upward
        let selection = QualitySelector::new(&buffers).select_for_playback(0, T480);
        assert_eq!(selection, Selection::Fallback(T2160));
    }

    #[test]
    fn test_selection_is_per_segment() {
        let mut buffers = store();
        buffers.set_filled(T1080, 0);

        let selector = QualitySelector::new(&buffers);
        assert_eq!(selector.select_for_playback(0, T1080), Selection::Preferred(T1080));
        assert_eq!(selector.select_for_playback(1, T1080), Selection::Buffering);
    }

    #[test]
    fn test_messages_and_display() {
        assert_eq!(
            Selection::Preferred(T1080).message(),
            "playing at preferred quality 1080p"
        );
        assert_eq!(
            Selection::Fallback(T480).message(),
            "playing at fallback quality 480p"
        );

        let display = Selection::Buffering.to_display(4, 12);
        assert_eq!(display.segment, 4);
        assert_eq!(display.segment_count, 12);
        assert_eq!(display.selected_tier, None);
        assert_eq!(display.status, StreamStatus::Buffering);
    }
}
