//! Shared type definitions for event data
//!
//! Records published to the display collaborator.

use serde::{Deserialize, Serialize};

use super::playback_types::StreamStatus;
use crate::tier::QualityTier;

/// Display state for the active segment
///
/// Published after every playback tick, scrub and preferred-tier change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayState {
    /// Current segment index (0-based)
    pub segment: usize,
    /// Total number of segments on the timeline
    pub segment_count: usize,
    /// Tier rendered for the segment (None while buffering)
    pub selected_tier: Option<QualityTier>,
    /// Preferred / fallback / buffering classification
    pub status: StreamStatus,
    /// Human-readable status line
    pub message: String,
}

impl DisplayState {
    /// Playback position as a fraction of the timeline (0.0 - 1.0)
    pub fn position_fraction(&self) -> f64 {
        if self.segment_count <= 1 {
            return 0.0;
        }
        self.segment as f64 / (self.segment_count - 1) as f64
    }
}

/// Fill progress of one tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierProgress {
    pub tier: QualityTier,
    /// Number of filled segments
    pub filled: usize,
    /// Total number of segments
    pub total: usize,
    /// Filled share as a percentage (0.0 - 100.0)
    pub percent: f64,
}

impl TierProgress {
    pub fn new(tier: QualityTier, filled: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            filled as f64 * 100.0 / total as f64
        };
        Self {
            tier,
            filled,
            total,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_progress_percent() {
        let progress = TierProgress::new(QualityTier::new(720), 3, 12);
        assert_eq!(progress.percent, 25.0);
        assert!(!progress.is_complete());

        let full = TierProgress::new(QualityTier::new(720), 12, 12);
        assert_eq!(full.percent, 100.0);
        assert!(full.is_complete());
    }

    #[test]
    fn test_position_fraction() {
        let display = DisplayState {
            segment: 11,
            segment_count: 12,
            selected_tier: None,
            status: StreamStatus::Buffering,
            message: String::new(),
        };
        assert_eq!(display.position_fraction(), 1.0);

        let single = DisplayState {
            segment: 0,
            segment_count: 1,
            ..display
        };
        assert_eq!(single.position_fraction(), 0.0);
    }
}
