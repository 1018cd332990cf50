//! Segment timeline
//!
//! A fixed number of consecutive, equal-duration segments indexed
//! `0..segment_count`. Immutable after construction.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timeline {
    segment_count: usize,
}

impl Timeline {
    /// Create a timeline
    ///
    /// Panics if `segment_count` is zero; configuration validation rejects
    /// that before an engine is built.
    pub fn new(segment_count: usize) -> Self {
        assert!(segment_count > 0, "timeline needs at least one segment");
        Self { segment_count }
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Index of the final segment
    pub fn last_segment(&self) -> usize {
        self.segment_count - 1
    }

    pub fn contains(&self, segment: usize) -> bool {
        segment < self.segment_count
    }

    /// Panic unless `segment` is on the timeline
    pub fn check(&self, segment: usize) {
        assert!(
            self.contains(segment),
            "segment {} out of range (timeline has {} segments)",
            segment,
            self.segment_count
        );
    }

    /// Segment following `segment`, saturating at the last one
    pub fn next_segment(&self, segment: usize) -> usize {
        (segment + 1).min(self.last_segment())
    }

    /// Map a position fraction to a segment index
    ///
    /// `round(fraction * (segment_count - 1))` with the fraction clamped to
    /// [0, 1]. Caller must reject non-finite input.
    pub fn segment_at_fraction(&self, fraction: f64) -> usize {
        let clamped = fraction.clamp(0.0, 1.0);
        let segment = (clamped * self.last_segment() as f64).round() as usize;
        segment.min(self.last_segment())
    }
}
