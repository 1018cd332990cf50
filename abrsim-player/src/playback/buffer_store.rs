//! Per-tier segment fill flags
//!
//! One ordered sequence of `segment_count` flags per quality tier. Flags only
//! ever go from unfilled to filled (download-like, no eviction).
//!
//! Indices are bounded by the fixed timeline and tier ladder, so an unknown
//! tier or an out-of-range segment is a programming error and panics.

use abrsim_common::events::TierProgress;
use abrsim_common::{QualityTier, TierLadder};

use super::timeline::Timeline;

#[derive(Debug, Clone)]
pub struct BufferStore {
    ladder: TierLadder,
    timeline: Timeline,
    /// flags[rank][segment]
    flags: Vec<Vec<bool>>,
}

impl BufferStore {
    /// Create a store with every flag unfilled
    pub fn new(ladder: TierLadder, timeline: Timeline) -> Self {
        let flags = vec![vec![false; timeline.segment_count()]; ladder.len()];
        Self {
            ladder,
            timeline,
            flags,
        }
    }

    pub fn ladder(&self) -> &TierLadder {
        &self.ladder
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    pub fn segment_count(&self) -> usize {
        self.timeline.segment_count()
    }

    /// Tiers in ladder order (best first)
    pub fn tiers(&self) -> impl Iterator<Item = QualityTier> + '_ {
        self.ladder.iter()
    }

    fn rank_of(&self, tier: QualityTier) -> usize {
        self.ladder
            .rank(tier)
            .unwrap_or_else(|| panic!("tier {} is not on the buffer ladder", tier))
    }

    pub fn is_filled(&self, tier: QualityTier, segment: usize) -> bool {
        self.timeline.check(segment);
        self.flags[self.rank_of(tier)][segment]
    }

    /// Mark a segment filled
    ///
    /// Idempotent. Returns true when the flag actually changed.
    pub fn set_filled(&mut self, tier: QualityTier, segment: usize) -> bool {
        self.timeline.check(segment);
        let rank = self.rank_of(tier);
        let flag = &mut self.flags[rank][segment];
        let changed = !*flag;
        *flag = true;
        changed
    }

    /// Lowest unfilled segment of `tier`, None when fully filled
    pub fn frontier(&self, tier: QualityTier) -> Option<usize> {
        self.flags[self.rank_of(tier)]
            .iter()
            .position(|filled| !filled)
    }

    pub fn filled_count(&self, tier: QualityTier) -> usize {
        self.flags[self.rank_of(tier)]
            .iter()
            .filter(|filled| **filled)
            .count()
    }

    /// Fraction of segments filled for `tier` (0.0 - 1.0)
    pub fn fill_ratio(&self, tier: QualityTier) -> f64 {
        self.filled_count(tier) as f64 / self.segment_count() as f64
    }

    pub fn is_complete(&self, tier: QualityTier) -> bool {
        self.frontier(tier).is_none()
    }

    pub fn progress(&self, tier: QualityTier) -> TierProgress {
        TierProgress::new(tier, self.filled_count(tier), self.segment_count())
    }

    /// Progress of every tier, in ladder order
    pub fn all_progress(&self) -> Vec<TierProgress> {
        self.tiers().map(|tier| self.progress(tier)).collect()
    }

    /// Flags of one tier, segment order
    pub fn flags(&self, tier: QualityTier) -> &[bool] {
        &self.flags[self.rank_of(tier)]
    }
}
