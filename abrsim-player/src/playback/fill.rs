//! Fill simulator
//!
//! Approximates progressive download of every tier, one segment at most per
//! tier per tick, strictly left to right.
//!
//! Per tick and tier (ladder order, `rank` 0 = best):
//! 1. Find the frontier; skip the tier (no draw) if it is fully filled.
//! 2. `speed_factor = 1 + rank * rank_speed_increment`
//! 3. Draw `u` in [0, 1); fill the frontier when `u > base_threshold / speed_factor`.
//!
//! Cheaper tiers therefore fill with higher probability per tick. The random
//! source is injected so ticks are reproducible from a seed.

use abrsim_common::QualityTier;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::buffer_store::BufferStore;

/// Outcome of one fill tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    /// (tier, segment) pairs filled by this tick, in ladder order
    pub newly_filled: Vec<(QualityTier, usize)>,
    /// Number of random draws consumed
    pub draws: usize,
}

impl FillReport {
    pub fn is_empty(&self) -> bool {
        self.newly_filled.is_empty()
    }
}

pub struct FillSimulator<R: Rng = StdRng> {
    rng: R,
    base_threshold: f64,
    rank_speed_increment: f64,
}

impl FillSimulator<StdRng> {
    /// Simulator driven by a seeded `StdRng`
    pub fn seeded(seed: u64, base_threshold: f64, rank_speed_increment: f64) -> Self {
        Self::with_rng(
            StdRng::seed_from_u64(seed),
            base_threshold,
            rank_speed_increment,
        )
    }
}

impl<R: Rng> FillSimulator<R> {
    pub fn with_rng(rng: R, base_threshold: f64, rank_speed_increment: f64) -> Self {
        Self {
            rng,
            base_threshold,
            rank_speed_increment,
        }
    }

    /// Speed multiplier for a ladder rank (1.0 for the best tier)
    pub fn speed_factor(&self, rank: usize) -> f64 {
        1.0 + rank as f64 * self.rank_speed_increment
    }

    /// Draw threshold for a ladder rank; draws strictly above it fill
    pub fn threshold(&self, rank: usize) -> f64 {
        self.base_threshold / self.speed_factor(rank)
    }

    /// Per-tick probability that a tier with pending segments fills one
    pub fn fill_probability(&self, rank: usize) -> f64 {
        (1.0 - self.threshold(rank)).clamp(0.0, 1.0)
    }

    /// Run one fill tick over every tier of `buffers`
    pub fn tick(&mut self, buffers: &mut BufferStore) -> FillReport {
        let mut report = FillReport::default();
        let tiers: Vec<QualityTier> = buffers.tiers().collect();

        for (rank, tier) in tiers.into_iter().enumerate() {
            let Some(frontier) = buffers.frontier(tier) else {
                continue;
            };

            let threshold = self.threshold(rank);
            let sample: f64 = self.rng.gen();
            report.draws += 1;

            if sample > threshold {
                buffers.set_filled(tier, frontier);
                report.newly_filled.push((tier, frontier));
                trace!(%tier, segment = frontier, sample, threshold, "Segment filled");
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::timeline::Timeline;
    use abrsim_common::TierLadder;
    use rand::rngs::mock::StepRng;

    fn store() -> BufferStore {
        BufferStore::new(
            TierLadder::from_values(&[2160, 1080, 480]).unwrap(),
            Timeline::new(12),
        )
    }

    #[test]
    fn test_speed_factor_and_threshold() {
        let sim = FillSimulator::seeded(1, 0.6, 0.2);
        assert_eq!(sim.speed_factor(0), 1.0);
        assert!((sim.speed_factor(2) - 1.4).abs() < 1e-12);
        assert!((sim.threshold(0) - 0.6).abs() < 1e-12);
        assert!((sim.fill_probability(0) - 0.4).abs() < 1e-12);
        // Cheaper tiers fill more often
        assert!(sim.fill_probability(1) > sim.fill_probability(0));
        assert!(sim.fill_probability(5) > sim.fill_probability(1));
    }

    #[test]
    fn test_high_draws_fill_every_tier() {
        // StepRng yielding u64::MAX maps to a float just below 1.0
        let mut sim = FillSimulator::with_rng(StepRng::new(u64::MAX, 0), 0.6, 0.2);
        let mut buffers = store();

        let report = sim.tick(&mut buffers);
        assert_eq!(report.draws, 3);
        assert_eq!(
            report.newly_filled,
            vec![
                (QualityTier::new(2160), 0),
                (QualityTier::new(1080), 0),
                (QualityTier::new(480), 0),
            ]
        );
    }

    #[test]
    fn test_low_draws_fill_nothing() {
        // Zero draws never exceed a positive threshold
        let mut sim = FillSimulator::with_rng(StepRng::new(0, 0), 0.6, 0.2);
        let mut buffers = store();

        for _ in 0..10 {
            assert!(sim.tick(&mut buffers).is_empty());
        }
        assert_eq!(buffers.filled_count(QualityTier::new(480)), 0);
    }

    #[test]
    fn test_complete_tiers_skip_draws() {
        let mut sim = FillSimulator::with_rng(StepRng::new(u64::MAX, 0), 0.6, 0.2);
        let mut buffers = store();
        for segment in 0..12 {
            buffers.set_filled(QualityTier::new(480), segment);
        }

        let report = sim.tick(&mut buffers);
        assert_eq!(report.draws, 2);
        assert!(report
            .newly_filled
            .iter()
            .all(|(tier, _)| *tier != QualityTier::new(480)));
    }

    #[test]
    fn test_fill_advances_left_to_right() {
        let mut sim = FillSimulator::with_rng(StepRng::new(u64::MAX, 0), 0.6, 0.2);
        let mut buffers = store();

        for expected in 0..12 {
            let report = sim.tick(&mut buffers);
            assert!(report.newly_filled.iter().all(|(_, seg)| *seg == expected));
        }
        assert!(buffers.tiers().all(|tier| buffers.is_complete(tier)));

        // Nothing left to fill
        let report = sim.tick(&mut buffers);
        assert_eq!(report.draws, 0);
        assert!(report.is_empty());
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = FillSimulator::seeded(42, 0.6, 0.2);
        let mut b = FillSimulator::seeded(42, 0.6, 0.2);
        let mut buffers_a = store();
        let mut buffers_b = store();

        for _ in 0..30 {
            assert_eq!(a.tick(&mut buffers_a), b.tick(&mut buffers_b));
        }
    }
}
