//! Quality tiers and the tier ladder
//!
//! A [`QualityTier`] is a unit-less rank value (e.g. 1080); higher is better.
//! A [`TierLadder`] is the fixed, strictly descending list of tiers a simulation
//! works with. Position in the ladder is the tier's *rank* (0 = best), which
//! drives both the selection scan order and the simulated fill speed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A discrete video quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityTier(pub u32);

impl QualityTier {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.0)
    }
}

impl From<u32> for QualityTier {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Default ladder used when no configuration overrides it
pub const DEFAULT_TIERS: [u32; 6] = [4320, 2160, 1440, 1080, 720, 480];

/// Ordered list of quality tiers, best first
///
/// Immutable after construction. Construction rejects empty, duplicate and
/// non-descending lists so that rank lookups are unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierLadder {
    tiers: Vec<QualityTier>,
}

impl TierLadder {
    /// Build a ladder from tiers given best-to-worst
    pub fn new(tiers: Vec<QualityTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(Error::InvalidInput(
                "tier ladder must contain at least one tier".to_string(),
            ));
        }

        for pair in tiers.windows(2) {
            if pair[0] <= pair[1] {
                return Err(Error::InvalidInput(format!(
                    "tier ladder must be strictly descending, found {} before {}",
                    pair[0], pair[1]
                )));
            }
        }

        Ok(Self { tiers })
    }

    /// Build a ladder from raw rank values
    pub fn from_values(values: &[u32]) -> Result<Self> {
        Self::new(values.iter().copied().map(QualityTier::new).collect())
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Best tier of the ladder (rank 0)
    pub fn best(&self) -> QualityTier {
        self.tiers[0]
    }

    /// Worst tier of the ladder
    pub fn worst(&self) -> QualityTier {
        self.tiers[self.tiers.len() - 1]
    }

    /// Rank of `tier` (0 = best), or None if the tier is not on this ladder
    pub fn rank(&self, tier: QualityTier) -> Option<usize> {
        self.tiers.iter().position(|t| *t == tier)
    }

    pub fn contains(&self, tier: QualityTier) -> bool {
        self.rank(tier).is_some()
    }

    /// Tiers in ladder order (best to worst)
    pub fn iter(&self) -> impl Iterator<Item = QualityTier> + '_ {
        self.tiers.iter().copied()
    }

    pub fn as_slice(&self) -> &[QualityTier] {
        &self.tiers
    }
}

impl Default for TierLadder {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.iter().copied().map(QualityTier::new).collect(),
        }
    }
}
