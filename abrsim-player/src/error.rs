//! Error types for abrsim-player
//!
//! Only contract violations by the caller surface as errors. Buffering is a
//! normal playback state and never an error.

use abrsim_common::QualityTier;
use thiserror::Error;

/// Main error type for abrsim-player
#[derive(Error, Debug)]
pub enum Error {
    /// Engine configuration rejected during validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors bubbled up from abrsim-common (config file loading, ladder validation)
    #[error(transparent)]
    Common(#[from] abrsim_common::Error),

    /// Tier is not on the engine's ladder
    #[error("Unknown quality tier: {0}")]
    UnknownTier(QualityTier),

    /// Segment index past the end of the timeline
    #[error("Segment {segment} out of range (timeline has {segment_count} segments)")]
    SegmentOutOfRange { segment: usize, segment_count: usize },

    /// Scrub target is not a finite number
    #[error("Invalid scrub fraction: {0}")]
    InvalidFraction(f64),

    /// Command issued after dispose()
    #[error("Engine {0} has been disposed")]
    Disposed(uuid::Uuid),
}

/// Convenience Result type using abrsim-player Error
pub type Result<T> = std::result::Result<T, Error>;
