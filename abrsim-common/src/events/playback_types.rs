//! Playback-related type definitions
//!
//! Supporting types for playback state and stream status classification.

use serde::{Deserialize, Serialize};

/// Playback state enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    #[default]
    Stopped,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// The state reached by a play/pause toggle
    pub fn toggled(self) -> Self {
        match self {
            PlaybackState::Playing => PlaybackState::Stopped,
            PlaybackState::Stopped => PlaybackState::Playing,
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Classification of what is being rendered for the current segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    /// Preferred tier is filled at the current segment
    Preferred,
    /// Another tier is rendered because the preferred one is not filled yet
    Fallback,
    /// No tier has the current segment filled
    Buffering,
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamStatus::Preferred => write!(f, "preferred"),
            StreamStatus::Fallback => write!(f, "fallback"),
            StreamStatus::Buffering => write!(f, "buffering"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(PlaybackState::Stopped.toggled(), PlaybackState::Playing);
        assert_eq!(PlaybackState::Playing.toggled(), PlaybackState::Stopped);
        assert!(PlaybackState::Playing.is_playing());
        assert!(!PlaybackState::default().is_playing());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&StreamStatus::Buffering).unwrap();
        assert_eq!(json, "\"buffering\"");
        assert_eq!(StreamStatus::Fallback.to_string(), "fallback");
    }
}
