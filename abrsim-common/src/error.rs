//! Common error types for the simulator crates

use thiserror::Error;

/// Common result type for simulator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the simulator crates
#[derive(Error, Debug)]
pub enum Error {
    /// TOML parse error (wraps toml::de::Error)
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
