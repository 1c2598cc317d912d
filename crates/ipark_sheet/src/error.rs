//! Sheet error types

use thiserror::Error;

/// Configuration rejected at construction time
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Viewport height is zero, negative or not finite
    #[error("Viewport height must be positive, got {0}")]
    InvalidViewportHeight(f32),

    /// A snap fraction lies outside the open interval (0, 1)
    #[error("{name} must be strictly between 0 and 1, got {value}")]
    FractionOutOfRange { name: &'static str, value: f32 },

    /// The full snap point would not be more open than the half snap point
    #[error("full_fraction ({full}) must be smaller than half_fraction ({half})")]
    FractionOrder { full: f32, half: f32 },

    /// Fling threshold is zero, negative or not finite
    #[error("Fling velocity threshold must be positive, got {0}")]
    InvalidFlingThreshold(f32),

    /// Drag slop or toggle tolerance is negative or not finite
    #[error("{name} must be a non-negative distance, got {value}")]
    InvalidDistance { name: &'static str, value: f32 },

    /// Snap set lacks `hidden` or has no open rest position
    #[error("Snap points must include `hidden` and at least one open position, got {0:?}")]
    InvalidSnapSet(Vec<String>),
}

/// Result type for sheet configuration
pub type Result<T> = std::result::Result<T, ConfigError>;
