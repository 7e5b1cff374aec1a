//! Error types.
//!
//! The scheduling engine itself is total; errors only arise when building a
//! configuration or when converting untrusted input into engine types.

use std::path::PathBuf;

/// A quality rating outside the 0-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quality rating {0} is outside 0-5")]
pub struct QualityOutOfRange(pub u8);

/// Rejected scheduler configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("min_daily_reviews ({min}) exceeds max_daily_reviews ({max})")]
    InvertedDailyBounds { min: usize, max: usize },

    #[error("max_daily_reviews must be at least 1")]
    ZeroMaxDaily,

    #[error("target_daily_reviews ({target}) is outside [{min}, {max}]")]
    TargetOutOfBounds { target: usize, min: usize, max: usize },

    #[error("{field} must be at least 1")]
    ZeroRunLimit { field: &'static str },

    #[error("{field} must be within [0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("priority weight {field} must be a finite non-negative number, got {value}")]
    InvalidWeight { field: &'static str, value: f64 },

    #[error("priority base weight must be positive, got {0}")]
    NonPositiveBase(f64),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scheduler config: {0}")]
    Parse(#[from] toml::de::Error),
}
