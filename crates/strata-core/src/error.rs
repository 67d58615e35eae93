//! Configuration errors.
//!
//! Layout itself never fails at runtime: missing measurements and empty rows
//! degrade to zero-height contributions. Only configuration is validated.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("range size must be finite and greater than zero, got {0}")]
    InvalidRangeSize(f32),

    #[error("gap must be finite and non-negative, got {0}")]
    InvalidGap(f32),

    #[error("column count must be at least 1")]
    ZeroColumns,

    #[error("batch limit must be at least 1")]
    ZeroLimit,
}

/// Checks a bucket width.
pub fn check_range_size(range_size: f32) -> Result<(), ConfigError> {
    if range_size.is_finite() && range_size > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRangeSize(range_size))
    }
}

/// Checks an inter-item gap.
pub fn check_gap(gap: f32) -> Result<(), ConfigError> {
    if gap.is_finite() && gap >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidGap(gap))
    }
}
