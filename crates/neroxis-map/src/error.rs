//! Error types for symmetry and map parameter validation.

use thiserror::Error;

use crate::symmetry::Symmetry;

/// Errors raised while building symmetry values or settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymmetryError {
    #[error("point symmetry must have between 2 and 16 points, got {0}")]
    InvalidPointCount(u8),

    #[error("unknown symmetry: '{0}'")]
    Unknown(String),

    #[error(
        "{smaller_axis} symmetry {smaller} ({smaller_points} points) does not divide \
         {larger_axis} symmetry {larger} ({larger_points} points)"
    )]
    Indivisible {
        smaller_axis: &'static str,
        smaller: Symmetry,
        smaller_points: usize,
        larger_axis: &'static str,
        larger: Symmetry,
        larger_points: usize,
    },
}

/// Errors raised while loading or validating map parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("symmetry error: {0}")]
    Symmetry(#[from] SymmetryError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
