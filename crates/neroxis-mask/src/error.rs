//! Error types for mask operations and pipeline execution.

use thiserror::Error;

use neroxis_map::SymmetryError;

use crate::brush::BrushError;
use crate::png::PngError;

/// Errors raised by mask operations.
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("mask '{mask}' has symmetry incompatible with mask '{other}'")]
    IncompatibleSymmetry { mask: String, other: String },

    #[error("coordinate ({x}, {y}) is out of bounds for size {size}")]
    OutOfBounds { x: i64, y: i64, size: usize },

    #[error("mask '{mask}' still has pipelined work; {op} requires a final mask")]
    Pipelined { mask: String, op: &'static str },

    #[error("{op} is not supported for {kind} masks")]
    Unsupported {
        op: &'static str,
        kind: &'static str,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("dependency snapshot of mask '{0}' was not captured")]
    MissingSnapshot(String),

    #[error("brush error: {0}")]
    Brush(#[from] BrushError),

    #[error("PNG error: {0}")]
    Png(#[from] PngError),

    #[error("symmetry error: {0}")]
    Symmetry(#[from] SymmetryError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MaskError {
    pub(crate) fn unsupported(op: &'static str, kind: &'static str) -> Self {
        MaskError::Unsupported { op, kind }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MaskError::InvalidParameter(message.into())
    }

    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            MaskError::SizeMismatch { .. } => "MASK_001",
            MaskError::IncompatibleSymmetry { .. } => "MASK_002",
            MaskError::OutOfBounds { .. } => "MASK_003",
            MaskError::Pipelined { .. } => "MASK_004",
            MaskError::Unsupported { .. } => "MASK_005",
            MaskError::InvalidParameter(_) => "MASK_006",
            MaskError::MissingSnapshot(_) => "MASK_007",
            MaskError::Brush(_) => "MASK_008",
            MaskError::Png(_) => "MASK_009",
            MaskError::Symmetry(_) => "MASK_010",
            MaskError::Pipeline(_) => "MASK_011",
            MaskError::Io(_) => "MASK_012",
        }
    }
}

/// Errors raised by the pipeline scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("task {task} '{label}' on mask '{mask}' failed: {message}")]
    TaskFailed {
        task: usize,
        label: &'static str,
        mask: String,
        message: String,
    },

    #[error("task {task} '{label}' on mask '{mask}' panicked: {message}")]
    TaskPanicked {
        task: usize,
        label: &'static str,
        mask: String,
        message: String,
    },

    #[error("pipeline has pending work but was not started")]
    NotStarted,

    #[error("pipeline is already started")]
    AlreadyStarted,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

impl PipelineError {
    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::TaskFailed { .. } => "PIPELINE_001",
            PipelineError::TaskPanicked { .. } => "PIPELINE_002",
            PipelineError::NotStarted => "PIPELINE_003",
            PipelineError::AlreadyStarted => "PIPELINE_004",
            PipelineError::Spawn(_) => "PIPELINE_005",
        }
    }
}
