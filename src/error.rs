//! Error types for the denoising filter.
//!
//! All failures are configuration-time failures: invalid dimensions or
//! parameters, undersized buffers, or the inability to start worker threads.
//! Steady-state frame processing never fails.

use thiserror::Error;

/// Error type for denoising operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenoiseError {
    /// Frame dimensions too small for the filter.
    #[error("invalid frame dimensions: {width}x{height} (minimum 4x4 required)")]
    InvalidDimensions { width: u32, height: u32 },

    /// A filter parameter is outside its permitted range.
    #[error("invalid parameter {name}={value} (expected {min}..={max})")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A plane slice is too small for the configured dimensions and stride.
    #[error("plane buffer too small: need {needed} bytes, have {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// A row stride is smaller than the frame width.
    #[error("row stride {stride} is smaller than frame width {width}")]
    StrideTooSmall { stride: usize, width: u32 },

    /// A worker thread could not be spawned at construction.
    #[error("failed to spawn worker thread: {message}")]
    WorkerSpawn { message: String },
}

/// Result type for denoising operations.
pub type Result<T> = std::result::Result<T, DenoiseError>;

impl DenoiseError {
    /// Create an invalid dimensions error.
    pub fn invalid_dimensions(width: u32, height: u32) -> Self {
        Self::InvalidDimensions { width, height }
    }

    /// Create an invalid parameter error.
    pub fn parameter(name: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self::InvalidParameter {
            name,
            value,
            min,
            max,
        }
    }

    /// Create a buffer-too-small error.
    pub fn buffer_too_small(needed: usize, actual: usize) -> Self {
        Self::BufferTooSmall { needed, actual }
    }

    /// Create a stride-too-small error.
    pub fn stride_too_small(stride: usize, width: u32) -> Self {
        Self::StrideTooSmall { stride, width }
    }

    /// Create a worker spawn error.
    pub fn worker_spawn(message: impl Into<String>) -> Self {
        Self::WorkerSpawn {
            message: message.into(),
        }
    }
}
