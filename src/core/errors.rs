//! Error types for the classification pipeline.
//!
//! This module defines the error taxonomy used throughout the crate:
//! construction-time configuration errors, per-call argument errors,
//! per-image shape errors, and engine failures.

use thiserror::Error;

/// Errors produced by the classification pipeline.
///
/// Construction failures (`ConfigError`) are fatal to the construction call
/// and not recoverable without reconfiguration. Per-call failures never
/// return partial results: a call either yields the full aligned prediction
/// list or fails entirely, and all argument validation happens before any
/// engine invocation.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The loaded network or the supplied configuration is unusable.
    ///
    /// Raised once, at construction: the network does not expose exactly one
    /// input and one output tensor, the input geometry is unsupported, or a
    /// configuration value is invalid.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration problem.
        message: String,
    },

    /// A per-call argument is out of range, e.g. top-N outside `[1, C]`.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid argument.
        message: String,
    },

    /// An image's channel count does not match the network input geometry.
    #[error(
        "input shape mismatch: {context}: expected {expected_channels} channel(s), got {actual_channels}"
    )]
    InputShape {
        /// Channel count required by the network input geometry.
        expected_channels: usize,
        /// Channel count of the offending image.
        actual_channels: usize,
        /// Where the mismatch was detected.
        context: String,
    },

    /// A staging target is smaller than the data to be written.
    #[error("buffer too small: expected at least {expected} elements, got {actual}")]
    BufferTooSmall {
        /// The required minimum element count.
        expected: usize,
        /// The actual element count.
        actual: usize,
    },

    /// The engine's forward pass failed.
    ///
    /// Surfaced as-is: the pipeline neither retries nor degrades.
    #[error("inference")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),
}

impl ClassifierError {
    /// Creates a `ConfigError` from a message.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates an `InvalidInput` error from a message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an `InputShape` error for a channel-count mismatch.
    pub fn input_shape(expected_channels: usize, actual_channels: usize, context: &str) -> Self {
        Self::InputShape {
            expected_channels,
            actual_channels,
            context: context.to_string(),
        }
    }

    /// Creates an `Inference` error from an engine failure.
    pub fn inference(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Inference(Box::new(error))
    }
}

/// A message-only error used as the source of wrapped errors when no
/// underlying error value exists.
#[derive(Debug)]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new SimpleError from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

/// Convenient result alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifierError>;
