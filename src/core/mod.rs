//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components of the pipeline:
//! - Batch tensor layout helpers
//! - Configuration management
//! - Error handling
//! - Network engine integration
//! - Prediction result types
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod batch;
pub mod config;
pub mod errors;
pub mod inference;
pub mod predictions;

pub use batch::{Tensor2D, batch_offset, channel_offset};
pub use config::{
    BatchStrategy, ClassifierConfig, Device, OrtGraphOptimizationLevel, OrtSessionConfig,
    ResizeFilter,
};
pub use errors::{ClassifierError, ClassifyResult};
pub use inference::{InputGeometry, NetworkEngine, OrtEngine};
pub use predictions::{ClassScore, Prediction};

/// Initializes the tracing subscriber for logging.
///
/// Sets up the tracing subscriber with environment filter and formatting
/// layer. Typically called once at the start of an application.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
