//! Image and score processors.
//!
//! Contains the preprocessing step that turns images into the network's
//! planar input layout, and the top-k selector applied to raw score
//! vectors.

pub mod normalization;
pub mod topk;

pub use normalization::Preprocessor;
pub use topk::Topk;
