//! Prediction result types.

use std::sync::Arc;

/// One ranked class for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    /// Class identifier (index into the network's score vector).
    pub class_id: usize,
    /// Raw confidence score as emitted by the network.
    pub score: f32,
    /// Human-readable class name, if a label mapping was configured.
    pub label: Option<Arc<str>>,
}

/// Ranked classes for one image: exactly the requested top-N entries,
/// sorted by descending score. Ties resolve to the lower class index.
///
/// The prediction list returned by a classify call is aligned by index with
/// the input images and never reordered.
pub type Prediction = Vec<ClassScore>;
