//! # imgclassify
//!
//! Batch image classification on top of ONNX Runtime.
//!
//! This crate adapts a trained image-classification network into a batch
//! inference API: given a sequence of images, it returns, for each image,
//! the top-N predicted classes with confidence scores. The network engine
//! owns the weights and the forward pass; this crate owns preprocessing
//! into the network's tensor layout, device-aware batch dispatch, and
//! top-k selection.
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, tensor layout, and the network
//!   engine abstraction
//! * [`processors`] - Image preprocessing and top-k selection
//! * [`predictor`] - The [`Classifier`](predictor::Classifier) trait and
//!   [`ImageClassifier`](predictor::ImageClassifier)
//!
//! ## Example
//!
//! ```rust,no_run
//! use imgclassify::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut classifier = ImageClassifierBuilder::new()
//!     .mean(127.5)
//!     .scale(1.0 / 127.5)
//!     .device(Device::Cpu)
//!     .build("model.onnx")?;
//!
//! let image = image::open("cat.jpg")?;
//! let predictions = classifier.classify(&[image], 5)?;
//! for entry in &predictions[0] {
//!     println!("class {} score {}", entry.class_id, entry.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod predictor;
pub mod processors;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error handling
    pub use crate::core::{ClassifierError, ClassifyResult};

    // Configuration
    pub use crate::core::{BatchStrategy, ClassifierConfig, Device, ResizeFilter};

    // Engine abstraction
    pub use crate::core::{InputGeometry, NetworkEngine, OrtEngine};

    // Results
    pub use crate::core::{ClassScore, Prediction};

    // High-level API
    pub use crate::predictor::{Classifier, ImageClassifier, ImageClassifierBuilder};
}
