//! High-level classifier API.

mod classifier;

pub use classifier::{Classifier, ImageClassifier, ImageClassifierBuilder};
