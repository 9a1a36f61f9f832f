//! Batch image classifier.
//!
//! [`ImageClassifier`] orchestrates the full pipeline: preprocess each
//! image into the engine's staged input tensor, run the forward pass under
//! the configured [`BatchStrategy`], and select the top-N classes per score
//! vector. The classifier is generic over [`NetworkEngine`], with
//! [`OrtEngine`] as the provided backend.

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::core::config::{BatchStrategy, ClassifierConfig};
use crate::core::errors::{ClassifierError, SimpleError};
use crate::core::inference::{InputGeometry, NetworkEngine, OrtEngine};
use crate::core::predictions::Prediction;
use crate::processors::{Preprocessor, Topk};

/// A classifier that ranks the top-N classes for each image in a batch.
///
/// Implementations take `&mut self`: the engine's staged input tensor is a
/// single mutable buffer reused across calls, so an instance must not be
/// invoked concurrently. Callers that share one instance across threads
/// must serialize access; one instance per worker avoids the lock.
pub trait Classifier {
    /// Classifies a batch of images.
    ///
    /// Returns one prediction per image, aligned by index with `images`,
    /// each holding exactly `top_n` classes sorted by descending score.
    /// The call blocks until the whole batch has been processed and either
    /// fully succeeds or fails without partial results.
    fn classify(
        &mut self,
        images: &[DynamicImage],
        top_n: usize,
    ) -> Result<Vec<Prediction>, ClassifierError>;
}

/// Batch image classifier over a network engine.
#[derive(Debug)]
pub struct ImageClassifier<E = OrtEngine> {
    /// Network engine owning the weights and the staged input tensor.
    engine: E,
    /// Preprocessor resolved against the engine's input geometry.
    preprocessor: Preprocessor,
    /// Dispatch strategy, fixed at construction.
    strategy: BatchStrategy,
    /// Top-k selector applied to the raw score vectors.
    select: Topk,
}

impl ImageClassifier<OrtEngine> {
    /// Builds a classifier by loading an ONNX model file.
    ///
    /// The model file carries both the network definition and its trained
    /// weights. The device in `config` fixes the execution providers and
    /// the dispatch strategy for the lifetime of the instance.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ConfigError`] if the configuration is
    /// invalid or the loaded network fails validation (see
    /// [`OrtEngine::load`]).
    pub fn from_config(
        config: ClassifierConfig,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, ClassifierError> {
        config.validate()?;
        let engine = OrtEngine::load(model_path, &config.device, config.ort_session.as_ref())?;
        Self::with_engine(engine, config)
    }
}

impl<E: NetworkEngine> ImageClassifier<E> {
    /// Builds a classifier around an already constructed engine.
    ///
    /// This is the seam for alternate [`NetworkEngine`] implementations.
    pub fn with_engine(engine: E, config: ClassifierConfig) -> Result<Self, ClassifierError> {
        config.validate()?;
        let preprocessor = Preprocessor::new(
            engine.geometry(),
            config.mean,
            config.scale,
            config.resize_filter,
        )?;
        let strategy = config.effective_strategy();
        let select = match config.class_labels {
            Some(labels) => Topk::from_class_names(labels),
            None => Topk::without_class_names(),
        };
        Ok(Self {
            engine,
            preprocessor,
            strategy,
            select,
        })
    }

    /// The dispatch strategy in effect.
    pub fn strategy(&self) -> BatchStrategy {
        self.strategy
    }

    /// The network's input geometry.
    pub fn geometry(&self) -> InputGeometry {
        self.engine.geometry()
    }

    /// The number of classes the network scores.
    pub fn num_classes(&self) -> usize {
        self.engine.num_classes()
    }

    /// Shared access to the underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs the forward passes for a batch and returns the raw score
    /// vector of each image, in input order.
    ///
    /// Empty input yields empty output without touching the engine. Both
    /// strategies produce identical score vectors for the same image
    /// content; the strategy only decides how work reaches the engine.
    pub fn predict(&mut self, images: &[DynamicImage]) -> Result<Vec<Vec<f32>>, ClassifierError> {
        if images.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            images = images.len(),
            strategy = ?self.strategy,
            "dispatching forward pass"
        );
        match self.strategy {
            BatchStrategy::WholeBatch => self.predict_whole_batch(images),
            BatchStrategy::Sequential => self.predict_sequential(images),
        }
    }

    /// Stages the full batch and issues one forward pass.
    fn predict_whole_batch(
        &mut self,
        images: &[DynamicImage],
    ) -> Result<Vec<Vec<f32>>, ClassifierError> {
        self.engine.reshape_input(images.len())?;
        for (slot, image) in images.iter().enumerate() {
            self.preprocessor
                .apply_into(image, self.engine.input_slot(slot)?)?;
        }
        let scores = self.engine.forward()?;
        Ok(scores.outer_iter().map(|row| row.to_vec()).collect())
    }

    /// Stages and runs one image at a time.
    fn predict_sequential(
        &mut self,
        images: &[DynamicImage],
    ) -> Result<Vec<Vec<f32>>, ClassifierError> {
        let mut rows = Vec::with_capacity(images.len());
        for image in images {
            self.engine.reshape_input(1)?;
            self.preprocessor
                .apply_into(image, self.engine.input_slot(0)?)?;
            let scores = self.engine.forward()?;
            let row = scores
                .outer_iter()
                .next()
                .map(|row| row.to_vec())
                .ok_or_else(|| {
                    ClassifierError::inference(SimpleError::new("engine returned an empty output"))
                })?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Checks every image against the input geometry before any staging or
    /// engine work, so a bad image in the middle of a batch cannot leave
    /// earlier forward passes behind.
    fn validate_images(&self, images: &[DynamicImage]) -> Result<(), ClassifierError> {
        let expected = self.engine.geometry().channels;
        for (index, image) in images.iter().enumerate() {
            let actual = image.color().channel_count() as usize;
            if actual != expected {
                return Err(ClassifierError::input_shape(
                    expected,
                    actual,
                    &format!("image {index}"),
                ));
            }
        }
        Ok(())
    }
}

impl<E: NetworkEngine> Classifier for ImageClassifier<E> {
    fn classify(
        &mut self,
        images: &[DynamicImage],
        top_n: usize,
    ) -> Result<Vec<Prediction>, ClassifierError> {
        let num_classes = self.engine.num_classes();
        if top_n < 1 || top_n > num_classes {
            return Err(ClassifierError::invalid_input(format!(
                "top-N must be within [1, {num_classes}], got {top_n}"
            )));
        }
        self.validate_images(images)?;
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let scores = self.predict(images)?;
        self.select.process(&scores, top_n)
    }
}

/// Builder for [`ImageClassifier`] backed by [`OrtEngine`].
#[derive(Debug, Default)]
pub struct ImageClassifierBuilder {
    config: ClassifierConfig,
}

impl ImageClassifierBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    /// Sets the scalar mean offset.
    pub fn mean(mut self, mean: f32) -> Self {
        self.config.mean = mean;
        self
    }

    /// Sets the scalar scaling factor.
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    /// Sets the compute device.
    pub fn device(mut self, device: crate::core::config::Device) -> Self {
        self.config.device = device;
        self
    }

    /// Overrides the dispatch strategy derived from the device.
    pub fn strategy(mut self, strategy: BatchStrategy) -> Self {
        self.config.strategy = Some(strategy);
        self
    }

    /// Sets the resize interpolation filter.
    pub fn resize_filter(mut self, filter: crate::core::config::ResizeFilter) -> Self {
        self.config.resize_filter = filter;
        self
    }

    /// Sets class labels, index = class ID.
    pub fn class_labels(mut self, labels: Vec<String>) -> Self {
        self.config.class_labels = Some(labels);
        self
    }

    /// Sets ONNX Runtime session options.
    pub fn ort_session(mut self, config: crate::core::config::OrtSessionConfig) -> Self {
        self.config.ort_session = Some(config);
        self
    }

    /// Builds the classifier against an ONNX model file.
    pub fn build(
        self,
        model_path: impl AsRef<Path>,
    ) -> Result<ImageClassifier<OrtEngine>, ClassifierError> {
        ImageClassifier::from_config(self.config, model_path)
    }
}
