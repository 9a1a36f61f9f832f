//! Configuration types for the classifier.
//!
//! The compute device, batching strategy, preprocessing constants, and ONNX
//! Runtime session options are all fixed here at construction time. Nothing
//! in this module is consulted per call.

use serde::{Deserialize, Serialize};

/// Compute device the network engine runs on.
///
/// Selected once at construction as an explicit configuration value. The
/// device determines which execution providers the session registers and,
/// unless overridden, which [`BatchStrategy`] the classifier uses for its
/// lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Device {
    /// CPU execution (always available).
    #[default]
    Cpu,
    /// NVIDIA CUDA execution. Requires the `cuda` cargo feature.
    Cuda {
        /// CUDA device ID (defaults to 0).
        device_id: Option<i32>,
    },
}

impl Device {
    /// Whether the device supports batched parallel execution.
    pub fn is_accelerated(&self) -> bool {
        !matches!(self, Device::Cpu)
    }
}

/// Forward-pass dispatch strategy.
///
/// The two strategies are semantically equivalent: for the same image
/// content they must produce identical score vectors. Batching is a
/// performance choice only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStrategy {
    /// Stage the entire batch and issue a single forward pass.
    ///
    /// Amortizes per-invocation overhead on devices with parallel
    /// throughput, at the cost of staging memory proportional to the batch.
    WholeBatch,
    /// Stage and run one image at a time.
    ///
    /// Bounds peak staging memory to a single image and isolates each
    /// engine invocation, at the cost of one forward pass per image.
    Sequential,
}

impl BatchStrategy {
    /// Default strategy for a device: whole-batch on accelerators,
    /// sequential on CPU.
    pub fn for_device(device: &Device) -> Self {
        if device.is_accelerated() {
            BatchStrategy::WholeBatch
        } else {
            BatchStrategy::Sequential
        }
    }
}

/// Interpolation filter used when resizing images to the network geometry.
///
/// Mirrors `image::imageops::FilterType` so configurations stay
/// serializable. All filters are deterministic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeFilter {
    /// Nearest neighbor.
    Nearest,
    /// Linear (triangle) filter.
    Triangle,
    /// Catmull-Rom cubic filter.
    CatmullRom,
    /// Gaussian filter.
    Gaussian,
    /// Lanczos filter with window 3.
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    /// Maps to the corresponding `image` crate filter.
    pub fn to_filter_type(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

impl Default for OrtGraphOptimizationLevel {
    fn default() -> Self {
        Self::Level1
    }
}

/// Configuration for the ONNX Runtime session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes.
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes.
    pub inter_threads: Option<usize>,
    /// Graph optimization level.
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }
}

/// Configuration for an [`ImageClassifier`](crate::predictor::ImageClassifier).
///
/// The preprocessing conversion applied to every pixel is
/// `value' = value * scale - mean * scale`, matching networks trained with a
/// scalar mean offset and scaling factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Scalar mean offset subtracted from pixel values (default 0.0).
    pub mean: f32,
    /// Scalar scaling factor applied to pixel values (default 1.0).
    pub scale: f32,
    /// Compute device for the engine.
    pub device: Device,
    /// Explicit dispatch strategy. `None` derives it from the device.
    pub strategy: Option<BatchStrategy>,
    /// Resize interpolation filter.
    pub resize_filter: ResizeFilter,
    /// Optional class labels, index = class ID.
    pub class_labels: Option<Vec<String>>,
    /// Optional ONNX Runtime session options.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mean: 0.0,
            scale: 1.0,
            device: Device::Cpu,
            strategy: None,
            resize_filter: ResizeFilter::default(),
            class_labels: None,
            ort_session: None,
        }
    }
}

impl ClassifierConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scalar mean offset.
    pub fn with_mean(mut self, mean: f32) -> Self {
        self.mean = mean;
        self
    }

    /// Sets the scalar scaling factor.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the compute device.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Overrides the dispatch strategy derived from the device.
    pub fn with_strategy(mut self, strategy: BatchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Sets the resize interpolation filter.
    pub fn with_resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Sets class labels, index = class ID.
    pub fn with_class_labels(mut self, labels: Vec<String>) -> Self {
        self.class_labels = Some(labels);
        self
    }

    /// Sets ONNX Runtime session options.
    pub fn with_ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }

    /// The dispatch strategy in effect: the explicit override if present,
    /// otherwise the device default.
    pub fn effective_strategy(&self) -> BatchStrategy {
        self.strategy
            .unwrap_or_else(|| BatchStrategy::for_device(&self.device))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ConfigError`] if `scale` is not a finite
    /// positive number or `mean` is not finite.
    pub fn validate(&self) -> Result<(), crate::core::ClassifierError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(crate::core::ClassifierError::config_error(format!(
                "scale must be finite and greater than 0, got {}",
                self.scale
            )));
        }
        if !self.mean.is_finite() {
            return Err(crate::core::ClassifierError::config_error(format!(
                "mean must be finite, got {}",
                self.mean
            )));
        }
        Ok(())
    }
}
