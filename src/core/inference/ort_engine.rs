//! ONNX Runtime backend for the network engine.

use std::path::{Path, PathBuf};

use ndarray::{ArrayView2, ArrayView4};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use tracing::debug;

use super::{InputGeometry, NetworkEngine, require_single_io, resolve_num_classes};
use crate::core::batch::{Tensor2D, batch_offset};
use crate::core::config::{Device, OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::{ClassifierError, SimpleError};

/// Network engine backed by an ONNX Runtime session.
///
/// The session is created once against a model file that carries both the
/// network definition and its trained weights. Input geometry and class
/// count are resolved from the session's tensor metadata at load time; the
/// staged input tensor is owned here and reused across calls.
pub struct OrtEngine {
    session: Session,
    input_name: String,
    output_name: String,
    model_name: String,
    model_path: PathBuf,
    geometry: InputGeometry,
    num_classes: usize,
    input: Vec<f32>,
    batch_size: usize,
}

impl std::fmt::Debug for OrtEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtEngine")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .field("geometry", &self.geometry)
            .field("num_classes", &self.num_classes)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl OrtEngine {
    /// Loads a model file and resolves its input/output metadata.
    ///
    /// The device selects the execution providers registered on the
    /// session; it is an explicit parameter, not a process-wide mode.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ConfigError`] if the session cannot be
    /// created, the network does not expose exactly one input and one
    /// output tensor, the input is not rank-4 with 1 or 3 channels and
    /// static spatial dims, or the output class count is not static.
    pub fn load(
        model_path: impl AsRef<Path>,
        device: &Device,
        ort_session: Option<&OrtSessionConfig>,
    ) -> Result<Self, ClassifierError> {
        let path = model_path.as_ref();

        let mut builder = Session::builder()?.with_log_level(LogLevel::Error)?;
        if let Some(cfg) = ort_session {
            if let Some(intra) = cfg.intra_threads {
                builder = builder.with_intra_threads(intra)?;
            }
            if let Some(inter) = cfg.inter_threads {
                builder = builder.with_inter_threads(inter)?;
            }
            if let Some(level) = cfg.optimization_level {
                use ort::session::builder::GraphOptimizationLevel as GOL;
                let mapped = match level {
                    OrtGraphOptimizationLevel::DisableAll => GOL::Disable,
                    OrtGraphOptimizationLevel::Level1 => GOL::Level1,
                    OrtGraphOptimizationLevel::Level2 => GOL::Level2,
                    OrtGraphOptimizationLevel::Level3 => GOL::Level3,
                };
                builder = builder.with_optimization_level(mapped)?;
            }
        }
        builder = builder.with_execution_providers(Self::execution_providers(device)?)?;

        let session = builder.commit_from_file(path).map_err(|e| {
            ClassifierError::config_error(format!(
                "failed to create ONNX session for '{}': {e}",
                path.display()
            ))
        })?;

        require_single_io(session.inputs.len(), session.outputs.len())?;

        let input = &session.inputs[0];
        let input_name = input.name.clone();
        let input_shape: Vec<i64> = match &input.input_type {
            ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
            other => {
                return Err(ClassifierError::config_error(format!(
                    "network input '{input_name}' is not a tensor: {other:?}"
                )));
            }
        };
        let geometry = InputGeometry::from_input_shape(&input_shape)?;

        let output = &session.outputs[0];
        let output_name = output.name.clone();
        let output_shape: Vec<i64> = match &output.output_type {
            ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
            other => {
                return Err(ClassifierError::config_error(format!(
                    "network output '{output_name}' is not a tensor: {other:?}"
                )));
            }
        };
        let num_classes = resolve_num_classes(&output_shape)?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        debug!(
            model = %model_name,
            input = %input_name,
            output = %output_name,
            channels = geometry.channels,
            width = geometry.width,
            height = geometry.height,
            classes = num_classes,
            "loaded ONNX session"
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            model_name,
            model_path: path.to_path_buf(),
            geometry,
            num_classes,
            input: Vec::new(),
            batch_size: 0,
        })
    }

    /// Returns the model path this engine was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name (file stem of the model path).
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn execution_providers(
        device: &Device,
    ) -> Result<Vec<ort::execution_providers::ExecutionProviderDispatch>, ClassifierError> {
        match device {
            Device::Cpu => Ok(vec![
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ]),
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                let mut provider = ort::execution_providers::CUDAExecutionProvider::default();
                if let Some(id) = device_id {
                    provider = provider.with_device_id(*id);
                }
                Ok(vec![provider.build()])
            }
            #[cfg(not(feature = "cuda"))]
            Device::Cuda { .. } => Err(ClassifierError::config_error(
                "CUDA device requested but the cuda feature is not enabled",
            )),
        }
    }
}

impl NetworkEngine for OrtEngine {
    fn geometry(&self) -> InputGeometry {
        self.geometry
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn reshape_input(&mut self, batch_size: usize) -> Result<(), ClassifierError> {
        self.batch_size = batch_size;
        self.input.clear();
        self.input.resize(batch_size * self.geometry.slot_len(), 0.0);
        Ok(())
    }

    fn input_slot(&mut self, slot: usize) -> Result<&mut [f32], ClassifierError> {
        if slot >= self.batch_size {
            return Err(ClassifierError::invalid_input(format!(
                "staging slot {slot} is outside the current batch of {}",
                self.batch_size
            )));
        }
        let offset = batch_offset(slot, &self.geometry);
        Ok(&mut self.input[offset..offset + self.geometry.slot_len()])
    }

    fn forward(&mut self) -> Result<Tensor2D, ClassifierError> {
        let shape = (
            self.batch_size,
            self.geometry.channels,
            self.geometry.height as usize,
            self.geometry.width as usize,
        );
        let view = ArrayView4::from_shape(shape, &self.input).map_err(ClassifierError::Tensor)?;
        let input_tensor = TensorRef::from_array_view(view)?;

        debug!(model = %self.model_name, batch = self.batch_size, "forward pass");

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(ClassifierError::inference)?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(ClassifierError::inference)?;

        let expected_len = self.batch_size * self.num_classes;
        if output_data.len() != expected_len {
            return Err(ClassifierError::inference(SimpleError::new(format!(
                "model '{}': output data size mismatch, expected {expected_len} elements \
                 for batch {} with {} classes, got {} (output shape {:?})",
                self.model_name,
                self.batch_size,
                self.num_classes,
                output_data.len(),
                output_shape
            ))));
        }

        let scores = ArrayView2::from_shape((self.batch_size, self.num_classes), output_data)
            .map_err(ClassifierError::Tensor)?;
        Ok(scores.to_owned())
    }
}
