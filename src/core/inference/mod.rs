//! Network engine abstraction.
//!
//! The network engine owns the model weights, the staged input tensor, and
//! the forward pass. The pipeline talks to it through [`NetworkEngine`]:
//! it resolves the input geometry once at construction, writes preprocessed
//! pixel data into slot views of the staged tensor, and reads back one
//! score vector per staged image. [`OrtEngine`] is the provided ONNX
//! Runtime backend; alternate engines implement the same trait.

mod ort_engine;

pub use ort_engine::OrtEngine;

use crate::core::ClassifierError;
use crate::core::batch::Tensor2D;

/// Input tensor geometry of the loaded network.
///
/// Resolved once at construction from the engine's input tensor metadata
/// and fixed for the lifetime of a classifier instance. Every staged image
/// is resized to this geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputGeometry {
    /// Number of channel planes (1 or 3).
    pub channels: usize,
    /// Plane width in pixels.
    pub width: u32,
    /// Plane height in pixels.
    pub height: u32,
}

impl InputGeometry {
    /// Resolves the geometry from a network input tensor shape.
    ///
    /// Expects rank-4 `[N, C, H, W]` metadata. The batch dimension may be
    /// dynamic; channels, height, and width must be static, with C ∈ {1, 3}.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ConfigError`] for any other shape.
    pub fn from_input_shape(shape: &[i64]) -> Result<Self, ClassifierError> {
        if shape.len() != 4 {
            return Err(ClassifierError::config_error(format!(
                "network input must be rank-4 [N, C, H, W], got rank {} with shape {:?}",
                shape.len(),
                shape
            )));
        }
        let channels = shape[1];
        if channels != 1 && channels != 3 {
            return Err(ClassifierError::config_error(format!(
                "network input must have 1 or 3 channels, got {channels}"
            )));
        }
        let (height, width) = (shape[2], shape[3]);
        if height <= 0 || width <= 0 {
            return Err(ClassifierError::config_error(format!(
                "network input height and width must be static and positive, got {height}x{width}"
            )));
        }
        Ok(Self {
            channels: channels as usize,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Element count of one channel plane.
    pub fn plane_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Element count of one fully staged image (all channel planes).
    pub fn slot_len(&self) -> usize {
        self.channels * self.plane_len()
    }
}

/// Checks that the network exposes exactly one input and one output tensor.
///
/// # Errors
///
/// Returns [`ClassifierError::ConfigError`] otherwise.
pub fn require_single_io(num_inputs: usize, num_outputs: usize) -> Result<(), ClassifierError> {
    if num_inputs != 1 {
        return Err(ClassifierError::config_error(format!(
            "network must expose exactly one input tensor, got {num_inputs}"
        )));
    }
    if num_outputs != 1 {
        return Err(ClassifierError::config_error(format!(
            "network must expose exactly one output tensor, got {num_outputs}"
        )));
    }
    Ok(())
}

/// Resolves the class count from a network output tensor shape.
///
/// Accepts rank-2 `[N, C]`, or rank-4 `[N, C, 1, 1]` as produced by
/// converted classification nets that keep the trailing spatial dims. The
/// class dimension must be static: per-call top-N validation happens before
/// any forward pass, so C has to be known up front.
///
/// # Errors
///
/// Returns [`ClassifierError::ConfigError`] for any other shape.
pub fn resolve_num_classes(shape: &[i64]) -> Result<usize, ClassifierError> {
    let classes = match shape {
        [_, c] => *c,
        [_, c, 1, 1] => *c,
        _ => {
            return Err(ClassifierError::config_error(format!(
                "network output must be [N, C] or [N, C, 1, 1], got shape {shape:?}"
            )));
        }
    };
    if classes <= 0 {
        return Err(ClassifierError::config_error(format!(
            "network output class count must be static and positive, got {classes}"
        )));
    }
    Ok(classes as usize)
}

/// Interface to a loaded network.
///
/// The engine owns the staged input tensor as a single mutable buffer
/// reused across calls; all methods therefore take `&mut self` and an
/// engine instance must not be invoked concurrently.
pub trait NetworkEngine {
    /// Geometry of the single input tensor.
    fn geometry(&self) -> InputGeometry;

    /// Number of classes in the single output tensor.
    fn num_classes(&self) -> usize;

    /// Resizes the staged input tensor to `batch_size` slots.
    ///
    /// The whole-batch strategy reshapes once to the full batch size; the
    /// sequential strategy reshapes to 1 before each image.
    fn reshape_input(&mut self, batch_size: usize) -> Result<(), ClassifierError>;

    /// Mutable view of one staging slot, `slot_len` elements at
    /// `batch_offset(slot)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InvalidInput`] if `slot` is outside the
    /// current batch size.
    fn input_slot(&mut self, slot: usize) -> Result<&mut [f32], ClassifierError>;

    /// Runs one forward pass over the staged batch.
    ///
    /// Returns the raw score tensor, shape `[batch, classes]`, row `i`
    /// aligned with staging slot `i`. Scores may be logits or
    /// probabilities; the pipeline is agnostic.
    fn forward(&mut self) -> Result<Tensor2D, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_from_valid_shape() {
        let g = InputGeometry::from_input_shape(&[-1, 3, 224, 224]).unwrap();
        assert_eq!(g.channels, 3);
        assert_eq!(g.width, 224);
        assert_eq!(g.height, 224);
        assert_eq!(g.plane_len(), 224 * 224);
        assert_eq!(g.slot_len(), 3 * 224 * 224);
    }

    #[test]
    fn test_geometry_accepts_grayscale() {
        let g = InputGeometry::from_input_shape(&[1, 1, 28, 28]).unwrap();
        assert_eq!(g.channels, 1);
        assert_eq!(g.slot_len(), 28 * 28);
    }

    #[test]
    fn test_geometry_rejects_wrong_rank() {
        assert!(InputGeometry::from_input_shape(&[1, 3, 224]).is_err());
        assert!(InputGeometry::from_input_shape(&[1, 3, 224, 224, 1]).is_err());
    }

    #[test]
    fn test_geometry_rejects_unsupported_channels() {
        let err = InputGeometry::from_input_shape(&[1, 2, 32, 32]).unwrap_err();
        assert!(matches!(err, ClassifierError::ConfigError { .. }));
        assert!(err.to_string().contains("1 or 3 channels"));
    }

    #[test]
    fn test_geometry_rejects_dynamic_spatial_dims() {
        assert!(InputGeometry::from_input_shape(&[-1, 3, -1, 224]).is_err());
        assert!(InputGeometry::from_input_shape(&[-1, 3, 224, 0]).is_err());
    }

    #[test]
    fn test_require_single_io() {
        assert!(require_single_io(1, 1).is_ok());
        // A network exposing two input tensors is rejected outright.
        let err = require_single_io(2, 1).unwrap_err();
        assert!(matches!(err, ClassifierError::ConfigError { .. }));
        assert!(require_single_io(1, 3).is_err());
        assert!(require_single_io(0, 1).is_err());
    }

    #[test]
    fn test_resolve_num_classes() {
        assert_eq!(resolve_num_classes(&[-1, 1000]).unwrap(), 1000);
        assert_eq!(resolve_num_classes(&[1, 5, 1, 1]).unwrap(), 5);
        assert!(resolve_num_classes(&[1, 5, 2, 2]).is_err());
        assert!(resolve_num_classes(&[-1, -1]).is_err());
        assert!(resolve_num_classes(&[10]).is_err());
    }
}
