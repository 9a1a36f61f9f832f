//! Image preprocessing into the network's input layout.
//!
//! A [`Preprocessor`] converts one image into the network's expected tensor
//! layout: resize to the fixed input geometry, convert pixel values to
//! floating point as `value' = value * scale - mean * scale`, and split the
//! interleaved channel data into planar buffers in the network's channel
//! order. It can write straight into a staging slot of the engine's input
//! tensor, avoiding an intermediate copy.
//!
//! No color-space conversion is performed: the caller supplies images in
//! the channel order the network was trained with. The channel *count* is
//! validated against the geometry; a mismatch is rejected rather than
//! silently converted.

use image::DynamicImage;

use crate::core::batch::channel_offset;
use crate::core::config::ResizeFilter;
use crate::core::errors::ClassifierError;
use crate::core::inference::InputGeometry;

/// Preprocesses single images into planar, normalized channel data.
#[derive(Debug)]
pub struct Preprocessor {
    geometry: InputGeometry,
    /// Multiplicative term (the scale factor).
    alpha: f32,
    /// Additive term (`-mean * scale`).
    beta: f32,
    filter: ResizeFilter,
}

impl Preprocessor {
    /// Creates a preprocessor for the given geometry.
    ///
    /// The resize filter is deterministic: the same image always produces
    /// the same staged data.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ConfigError`] if `scale` is not finite
    /// and positive, or `mean` is not finite.
    pub fn new(
        geometry: InputGeometry,
        mean: f32,
        scale: f32,
        filter: ResizeFilter,
    ) -> Result<Self, ClassifierError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ClassifierError::config_error(format!(
                "scale must be finite and greater than 0, got {scale}"
            )));
        }
        if !mean.is_finite() {
            return Err(ClassifierError::config_error(format!(
                "mean must be finite, got {mean}"
            )));
        }
        Ok(Self {
            geometry,
            alpha: scale,
            beta: -mean * scale,
            filter,
        })
    }

    /// The input geometry this preprocessor targets.
    pub fn geometry(&self) -> InputGeometry {
        self.geometry
    }

    /// Preprocesses one image into a freshly allocated planar buffer of
    /// `slot_len` elements.
    pub fn apply(&self, image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        let mut buf = vec![0.0f32; self.geometry.slot_len()];
        self.apply_into(image, &mut buf)?;
        Ok(buf)
    }

    /// Preprocesses one image directly into a staging slot.
    ///
    /// `dst` is expected to be a slot view of the engine's input tensor;
    /// all `slot_len` elements are overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InputShape`] if the image's channel count
    /// does not match the network geometry, and
    /// [`ClassifierError::BufferTooSmall`] if `dst` is shorter than one
    /// slot.
    pub fn apply_into(
        &self,
        image: &DynamicImage,
        dst: &mut [f32],
    ) -> Result<(), ClassifierError> {
        let actual_channels = image.color().channel_count() as usize;
        if actual_channels != self.geometry.channels {
            return Err(ClassifierError::input_shape(
                self.geometry.channels,
                actual_channels,
                "image does not match network input geometry",
            ));
        }
        if dst.len() < self.geometry.slot_len() {
            return Err(ClassifierError::BufferTooSmall {
                expected: self.geometry.slot_len(),
                actual: dst.len(),
            });
        }

        let width = self.geometry.width;
        let height = self.geometry.height;
        let row = width as usize;
        let filter = self.filter.to_filter_type();

        if self.geometry.channels == 3 {
            let resized = image::imageops::resize(&image.to_rgb8(), width, height, filter);
            for (x, y, pixel) in resized.enumerate_pixels() {
                let base = y as usize * row + x as usize;
                for c in 0..3 {
                    dst[channel_offset(c, &self.geometry) + base] =
                        pixel[c] as f32 * self.alpha + self.beta;
                }
            }
        } else {
            let resized = image::imageops::resize(&image.to_luma8(), width, height, filter);
            for (x, y, pixel) in resized.enumerate_pixels() {
                dst[y as usize * row + x as usize] = pixel[0] as f32 * self.alpha + self.beta;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgb, RgbImage};

    fn rgb_geometry() -> InputGeometry {
        InputGeometry {
            channels: 3,
            width: 2,
            height: 2,
        }
    }

    fn test_image() -> DynamicImage {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        img.put_pixel(1, 0, Rgb([40, 50, 60]));
        img.put_pixel(0, 1, Rgb([70, 80, 90]));
        img.put_pixel(1, 1, Rgb([100, 110, 120]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_planar_layout_and_affine_conversion() {
        // mean 10, scale 2: value' = v * 2 - 20.
        let pre = Preprocessor::new(rgb_geometry(), 10.0, 2.0, ResizeFilter::Nearest).unwrap();
        let out = pre.apply(&test_image()).unwrap();

        assert_eq!(out.len(), 12);
        // Red plane, row-major.
        assert_eq!(&out[0..4], &[0.0, 60.0, 120.0, 180.0]);
        // Green plane.
        assert_eq!(&out[4..8], &[20.0, 80.0, 140.0, 200.0]);
        // Blue plane.
        assert_eq!(&out[8..12], &[40.0, 100.0, 160.0, 220.0]);
    }

    #[test]
    fn test_identity_defaults() {
        let pre = Preprocessor::new(rgb_geometry(), 0.0, 1.0, ResizeFilter::Nearest).unwrap();
        let out = pre.apply(&test_image()).unwrap();
        assert_eq!(out[0], 10.0);
        assert_eq!(out[4], 20.0);
        assert_eq!(out[8], 30.0);
    }

    #[test]
    fn test_resizes_to_geometry() {
        let pre = Preprocessor::new(rgb_geometry(), 0.0, 1.0, ResizeFilter::Nearest).unwrap();
        let big = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([50, 60, 70])));
        let out = pre.apply(&big).unwrap();
        assert_eq!(out.len(), 12);
        assert!(out[0..4].iter().all(|&v| v == 50.0));
        assert!(out[4..8].iter().all(|&v| v == 60.0));
    }

    #[test]
    fn test_grayscale_path() {
        let geometry = InputGeometry {
            channels: 1,
            width: 2,
            height: 2,
        };
        let pre = Preprocessor::new(geometry, 0.0, 0.5, ResizeFilter::Nearest).unwrap();
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(0, 0, image::Luma([8]));
        img.put_pixel(1, 0, image::Luma([16]));
        img.put_pixel(0, 1, image::Luma([24]));
        img.put_pixel(1, 1, image::Luma([32]));
        let out = pre.apply(&DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(out, vec![4.0, 8.0, 12.0, 16.0]);
    }

    #[test]
    fn test_channel_mismatch_is_rejected() {
        let pre = Preprocessor::new(rgb_geometry(), 0.0, 1.0, ResizeFilter::Nearest).unwrap();
        let gray = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        let err = pre.apply(&gray).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::InputShape {
                expected_channels: 3,
                actual_channels: 1,
                ..
            }
        ));

        let gray_net = InputGeometry {
            channels: 1,
            width: 2,
            height: 2,
        };
        let pre = Preprocessor::new(gray_net, 0.0, 1.0, ResizeFilter::Nearest).unwrap();
        assert!(pre.apply(&test_image()).is_err());

        // An alpha channel is a mismatch too, not silently dropped.
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(2, 2));
        let pre = Preprocessor::new(rgb_geometry(), 0.0, 1.0, ResizeFilter::Nearest).unwrap();
        assert!(matches!(
            pre.apply(&rgba).unwrap_err(),
            ClassifierError::InputShape {
                actual_channels: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_apply_into_rejects_short_slot() {
        let pre = Preprocessor::new(rgb_geometry(), 0.0, 1.0, ResizeFilter::Nearest).unwrap();
        let mut dst = vec![0.0f32; 5];
        assert!(matches!(
            pre.apply_into(&test_image(), &mut dst).unwrap_err(),
            ClassifierError::BufferTooSmall { expected: 12, .. }
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Preprocessor::new(rgb_geometry(), 0.0, 0.0, ResizeFilter::Nearest).is_err());
        assert!(Preprocessor::new(rgb_geometry(), f32::NAN, 1.0, ResizeFilter::Nearest).is_err());
    }
}
