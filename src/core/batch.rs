//! Batch tensor layout helpers.
//!
//! The engine's staged input tensor is a planar, contiguous buffer laid out
//! as `[batch][channel][height][width]`, row-major within each channel
//! plane. This module names the offset arithmetic into that buffer, so no
//! caller ever walks the buffer with ad-hoc index math.

use crate::core::inference::InputGeometry;

/// 2D tensor type, shape `[batch, classes]`.
pub type Tensor2D = ndarray::Array2<f32>;

/// Element offset of batch slot `slot` within the staged input tensor.
pub fn batch_offset(slot: usize, geometry: &InputGeometry) -> usize {
    slot * geometry.slot_len()
}

/// Element offset of channel plane `channel` within one batch slot.
pub fn channel_offset(channel: usize, geometry: &InputGeometry) -> usize {
    channel * geometry.plane_len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> InputGeometry {
        InputGeometry {
            channels: 3,
            width: 4,
            height: 2,
        }
    }

    #[test]
    fn test_batch_offset() {
        let g = geometry();
        assert_eq!(batch_offset(0, &g), 0);
        assert_eq!(batch_offset(1, &g), 24);
        assert_eq!(batch_offset(5, &g), 120);
    }

    #[test]
    fn test_channel_offset() {
        let g = geometry();
        assert_eq!(channel_offset(0, &g), 0);
        assert_eq!(channel_offset(1, &g), 8);
        assert_eq!(channel_offset(2, &g), 16);
    }

    #[test]
    fn test_offsets_compose() {
        let g = geometry();
        // Slot 2, channel 1 begins right after slot 2's first plane.
        assert_eq!(batch_offset(2, &g) + channel_offset(1, &g), 56);
    }
}
