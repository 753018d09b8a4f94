//! Conversions between image tensors and `image` buffers.

use image::{Rgb, RgbImage};

use crate::error::{Result, TrainError};
use crate::math::Tensor;

/// Maps a model pixel value to a byte. Normalized input lives in [-1, 1],
/// otherwise in [0, 1]; anything outside is clamped.
pub fn to_byte(value: f64, normalized_input: bool) -> u8 {
    let unit = if normalized_input { (value + 1.0) * 0.5 } else { value };
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Renders item `index` of a `[batch, height, width, channels]` tensor with
/// 1 (grayscale) or 3 (RGB) channels.
pub fn tensor_to_rgb(images: &Tensor, index: usize, normalized_input: bool) -> Result<RgbImage> {
    let (height, width, channels) = match images.shape() {
        &[_, h, w, c] if c == 1 || c == 3 => (h, w, c),
        other => {
            return Err(TrainError::InvalidArgument(format!(
                "expected [batch, height, width, 1|3] images, got {other:?}"
            )))
        }
    };
    let item = images.batch_item(index)?;
    let px = item.data();
    let mut out = RgbImage::new(width as u32, height as u32);
    for y in 0..height {
        for x in 0..width {
            let base = (y * width + x) * channels;
            let rgb = if channels == 3 {
                [px[base], px[base + 1], px[base + 2]]
            } else {
                [px[base]; 3]
            };
            out.put_pixel(
                x as u32,
                y as u32,
                Rgb(rgb.map(|v| to_byte(v, normalized_input))),
            );
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_mapping_respects_input_range() {
        assert_eq!(to_byte(-1.0, true), 0);
        assert_eq!(to_byte(1.0, true), 255);
        assert_eq!(to_byte(0.0, false), 0);
        assert_eq!(to_byte(1.0, false), 255);
        assert_eq!(to_byte(7.0, false), 255);
    }

    #[test]
    fn channels_are_interleaved_per_pixel() {
        // One row, two pixels: red then blue, second batch item ignored.
        let mut data = vec![1.0, -1.0, -1.0, -1.0, -1.0, 1.0];
        data.extend([0.0; 6]);
        let t = Tensor::from_vec(&[2, 1, 2, 3], data).unwrap();
        let img = tensor_to_rgb(&t, 0, true).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn grayscale_is_expanded() {
        let t = Tensor::from_vec(&[1, 1, 1, 1], vec![1.0]).unwrap();
        let img = tensor_to_rgb(&t, 0, false).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn flat_tensors_cannot_be_rendered() {
        assert!(tensor_to_rgb(&Tensor::zeros(&[1, 12]), 0, true).is_err());
    }
}
