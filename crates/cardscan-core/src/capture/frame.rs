//! Still frames frozen from a live video stream.

use std::time::Instant;

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::OcrError;

/// A single still image captured from a video stream.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw RGBA pixel data, row-major.
    data: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// When the frame was frozen.
    captured_at: Instant,
}

impl Frame {
    /// Create a frame from RGBA pixel data.
    ///
    /// Returns `None` if the buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if data.len() != expected {
            return None;
        }

        Some(Self {
            data,
            width,
            height,
            captured_at: Instant::now(),
        })
    }

    /// Freeze a decoded image into a frame at its native resolution.
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.to_rgba8().into_raw(),
            width,
            height,
            captured_at: Instant::now(),
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get frame dimensions as (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA pixel buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Instant the frame was captured.
    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Convert into a `DynamicImage` for OCR backends.
    pub fn to_image(&self) -> Result<DynamicImage, OcrError> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| {
                OcrError::InvalidImage(format!(
                    "buffer of {} bytes does not fit {}x{}",
                    self.data.len(),
                    self.width,
                    self.height
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_rejects_wrong_length() {
        assert!(Frame::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Frame::from_rgba(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn test_image_conversion_keeps_dimensions() {
        let image = DynamicImage::new_rgb8(40, 30);
        let frame = Frame::from_image(&image);

        assert_eq!(frame.dimensions(), (40, 30));
        assert_eq!(frame.pixels().len(), 40 * 30 * 4);

        let back = frame.to_image().unwrap();
        assert_eq!(back.dimensions(), (40, 30));
    }
}
