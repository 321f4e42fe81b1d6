//! Frame preprocessing before recognition.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use tracing::debug;

use crate::capture::Frame;
use crate::error::OcrError;

/// Convert a frame to black and white using an Otsu threshold.
///
/// Pixels brighter than the threshold become white, the rest black.
pub fn binarize(frame: &Frame) -> Result<Frame, OcrError> {
    let gray = frame.to_image()?.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(OcrError::InvalidImage("cannot binarize an empty frame".to_string()));
    }
    let level = otsu_level(&gray);

    debug!("Binarizing {}x{} frame at level {}", gray.width(), gray.height(), level);

    let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([255])
        } else {
            Luma([0])
        }
    });

    Ok(Frame::from_image(&DynamicImage::ImageLuma8(binary)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([dark]) } else { Luma([light]) })
    }

    #[test]
    fn test_binarize_frame() {
        let frame = Frame::from_image(&DynamicImage::ImageLuma8(two_tone(40, 220)));
        let binary = binarize(&frame).unwrap().to_image().unwrap().to_luma8();

        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 9)[0], 255);
        assert_eq!(binary.dimensions(), (10, 10));
    }

    #[test]
    fn test_binarize_output_is_two_level() {
        let gray = GrayImage::from_fn(16, 16, |x, y| Luma([(x * 16 + y) as u8]));
        let frame = Frame::from_image(&DynamicImage::ImageLuma8(gray));
        let binary = binarize(&frame).unwrap().to_image().unwrap().to_luma8();

        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(15, 15)[0], 255);
    }
}
