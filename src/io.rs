//! Conversion from `image` crate types to model input.
//!
//! Available when the `image-io` feature is enabled.

use crate::pipeline::ImageSize;
use crate::predictor::InputBuffer;
use crate::util::{SsdOcrError, SsdOcrResult};
use image::imageops::FilterType;
use std::path::Path;

/// Resizes `img` to `width x height` RGB8 for the model.
pub fn input_from_image(
    img: &image::DynamicImage,
    width: usize,
    height: usize,
) -> SsdOcrResult<InputBuffer> {
    if img.width() == 0 || img.height() == 0 {
        return Err(SsdOcrError::ImageIo {
            reason: "image has no pixels".to_string(),
        });
    }
    let target_w = u32::try_from(width).map_err(|_| SsdOcrError::InvalidConfig {
        reason: "input width exceeds u32",
    })?;
    let target_h = u32::try_from(height).map_err(|_| SsdOcrError::InvalidConfig {
        reason: "input height exceeds u32",
    })?;
    let resized = image::imageops::resize(&img.to_rgb8(), target_w, target_h, FilterType::Triangle);
    InputBuffer::new(resized.into_raw(), width, height)
}

impl InputBuffer {
    /// Builds a model input of `width x height` from a decoded image.
    pub fn from_image(
        img: &image::DynamicImage,
        width: usize,
        height: usize,
    ) -> SsdOcrResult<Self> {
        input_from_image(img, width, height)
    }
}

/// Returns the pixel size of `img` for denormalization.
pub fn image_size_of(img: &image::DynamicImage) -> ImageSize {
    ImageSize::new(img.width() as f32, img.height() as f32)
}

/// Loads an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> SsdOcrResult<image::DynamicImage> {
    image::open(path).map_err(|err| SsdOcrError::ImageIo {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{image_size_of, input_from_image, load_image};
    use crate::predictor::InputBuffer;
    use crate::util::SsdOcrError;
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn resizes_to_model_input() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([10, 20, 30])));
        let input = input_from_image(&img, 12, 6).unwrap();
        assert_eq!((input.width(), input.height()), (12, 6));
        assert_eq!(&input.data()[..3], &[10, 20, 30]);
        assert_eq!(image_size_of(&img).width, 40.0);
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(input_from_image(&img, 4, 4).is_err());
    }

    #[test]
    fn from_image_matches_free_function() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 100, 50])));
        let a = InputBuffer::from_image(&img, 4, 4).unwrap();
        let b = input_from_image(&img, 4, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_file_reports_image_io() {
        let err = load_image("does/not/exist.png").unwrap_err();
        assert!(matches!(err, SsdOcrError::ImageIo { .. }));
    }
}
