//! Tone transforms: binarization and Gaussian blur.
//!
//! Binarize always runs before blur, so the blur softens the binarized
//! edges rather than the other way round.

use super::params::{BlurRadius, Threshold};
use super::stage::{Result, Stage};
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{ThresholdType, threshold};

/// Map each luma sample to 255 when strictly above `level`, else 0.
///
/// Samples are integers, so `p > level` is `p > floor(level)` and a
/// fractional level goes through the same `u8` threshold.
pub fn threshold_luma(gray: &GrayImage, level: f32) -> GrayImage {
    let cut = if level.is_nan() { 0.0 } else { level.floor() };
    if cut >= 255.0 {
        return GrayImage::new(gray.width(), gray.height());
    }
    threshold(gray, cut.max(0.0) as u8, ThresholdType::Binary)
}

/// Two-level image from the luma of `image`, expanded back to RGB.
pub fn binarize(image: &DynamicImage, threshold: Threshold) -> DynamicImage {
    let gray = threshold_luma(&image.to_luma8(), threshold.level());
    DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(gray).to_rgb8())
}

pub fn blur(image: &DynamicImage, radius: BlurRadius) -> DynamicImage {
    image.blur(radius.value())
}

pub struct BinarizeStage(pub Threshold);

impl Stage for BinarizeStage {
    fn tag(&self) -> &str {
        "binary"
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        Ok(binarize(&image, self.0))
    }
}

pub struct BlurStage(pub BlurRadius);

impl Stage for BlurStage {
    fn tag(&self) -> &str {
        "blur"
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        Ok(blur(&image, self.0))
    }
}
