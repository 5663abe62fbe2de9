//! Mask compositing.
//!
//! The mask decides, pixel by pixel, between a foreground (flat black or a
//! second image) and a white background. It is re-binarized at a fixed
//! threshold first, so anti-aliased mask edges still select hard.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::contrast::{ThresholdType, threshold};

/// Mask samples strictly above this are "on".
pub const MASK_THRESHOLD: u8 = 128;

/// Foreground drawn where the mask is on.
#[derive(Debug, Clone, Copy)]
pub enum Foreground<'a> {
    BlackFill,
    /// Resized to the mask's dimensions before compositing.
    Image(&'a RgbImage),
}

/// Binarize a grayscale mask at [`MASK_THRESHOLD`].
pub fn binarize_mask(mask: &GrayImage) -> GrayImage {
    threshold(mask, MASK_THRESHOLD, ThresholdType::Binary)
}

/// Select foreground where the mask is on and white elsewhere.
///
/// The canvas takes the mask's dimensions.
pub fn composite(mask: &DynamicImage, foreground: Foreground<'_>) -> RgbImage {
    let binary = binarize_mask(&mask.to_luma8());
    let (w, h) = binary.dimensions();

    let resized;
    let source = match foreground {
        Foreground::BlackFill => None,
        Foreground::Image(img) if img.dimensions() == (w, h) => Some(img),
        Foreground::Image(img) => {
            resized = imageops::resize(img, w, h, FilterType::Lanczos3);
            Some(&resized)
        }
    };

    RgbImage::from_fn(w, h, |x, y| {
        if binary.get_pixel(x, y).0[0] == 0 {
            Rgb([255, 255, 255])
        } else {
            match source {
                Some(img) => *img.get_pixel(x, y),
                None => Rgb([0, 0, 0]),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_rgb;
    use image::Luma;

    fn mask_of(w: u32, h: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([value])))
    }

    #[test]
    fn full_mask_with_black_fill_is_black() {
        let out = composite(&mask_of(10, 6, 255), Foreground::BlackFill);
        assert_eq!(out, RgbImage::from_pixel(10, 6, Rgb([0, 0, 0])));
    }

    #[test]
    fn empty_mask_is_white_background() {
        let img = gradient_rgb(10, 6);
        let out = composite(&mask_of(10, 6, 0), Foreground::Image(&img));
        assert_eq!(out, RgbImage::from_pixel(10, 6, Rgb([255, 255, 255])));
    }

    #[test]
    fn mask_at_threshold_is_off() {
        let out = composite(&mask_of(2, 2, MASK_THRESHOLD), Foreground::BlackFill);
        assert!(out.pixels().all(|p| *p == Rgb([255, 255, 255])));
        let out = composite(&mask_of(2, 2, MASK_THRESHOLD + 1), Foreground::BlackFill);
        assert!(out.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn foreground_image_is_resized_to_mask() {
        let img = RgbImage::from_pixel(40, 10, Rgb([10, 200, 30]));
        let out = composite(&mask_of(8, 8, 255), Foreground::Image(&img));
        assert_eq!(out.dimensions(), (8, 8));
        assert!(out.pixels().all(|p| *p == Rgb([10, 200, 30])));
    }

    #[test]
    fn half_mask_selects_per_pixel() {
        let mask = DynamicImage::ImageLuma8(GrayImage::from_fn(4, 1, |x, _| {
            Luma([if x < 2 { 255 } else { 0 }])
        }));
        let img = gradient_rgb(4, 1);
        let out = composite(&mask, Foreground::Image(&img));
        assert_eq!(out.get_pixel(0, 0), img.get_pixel(0, 0));
        assert_eq!(out.get_pixel(1, 0), img.get_pixel(1, 0));
        assert_eq!(out.get_pixel(3, 0), &Rgb([255, 255, 255]));
    }
}
