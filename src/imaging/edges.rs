//! Edge detection on grayscale images.
//!
//! | Algorithm | Operator |
//! |---|---|
//! | Roberts | 2×2 cross gradient magnitude |
//! | Sobel | 3×3 `[1 2 1]` gradient magnitude |
//! | Prewitt | 3×3 `[1 1 1]` gradient magnitude |
//! | Laplacian | 4-neighbour second derivative |
//! | LoG | `imageproc::filter::gaussian_blur_f32` (sigma) then Laplacian |
//! | Canny | `imageproc::edges::canny` (hysteresis) |
//!
//! Gradient and Laplacian responses are `imageproc::filter::filter3x3`
//! correlations in `f32` (borders clamped), then min-max normalized to the
//! full 0-255 range. Canny output is already binary and is passed through as
//! 0/255.

use super::params::EdgeAlgorithm;
use super::stage::{Result, Stage};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::filter::{filter3x3, gaussian_blur_f32};

type Plane = ImageBuffer<Luma<f32>, Vec<f32>>;

const SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];
const PREWITT_X: [f32; 9] = [-1.0, 0.0, 1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0];
const PREWITT_Y: [f32; 9] = [-1.0, -1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
// The 2x2 Roberts cross anchored at the top-left sample.
const ROBERTS_X: [f32; 9] = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0];
const ROBERTS_Y: [f32; 9] = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0];
const LAPLACIAN: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

fn gradient_magnitude(gray: &GrayImage, kx: &[f32; 9], ky: &[f32; 9]) -> Plane {
    let gx: Plane = filter3x3::<_, f32, f32>(gray, kx);
    let gy: Plane = filter3x3::<_, f32, f32>(gray, ky);
    Plane::from_fn(gray.width(), gray.height(), |x, y| {
        let a = gx.get_pixel(x, y).0[0];
        let b = gy.get_pixel(x, y).0[0];
        Luma([a.hypot(b)])
    })
}

fn laplacian_of_gaussian(gray: &GrayImage, sigma: f32) -> Plane {
    let plane = Plane::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([f32::from(gray.get_pixel(x, y).0[0])])
    });
    // gaussian_blur_f32 panics on a non-positive sigma.
    let smoothed = gaussian_blur_f32(&plane, sigma.max(EdgeAlgorithm::MIN_SIGMA));
    filter3x3::<_, f32, f32>(&smoothed, &LAPLACIAN)
}

/// Responses spanning less than this are treated as flat.
const FLAT_RANGE: f32 = 1e-3;

/// Stretch a response to 0-255. A flat response maps to all zeros.
pub fn normalize_to_u8(plane: &Plane) -> GrayImage {
    let (min, max) = plane
        .pixels()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.0[0]), hi.max(p.0[0]))
        });
    let range = max - min;
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        if range < FLAT_RANGE {
            return Luma([0]);
        }
        let v = (plane.get_pixel(x, y).0[0] - min) / range * 255.0;
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Run `algorithm` over a grayscale image.
pub fn detect_edges(gray: &GrayImage, algorithm: EdgeAlgorithm) -> GrayImage {
    let response = match algorithm {
        EdgeAlgorithm::Canny { low, high } => return imageproc::edges::canny(gray, low, high),
        EdgeAlgorithm::Roberts => gradient_magnitude(gray, &ROBERTS_X, &ROBERTS_Y),
        EdgeAlgorithm::Sobel => gradient_magnitude(gray, &SOBEL_X, &SOBEL_Y),
        EdgeAlgorithm::Prewitt => gradient_magnitude(gray, &PREWITT_X, &PREWITT_Y),
        EdgeAlgorithm::Laplacian => filter3x3::<_, f32, f32>(gray, &LAPLACIAN),
        EdgeAlgorithm::LaplacianOfGaussian { sigma } => laplacian_of_gaussian(gray, sigma),
    };
    normalize_to_u8(&response)
}

pub struct EdgeStage(pub EdgeAlgorithm);

impl Stage for EdgeStage {
    fn tag(&self) -> &str {
        self.0.tag()
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageLuma8(detect_edges(&image.to_luma8(), self.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Left half dark, right half bright.
    fn step(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| Luma([if x < w / 2 { 20 } else { 220 }]))
    }

    fn all_algorithms() -> Vec<EdgeAlgorithm> {
        vec![
            EdgeAlgorithm::Roberts,
            EdgeAlgorithm::Sobel,
            EdgeAlgorithm::Prewitt,
            EdgeAlgorithm::Laplacian,
            EdgeAlgorithm::log(1.0),
            EdgeAlgorithm::canny(50.0, 150.0),
        ]
    }

    #[test]
    fn flat_image_has_no_edges() {
        let flat = GrayImage::from_pixel(16, 16, Luma([90]));
        for alg in all_algorithms() {
            let out = detect_edges(&flat, alg);
            assert!(out.pixels().all(|p| p.0[0] == 0), "{} found edges", alg.name());
        }
    }

    #[test]
    fn output_keeps_source_dimensions() {
        let img = step(23, 17);
        for alg in all_algorithms() {
            assert_eq!(detect_edges(&img, alg).dimensions(), (23, 17));
        }
    }

    #[test]
    fn sobel_peaks_at_step_and_is_zero_far_away() {
        let out = detect_edges(&step(20, 10), EdgeAlgorithm::Sobel);
        assert_eq!(out.get_pixel(10, 5).0[0], 255);
        assert_eq!(out.get_pixel(9, 5).0[0], 255);
        assert_eq!(out.get_pixel(2, 5).0[0], 0);
        assert_eq!(out.get_pixel(17, 5).0[0], 0);
    }

    #[test]
    fn prewitt_and_roberts_respond_at_step() {
        for alg in [EdgeAlgorithm::Prewitt, EdgeAlgorithm::Roberts] {
            let out = detect_edges(&step(20, 10), alg);
            assert_eq!(out.get_pixel(9, 5).0[0], 255, "{}", alg.name());
            assert_eq!(out.get_pixel(2, 5).0[0], 0, "{}", alg.name());
        }
    }

    #[test]
    fn roberts_cross_covers_the_2x2_block_around_a_dot() {
        let mut dot = GrayImage::new(5, 5);
        dot.put_pixel(2, 2, Luma([100]));
        let out = detect_edges(&dot, EdgeAlgorithm::Roberts);
        let lit: Vec<(u32, u32)> = out
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] == 255)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(lit, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
        assert_eq!(out.pixels().filter(|p| p.0[0] != 0).count(), 4);
    }

    #[test]
    fn laplacian_normalizes_signed_response() {
        let out = detect_edges(&step(20, 10), EdgeAlgorithm::Laplacian);
        // Dark side of the step is the most positive response, bright side the most negative.
        assert_eq!(out.get_pixel(9, 5).0[0], 255);
        assert_eq!(out.get_pixel(10, 5).0[0], 0);
        let far = out.get_pixel(2, 5).0[0];
        assert!(far > 0 && far < 255);
    }

    #[test]
    fn canny_output_is_binary_and_finds_step() {
        let out = detect_edges(&step(40, 40), EdgeAlgorithm::canny(20.0, 60.0));
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(out.pixels().any(|p| p.0[0] == 255));
    }

    #[test]
    fn normalize_flat_plane_is_zero() {
        let plane = Plane::from_pixel(3, 3, Luma([7.5]));
        assert!(normalize_to_u8(&plane).pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn edge_stage_outputs_grayscale() {
        let img = DynamicImage::ImageLuma8(step(12, 12));
        let out = EdgeStage(EdgeAlgorithm::Sobel).apply(img).unwrap();
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
    }
}
