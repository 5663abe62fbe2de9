//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. Callers include
//! the CLI and programmatic batch drivers, neither of which enforces slider
//! ranges, so every constructor validates or clamps its input here.
//!
//! ## Types
//!
//! - [`Dimension`]: a pixel size, clamped to `1..=8192`.
//! - [`Threshold`]: normalized binarization threshold, clamped to `[0, 1]`.
//! - [`BlurRadius`]: Gaussian sigma, clamped to `[0.1, 10]`.
//! - [`KernelSize`]: odd morphology kernel side, `1..=31`, rejected otherwise.
//! - [`AspectParams`], [`CustomSizeParams`], [`CropParams`]: geometry.
//! - [`ToneParams`]: optional binarize and blur stages.
//! - [`EdgeAlgorithm`]: edge operator with only the parameters it uses.
//! - [`MorphologyParams`]: the four optional morphology stages.

use super::stage::{ImagingError, Result};

pub const MIN_DIMENSION: u32 = 1;
pub const MAX_DIMENSION: u32 = 8192;

/// A target pixel size (1-8192). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension(u32);

impl Dimension {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(MIN_DIMENSION, MAX_DIMENSION))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self(512)
    }
}

/// Binarization threshold as a fraction of the sample range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(f32);

impl Threshold {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Threshold scaled to 8-bit samples.
    pub fn level(self) -> f32 {
        self.0 * 255.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Gaussian blur radius (sigma).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurRadius(f32);

impl BlurRadius {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for BlurRadius {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Side length of a square morphology kernel. Always odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSize(u8);

impl KernelSize {
    pub const MAX: u32 = 31;

    pub fn new(value: u32) -> Result<Self> {
        if value == 0 || value % 2 == 0 || value > Self::MAX {
            return Err(ImagingError::InvalidParameter(format!(
                "kernel size must be odd and between 1 and {}, got {value}",
                Self::MAX
            )));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Chebyshev radius of the kernel (`3` → `1`).
    pub fn radius(self) -> u8 {
        self.0 / 2
    }
}

impl Default for KernelSize {
    fn default() -> Self {
        Self(3)
    }
}

/// Aspect rescale: fit the long side into `target_size - 2 * margin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectParams {
    pub target_size: Dimension,
    pub margin: u32,
    pub square: bool,
}

impl AspectParams {
    /// Rejects margins that leave no room for content.
    pub fn new(target_size: u32, margin: u32, square: bool) -> Result<Self> {
        let target_size = Dimension::new(target_size);
        if margin.saturating_mul(2) >= target_size.value() {
            return Err(ImagingError::InvalidParameter(format!(
                "margin {margin} leaves no room inside target size {}",
                target_size.value()
            )));
        }
        Ok(Self {
            target_size,
            margin,
            square,
        })
    }

    pub fn mode_tag(&self) -> &'static str {
        if self.square { "aspect_square" } else { "aspect" }
    }
}

/// Custom resize to exact dimensions, aspect ratio ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomSizeParams {
    pub width: Dimension,
    pub height: Dimension,
}

impl CustomSizeParams {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Dimension::new(width),
            height: Dimension::new(height),
        }
    }
}

/// Pixels to remove from each edge before fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropMargins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Crop, then fit the long side to `target_size` with its own margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropParams {
    pub margins: CropMargins,
    pub target_size: Dimension,
    pub square: bool,
    pub margin: u32,
}

impl CropParams {
    pub fn new(margins: CropMargins, target_size: u32, square: bool, margin: u32) -> Self {
        Self {
            margins,
            target_size: Dimension::new(target_size),
            square,
            margin: margin.min(MAX_DIMENSION),
        }
    }

    pub fn mode_tag(&self) -> &'static str {
        if self.square { "crop_square" } else { "crop" }
    }
}

/// Optional tone stages, always applied binarize first, then blur.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToneParams {
    pub binary: Option<Threshold>,
    pub blur: Option<BlurRadius>,
}

/// Edge operator. Each variant carries exactly the parameters it uses.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum EdgeAlgorithm {
    Roberts,
    #[default]
    Sobel,
    Prewitt,
    Laplacian,
    /// Laplacian of Gaussian: smooth with `sigma`, then Laplacian.
    LaplacianOfGaussian { sigma: f32 },
    /// Hysteresis detector with low/high gradient thresholds (0-255).
    Canny { low: f32, high: f32 },
}

impl EdgeAlgorithm {
    pub const MIN_SIGMA: f32 = 0.1;
    pub const MAX_SIGMA: f32 = 5.0;

    pub fn log(sigma: f32) -> Self {
        let sigma = if sigma.is_nan() { 1.0 } else { sigma };
        Self::LaplacianOfGaussian {
            sigma: sigma.clamp(Self::MIN_SIGMA, Self::MAX_SIGMA),
        }
    }

    /// Thresholds are clamped to 0-255 and swapped when given inverted.
    pub fn canny(low: f32, high: f32) -> Self {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) };
        let (low, high) = (clamp(low), clamp(high));
        if low <= high {
            Self::Canny { low, high }
        } else {
            Self::Canny {
                low: high,
                high: low,
            }
        }
    }

    /// Display name, as shown to the user.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Roberts => "Roberts",
            Self::Sobel => "Sobel",
            Self::Prewitt => "Prewitt",
            Self::Laplacian => "Laplacian",
            Self::LaplacianOfGaussian { .. } => "LoG",
            Self::Canny { .. } => "Canny",
        }
    }

    /// Lowercase name used as the mode tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Roberts => "roberts",
            Self::Sobel => "sobel",
            Self::Prewitt => "prewitt",
            Self::Laplacian => "laplacian",
            Self::LaplacianOfGaussian { .. } => "log",
            Self::Canny { .. } => "canny",
        }
    }
}

/// The four morphology stages. `None` disables a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MorphologyParams {
    pub erosion: Option<KernelSize>,
    pub dilation: Option<KernelSize>,
    pub opening: Option<KernelSize>,
    pub closing: Option<KernelSize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_clamps_to_valid_range() {
        assert_eq!(Dimension::new(0).value(), 1);
        assert_eq!(Dimension::new(512).value(), 512);
        assert_eq!(Dimension::new(100_000).value(), MAX_DIMENSION);
    }

    #[test]
    fn threshold_clamps_and_scales() {
        assert_eq!(Threshold::new(-1.0).value(), 0.0);
        assert_eq!(Threshold::new(2.0).value(), 1.0);
        assert_eq!(Threshold::new(0.5).level(), 127.5);
        assert_eq!(Threshold::new(f32::NAN), Threshold::default());
    }

    #[test]
    fn blur_radius_clamps() {
        assert_eq!(BlurRadius::new(0.0).value(), 0.1);
        assert_eq!(BlurRadius::new(50.0).value(), 10.0);
        assert_eq!(BlurRadius::default().value(), 1.0);
    }

    #[test]
    fn kernel_size_rejects_zero_even_and_large() {
        assert!(KernelSize::new(0).is_err());
        assert!(KernelSize::new(4).is_err());
        assert!(KernelSize::new(33).is_err());
        let k = KernelSize::new(5).unwrap();
        assert_eq!(k.value(), 5);
        assert_eq!(k.radius(), 2);
        assert_eq!(KernelSize::new(1).unwrap().radius(), 0);
    }

    #[test]
    fn aspect_rejects_margin_that_swallows_target() {
        assert!(AspectParams::new(100, 50, true).is_err());
        assert!(AspectParams::new(100, 49, true).is_ok());
    }

    #[test]
    fn aspect_mode_tags() {
        assert_eq!(AspectParams::new(512, 0, true).unwrap().mode_tag(), "aspect_square");
        assert_eq!(AspectParams::new(512, 0, false).unwrap().mode_tag(), "aspect");
    }

    #[test]
    fn crop_mode_tags() {
        let m = CropMargins::default();
        assert_eq!(CropParams::new(m, 512, true, 0).mode_tag(), "crop_square");
        assert_eq!(CropParams::new(m, 512, false, 0).mode_tag(), "crop");
    }

    #[test]
    fn canny_swaps_inverted_thresholds() {
        assert_eq!(
            EdgeAlgorithm::canny(150.0, 50.0),
            EdgeAlgorithm::Canny {
                low: 50.0,
                high: 150.0
            }
        );
        assert_eq!(
            EdgeAlgorithm::canny(-5.0, 900.0),
            EdgeAlgorithm::Canny {
                low: 0.0,
                high: 255.0
            }
        );
    }

    #[test]
    fn log_sigma_is_clamped() {
        assert_eq!(
            EdgeAlgorithm::log(0.0),
            EdgeAlgorithm::LaplacianOfGaussian { sigma: 0.1 }
        );
    }

    #[test]
    fn edge_tags_are_lowercase_names() {
        assert_eq!(EdgeAlgorithm::Sobel.tag(), "sobel");
        assert_eq!(EdgeAlgorithm::log(1.0).tag(), "log");
        assert_eq!(EdgeAlgorithm::log(1.0).name(), "LoG");
    }
}
