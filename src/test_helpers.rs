//! Shared test utilities: synthetic images and a workbench rooted in a temp dir.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_image(tmp.path(), "photo.png", &DynamicImage::ImageRgb8(gradient_rgb(64, 32)));
//! let wb = workbench_in(tmp.path());
//! ```

use crate::config::WorkbenchConfig;
use crate::workbench::Workbench;
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// A small SVG: a black square on a transparent 200×100 viewport.
pub const SAMPLE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
  <rect x="75" y="25" width="50" height="50" fill="black"/>
</svg>"#;

// =========================================================================
// Image builders
// =========================================================================

/// Red ramps left to right, green top to bottom, blue fixed.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    let wx = width.saturating_sub(1).max(1);
    let hy = height.saturating_sub(1).max(1);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / wx) as u8, (y * 255 / hy) as u8, 128])
    })
}

pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Encode `image` into `dir/name` (format from the extension).
pub fn write_image(dir: &Path, name: &str, image: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

/// Workbench whose default output directory is `root/output`.
pub fn workbench_in(root: &Path) -> Workbench {
    let mut config = WorkbenchConfig::default();
    config.output.default_dir = root.join("output").display().to_string();
    Workbench::new(config).unwrap()
}
