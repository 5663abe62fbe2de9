//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::CropMargins;
use super::stage::{ImagingError, Result};

/// Where resized content lands on a white canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    /// Canvas dimensions (width, height).
    pub canvas: (u32, u32),
    /// Resized content dimensions (width, height).
    pub content: (u32, u32),
    /// Top-left corner of the content on the canvas.
    pub offset: (u32, u32),
}

/// Scale `source` so its longer side equals `long_side`.
///
/// Each side is rounded to the nearest pixel and never drops below 1.
///
/// # Examples
/// ```
/// # use image_workbench::imaging::calculations::fit_long_side;
/// assert_eq!(fit_long_side((1000, 500), 512), (512, 256));
/// assert_eq!(fit_long_side((300, 900), 600), (200, 600));
/// ```
pub fn fit_long_side(source: (u32, u32), long_side: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let longest = src_w.max(src_h).max(1) as f64;
    let factor = long_side as f64 / longest;
    let w = ((src_w as f64 * factor).round() as u32).max(1);
    let h = ((src_h as f64 * factor).round() as u32).max(1);
    (w, h)
}

/// Place content either centered on a square canvas of side `square_side`
/// or framed by `margin` on every side.
fn place(content: (u32, u32), margin: u32, square_side: Option<u32>) -> CanvasLayout {
    let (w, h) = content;
    match square_side {
        Some(side) => CanvasLayout {
            canvas: (side, side),
            content,
            offset: (side.saturating_sub(w) / 2, side.saturating_sub(h) / 2),
        },
        None => CanvasLayout {
            canvas: (w + 2 * margin, h + 2 * margin),
            content,
            offset: (margin, margin),
        },
    }
}

/// Layout for the aspect-rescale pipeline.
///
/// The content long side is `target_size - 2 * margin`. A square output is
/// exactly `target_size` on each side with the content centered; otherwise
/// the canvas is the content plus `margin` on every side.
pub fn aspect_layout(
    source: (u32, u32),
    target_size: u32,
    margin: u32,
    square: bool,
) -> CanvasLayout {
    let inner = target_size.saturating_sub(2 * margin).max(1);
    let content = fit_long_side(source, inner);
    place(content, margin, square.then_some(target_size))
}

/// Layout for the crop pipeline.
///
/// The cropped content long side is `target_size`; a square output grows to
/// `target_size + 2 * margin` so the margin frames the content.
pub fn crop_layout(source: (u32, u32), target_size: u32, margin: u32, square: bool) -> CanvasLayout {
    let content = fit_long_side(source, target_size);
    place(content, margin, square.then_some(target_size + 2 * margin))
}

/// Crop rectangle as `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the crop box `(left, top, width - right, height - bottom)`.
///
/// Fails with [`ImagingError::InvalidCropBox`] when the margins leave a box
/// with no width or no height.
pub fn crop_box(dimensions: (u32, u32), margins: &CropMargins) -> Result<CropBox> {
    let (width, height) = dimensions;
    let right_edge = width.checked_sub(margins.right);
    let bottom_edge = height.checked_sub(margins.bottom);

    match (right_edge, bottom_edge) {
        (Some(r), Some(b)) if r > margins.left && b > margins.top => Ok(CropBox {
            x: margins.left,
            y: margins.top,
            width: r - margins.left,
            height: b - margins.top,
        }),
        _ => Err(ImagingError::InvalidCropBox {
            left: margins.left,
            top: margins.top,
            right: margins.right,
            bottom: margins.bottom,
            width,
            height,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_long_side_landscape() {
        assert_eq!(fit_long_side((2000, 1500), 800), (800, 600));
    }

    #[test]
    fn fit_long_side_rounds_to_nearest() {
        // 333 * (512/1000) = 170.496 → 170
        assert_eq!(fit_long_side((1000, 333), 512), (512, 170));
        // 335 * 0.512 = 171.52 → 172
        assert_eq!(fit_long_side((1000, 335), 512), (512, 172));
    }

    #[test]
    fn fit_long_side_upscales_small_images() {
        assert_eq!(fit_long_side((100, 50), 400), (400, 200));
    }

    #[test]
    fn fit_long_side_never_collapses_to_zero() {
        assert_eq!(fit_long_side((10_000, 1), 100), (100, 1));
    }

    #[test]
    fn aspect_square_centers_content() {
        let layout = aspect_layout((1000, 500), 512, 0, true);
        assert_eq!(layout.canvas, (512, 512));
        assert_eq!(layout.content, (512, 256));
        assert_eq!(layout.offset, (0, 128));
    }

    #[test]
    fn aspect_square_with_margin_shrinks_content() {
        let layout = aspect_layout((1000, 1000), 512, 16, true);
        assert_eq!(layout.canvas, (512, 512));
        assert_eq!(layout.content, (480, 480));
        assert_eq!(layout.offset, (16, 16));
    }

    #[test]
    fn aspect_square_offsets_floor() {
        // 512 - 511 = 1 → offset 0
        let layout = aspect_layout((1024, 1022), 512, 0, true);
        assert_eq!(layout.content, (512, 511));
        assert_eq!(layout.offset, (0, 0));
    }

    #[test]
    fn aspect_non_square_frames_with_margin() {
        let layout = aspect_layout((400, 200), 120, 10, false);
        assert_eq!(layout.content, (100, 50));
        assert_eq!(layout.canvas, (120, 70));
        assert_eq!(layout.offset, (10, 10));
    }

    #[test]
    fn crop_layout_square_grows_by_margin() {
        let layout = crop_layout((300, 150), 200, 10, true);
        assert_eq!(layout.content, (200, 100));
        assert_eq!(layout.canvas, (220, 220));
        assert_eq!(layout.offset, (10, 60));
    }

    #[test]
    fn crop_layout_without_margin_is_plain_fit() {
        let layout = crop_layout((300, 150), 200, 0, false);
        assert_eq!(layout.canvas, (200, 100));
        assert_eq!(layout.offset, (0, 0));
    }

    #[test]
    fn crop_box_from_margins() {
        let margins = CropMargins {
            top: 10,
            bottom: 20,
            left: 5,
            right: 15,
        };
        let b = crop_box((200, 100), &margins).unwrap();
        assert_eq!(
            b,
            CropBox {
                x: 5,
                y: 10,
                width: 180,
                height: 70
            }
        );
    }

    #[test]
    fn crop_box_left_beyond_width_fails() {
        let margins = CropMargins {
            left: 600,
            ..CropMargins::default()
        };
        let err = crop_box((500, 400), &margins).unwrap_err();
        assert!(matches!(err, ImagingError::InvalidCropBox { left: 600, .. }));
    }

    #[test]
    fn crop_box_margins_meeting_exactly_fail() {
        let margins = CropMargins {
            top: 50,
            bottom: 50,
            ..CropMargins::default()
        };
        assert!(crop_box((100, 100), &margins).is_err());
    }

    #[test]
    fn crop_box_right_larger_than_width_fails() {
        let margins = CropMargins {
            right: 101,
            ..CropMargins::default()
        };
        assert!(crop_box((100, 100), &margins).is_err());
    }
}
