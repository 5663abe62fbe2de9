//! Feature map visualization.
//!
//! Maps are drawn with the viridis colormap next to a vertical colorbar. The
//! combined figure lays tiles out in rows of at most three and gives every
//! tile the same color scale so features can be compared by eye.

use super::extract::value_range;
use super::{FeatureLayer, FeatureMap};
use image::imageops;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

const PADDING: u32 = 10;
const GAP: u32 = 8;
const COLORBAR_WIDTH: u32 = 16;
const TICK_LENGTH: f32 = 4.0;
const TICKS: u32 = 5;
const MAX_COLUMNS: usize = 3;
pub const PLACEHOLDER_SIZE: (u32, u32) = (640, 480);

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([40, 40, 40]);

/// Viridis sampled at nine evenly spaced points.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

/// Viridis color for `t` in `[0, 1]`. Out-of-range input is clamped.
pub fn viridis(t: f32) -> Rgb<u8> {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f32;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let mix = |k: usize| (f32::from(a[k]) + (f32::from(b[k]) - f32::from(a[k])) * frac).round() as u8;
    Rgb([mix(0), mix(1), mix(2)])
}

fn normalized(v: f32, lo: f32, hi: f32) -> f32 {
    if hi > lo { (v - lo) / (hi - lo) } else { 0.0 }
}

/// Color a map on the scale `[lo, hi]`.
pub fn colorize(map: &FeatureMap, lo: f32, hi: f32) -> RgbImage {
    RgbImage::from_fn(map.width(), map.height(), |x, y| {
        viridis(normalized(map.get_pixel(x, y).0[0], lo, hi))
    })
}

/// Vertical colorbar, high values at the top, with evenly spaced ticks.
fn colorbar(height: u32) -> RgbImage {
    let height = height.max(2);
    let mut bar = RgbImage::from_fn(COLORBAR_WIDTH, height, |_, y| {
        viridis(1.0 - y as f32 / (height - 1) as f32)
    });
    draw_hollow_rect_mut(&mut bar, Rect::at(0, 0).of_size(COLORBAR_WIDTH, height), FRAME);
    for i in 0..TICKS {
        let y = (i * (height - 1) / (TICKS - 1)) as f32;
        let right = (COLORBAR_WIDTH - 1) as f32;
        draw_line_segment_mut(&mut bar, (right - TICK_LENGTH, y), (right, y), FRAME);
    }
    bar
}

fn tile_size(map: &FeatureMap) -> (u32, u32) {
    (
        PADDING + map.width() + GAP + COLORBAR_WIDTH + PADDING,
        PADDING + map.height() + PADDING,
    )
}

/// A colored map with its colorbar on a white tile.
fn feature_tile(map: &FeatureMap, lo: f32, hi: f32) -> RgbImage {
    let (w, h) = tile_size(map);
    let mut tile = RgbImage::from_pixel(w, h, WHITE);
    imageops::replace(&mut tile, &colorize(map, lo, hi), PADDING as i64, PADDING as i64);
    draw_hollow_rect_mut(
        &mut tile,
        Rect::at(PADDING as i32 - 1, PADDING as i32 - 1).of_size(map.width() + 2, map.height() + 2),
        FRAME,
    );
    let bar_x = PADDING + map.width() + GAP;
    imageops::replace(&mut tile, &colorbar(map.height()), bar_x as i64, PADDING as i64);
    tile
}

/// One feature on its own color scale, as saved per feature.
pub fn feature_figure(layer: &FeatureLayer) -> RgbImage {
    let (lo, hi) = value_range(&layer.map);
    feature_tile(&layer.map, lo, hi)
}

/// All features in a grid of at most three columns on a shared scale.
pub fn combined_figure(layers: &[FeatureLayer]) -> RgbImage {
    let Some(first) = layers.first() else {
        return neutral_placeholder();
    };
    let (lo, hi) = layers
        .iter()
        .map(|l| value_range(&l.map))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });

    let n_cols = layers.len().min(MAX_COLUMNS);
    let n_rows = layers.len().div_ceil(n_cols);
    let (tw, th) = tile_size(&first.map);
    let mut canvas = RgbImage::from_pixel(tw * n_cols as u32, th * n_rows as u32, WHITE);
    for (i, layer) in layers.iter().enumerate() {
        let (col, row) = ((i % n_cols) as u32, (i / n_cols) as u32);
        let tile = feature_tile(&layer.map, lo, hi);
        imageops::replace(&mut canvas, &tile, (col * tw) as i64, (row * th) as i64);
    }
    canvas
}

/// Shown when there is nothing to draw.
pub fn neutral_placeholder() -> RgbImage {
    let (w, h) = PLACEHOLDER_SIZE;
    let mut img = RgbImage::from_pixel(w, h, Rgb([240, 240, 240]));
    draw_hollow_rect_mut(
        &mut img,
        Rect::at(20, 20).of_size(w - 40, h - 40),
        Rgb([180, 180, 180]),
    );
    img
}

/// Shown when extraction failed: a red frame with a cross.
pub fn error_placeholder() -> RgbImage {
    let (w, h) = PLACEHOLDER_SIZE;
    let red = Rgb([200, 30, 30]);
    let mut img = RgbImage::from_pixel(w, h, WHITE);
    draw_filled_rect_mut(&mut img, Rect::at(0, 0).of_size(w, 6), red);
    draw_filled_rect_mut(&mut img, Rect::at(0, h as i32 - 6).of_size(w, 6), red);
    let (cx, cy, r) = (w as f32 / 2.0, h as f32 / 2.0, 60.0);
    draw_line_segment_mut(&mut img, (cx - r, cy - r), (cx + r, cy + r), red);
    draw_line_segment_mut(&mut img, (cx - r, cy + r), (cx + r, cy - r), red);
    img
}
