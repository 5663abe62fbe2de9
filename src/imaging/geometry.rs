//! Geometric transforms: aspect rescale, custom resize and crop.
//!
//! All resampling uses `Lanczos3`; aliasing here would show up as ragged
//! edges once the result is thresholded. Padding is always solid white.

use super::calculations::{CanvasLayout, aspect_layout, crop_box, crop_layout};
use super::params::{AspectParams, CropParams, CustomSizeParams};
use super::stage::{Result, Stage};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Resize into `layout.content` and paste onto a white canvas.
fn compose_on_canvas(image: &RgbImage, layout: &CanvasLayout) -> RgbImage {
    let (cw, ch) = layout.content;
    let resized = imageops::resize(image, cw, ch, FilterType::Lanczos3);
    let (w, h) = layout.canvas;
    let mut canvas = RgbImage::from_pixel(w, h, WHITE);
    imageops::replace(
        &mut canvas,
        &resized,
        layout.offset.0 as i64,
        layout.offset.1 as i64,
    );
    canvas
}

/// Fit the long side into `target - 2 * margin` and pad with white.
pub fn aspect_rescale(image: &RgbImage, params: &AspectParams) -> RgbImage {
    let layout = aspect_layout(
        image.dimensions(),
        params.target_size.value(),
        params.margin,
        params.square,
    );
    compose_on_canvas(image, &layout)
}

/// Resize to exactly the requested dimensions.
pub fn custom_resize(image: &RgbImage, params: &CustomSizeParams) -> RgbImage {
    imageops::resize(
        image,
        params.width.value(),
        params.height.value(),
        FilterType::Lanczos3,
    )
}

/// Crop by the four margins, then fit and pad like the aspect rescale.
pub fn crop_and_fit(image: &RgbImage, params: &CropParams) -> Result<RgbImage> {
    let b = crop_box(image.dimensions(), &params.margins)?;
    let cropped = imageops::crop_imm(image, b.x, b.y, b.width, b.height).to_image();
    let layout = crop_layout(
        cropped.dimensions(),
        params.target_size.value(),
        params.margin,
        params.square,
    );
    Ok(compose_on_canvas(&cropped, &layout))
}

pub struct AspectStage(pub AspectParams);

impl Stage for AspectStage {
    fn tag(&self) -> &str {
        self.0.mode_tag()
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        Ok(aspect_rescale(&image.into_rgb8(), &self.0).into())
    }
}

pub struct CustomResizeStage(pub CustomSizeParams);

impl Stage for CustomResizeStage {
    fn tag(&self) -> &str {
        "custom"
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        Ok(custom_resize(&image.into_rgb8(), &self.0).into())
    }
}

pub struct CropStage(pub CropParams);

impl Stage for CropStage {
    fn tag(&self) -> &str {
        self.0.mode_tag()
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        Ok(crop_and_fit(&image.into_rgb8(), &self.0)?.into())
    }
}
