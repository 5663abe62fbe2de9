//! Source image loading.
//!
//! ## Crate mapping
//!
//! | Input | Crate / function |
//! |---|---|
//! | PNG, JPEG, BMP, GIF, TIFF | `image::ImageReader` (format sniffed from content) |
//! | SVG | `resvg` (`usvg` parse + `tiny_skia` raster) onto a white canvas |
//!
//! Every loader returns RGB8. Raster bytes are decoded twice: a first
//! reader checks the format and decodes the whole body to prove integrity,
//! then a fresh reader performs the decode that is kept, so validation never
//! consumes the stream the result comes from.

use super::stage::{ImagingError, Result};
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Raster extensions and the decoder each one maps to.
const RASTER_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut exts: Vec<&'static str> = RASTER_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect();
    // Rendered through resvg, not the image crate.
    exts.push("svg");
    exts
});

/// Returns the set of source extensions the loader can open.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True when `name` has an extension listed in [`supported_input_extensions`].
pub fn is_supported(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

pub fn is_svg(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Sorted names of the supported images directly inside `dir`.
///
/// A missing or unreadable directory yields an empty list.
pub fn list_images(dir: &Path) -> Vec<String> {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| is_supported(name))
        .collect()
}

/// Opens source images and normalizes them to RGB8.
#[derive(Debug, Clone, Copy)]
pub struct ImageLoader {
    /// Side of the square canvas SVG sources are rendered onto.
    svg_canvas: u32,
}

impl ImageLoader {
    pub const DEFAULT_SVG_CANVAS: u32 = 1024;

    pub fn new(svg_canvas: u32) -> Self {
        Self {
            svg_canvas: svg_canvas.max(1),
        }
    }

    /// Load an image from disk as RGB8.
    ///
    /// Read failures on an existing path (a directory, missing permissions)
    /// are decode errors: the source could not be opened.
    pub fn load(&self, path: &Path) -> Result<RgbImage> {
        if !path.exists() {
            return Err(ImagingError::FileNotFound(path.to_path_buf()));
        }
        let name = path.display().to_string();
        let data = std::fs::read(path).map_err(|e| decode_error(&name, e))?;
        self.load_bytes(&data, &name)
    }

    /// Load an in-memory image. `name_hint` is only used to recognize SVG
    /// input and to label errors.
    pub fn load_bytes(&self, data: &[u8], name_hint: &str) -> Result<RgbImage> {
        if is_svg(name_hint) {
            return self.render_svg(data, name_hint);
        }
        verify_raster(ImageReader::new(Cursor::new(data)), name_hint)?;
        let decoded = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| decode_error(name_hint, e))?
            .decode()
            .map_err(|e| decode_error(name_hint, e))?;
        to_rgb(decoded)
    }

    /// Load for analysis: RGB first, then luma.
    pub fn load_grayscale(&self, path: &Path) -> Result<GrayImage> {
        let rgb = self.load(path)?;
        Ok(DynamicImage::ImageRgb8(rgb).to_luma8())
    }

    /// Rasterize an SVG onto a white square canvas, aspect preserved and
    /// centered, so transparent regions become white before any pixel math.
    fn render_svg(&self, data: &[u8], name: &str) -> Result<RgbImage> {
        let tree = usvg::Tree::from_data(data, &usvg::Options::default())
            .map_err(|e| decode_error(name, e))?;

        let size = tree.size();
        let side = self.svg_canvas as f32;
        let scale = (side / size.width()).min(side / size.height());
        let dx = (side - size.width() * scale) / 2.0;
        let dy = (side - size.height() * scale) / 2.0;

        let mut pixmap = tiny_skia::Pixmap::new(self.svg_canvas, self.svg_canvas).ok_or_else(
            || ImagingError::Conversion(format!("cannot allocate SVG canvas for {name}")),
        )?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, dx, dy),
            &mut pixmap.as_mut(),
        );

        // The canvas is opaque, so premultiplied and straight alpha agree.
        let rgba = RgbaImage::from_raw(self.svg_canvas, self.svg_canvas, pixmap.take())
            .ok_or_else(|| {
                ImagingError::Conversion(format!("SVG raster size mismatch for {name}"))
            })?;
        Ok(DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SVG_CANVAS)
    }
}

/// Integrity check: the content must be a known raster format and must
/// decode in full to a non-empty image. The decoded pixels are discarded.
fn verify_raster<R: std::io::BufRead + std::io::Seek>(
    reader: ImageReader<R>,
    name: &str,
) -> Result<()> {
    let reader = reader
        .with_guessed_format()
        .map_err(|e| decode_error(name, e))?;
    let format = reader.format().ok_or_else(|| ImagingError::Decode {
        name: name.to_string(),
        reason: "unrecognized image format".into(),
    })?;
    if !RASTER_CANDIDATES.iter().any(|(_, f)| *f == format) {
        return Err(ImagingError::Decode {
            name: name.to_string(),
            reason: format!("unsupported format {format:?}"),
        });
    }
    let decoded = reader.decode().map_err(|e| decode_error(name, e))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(ImagingError::Decode {
            name: name.to_string(),
            reason: "image has no pixels".into(),
        });
    }
    Ok(())
}

fn decode_error(name: &str, err: impl std::fmt::Display) -> ImagingError {
    ImagingError::Decode {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

fn to_rgb(image: DynamicImage) -> Result<RgbImage> {
    let rgb = image.into_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(ImagingError::Conversion("decoded image is empty".into()));
    }
    Ok(rgb)
}
