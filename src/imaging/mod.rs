//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image` (raster), `resvg` (SVG onto a white square canvas) |
//! | **Aspect / crop / resize** | `imageops::resize` Lanczos3 + `imageops::replace` |
//! | **Binarize / blur** | luma threshold, `DynamicImage::blur` |
//! | **Mask** | fixed-threshold mask select over a Lanczos3-resized source |
//! | **Edges** | 3×3 kernels in `f32`, `imageproc::edges::canny` |
//! | **Morphology** | `imageproc::morphology` with the `LInf` norm |
//! | **Texture** | sparse GLCM per window, viridis rendering via `imageproc::drawing` |
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (unit testable)
//! - **Parameters**: validated descriptions of each operation
//! - **Stage**: the [`Stage`] trait, [`StagePipeline`] executor and [`ImagingError`]
//! - **Loader**: [`ImageLoader`], decoding files and bytes into RGB
//! - **Transforms**: geometry, tone, composite, edges, morphology, texture

pub mod calculations;
pub mod composite;
pub mod edges;
pub mod geometry;
pub mod loader;
pub mod morphology;
pub mod params;
pub mod stage;
pub mod texture;
pub mod tone;

pub use composite::{Foreground, composite};
pub use edges::{EdgeStage, detect_edges};
pub use geometry::{AspectStage, CropStage, CustomResizeStage};
pub use loader::{ImageLoader, is_supported, list_images, supported_input_extensions};
pub use morphology::run_morphology;
pub use params::{
    AspectParams, BlurRadius, CropMargins, CropParams, CustomSizeParams, Dimension,
    EdgeAlgorithm, KernelSize, MorphologyParams, Threshold, ToneParams,
};
pub use stage::{ImagingError, PipelineRun, Result, Stage, StagePipeline};
pub use texture::{
    GlcmAngle, TextureExtractor, TextureFeature, TextureParams, TextureReport, TextureSession,
};
pub use tone::{BinarizeStage, BlurStage};
