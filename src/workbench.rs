//! Pipeline entry points.
//!
//! [`Workbench`] is what a caller (the CLI, a batch script, a UI) talks to.
//! Each method loads its source, runs one pipeline, writes the result under
//! the path [`crate::naming`] derives, and reports back. Nothing here
//! returns `Err`: every failure becomes a [`StatusResult`] with
//! `success = false`, so one bad file never takes the caller down.
//!
//! ## Status messages
//!
//! | Situation | Message |
//! |---|---|
//! | Result written | `Save successful: <path>` |
//! | Empty source file name | `No image selected` |
//! | Missing or undecodable source | `Failed to open image: <error>` |
//! | Any transform failure | `Processing failed: <error>` |
//! | Output could not be written | `Failed to save image: <error>` |
//!
//! A failed write still hands back the computed image.

use crate::config::{ConfigError, WorkbenchConfig};
use crate::imaging::morphology::run_morphology;
use crate::imaging::texture::export::save_session;
use crate::imaging::{
    AspectParams, AspectStage, BinarizeStage, BlurStage, CropParams, CropStage,
    CustomResizeStage, CustomSizeParams, EdgeAlgorithm, EdgeStage, Foreground, ImageLoader,
    ImagingError, MorphologyParams, PipelineRun, StagePipeline, TextureExtractor, TextureParams,
    TextureReport, TextureSession, ToneParams, composite, list_images,
};
use crate::naming::{resolve_output_path, source_stem};
use crate::types::{Outcome, OutputSpec, SourceDescriptor, StatusResult};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the mask pipeline takes its foreground from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskSource {
    BlackFill,
    Image(SourceDescriptor),
}

/// Result of one file in a batch crop.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub filename: String,
    pub status: StatusResult,
}

/// Per-file results of a batch crop, in file-name order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.status.success).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Status message for a failed pipeline step.
pub fn failure_message(err: &ImagingError) -> String {
    match err {
        ImagingError::NoInputSelected => err.to_string(),
        e if e.is_load_error() => format!("Failed to open image: {e}"),
        ImagingError::Write { .. } | ImagingError::Io(_) => format!("Failed to save image: {err}"),
        e => format!("Processing failed: {e}"),
    }
}

pub fn saved_message(path: &Path) -> String {
    format!("Save successful: {}", path.display())
}

/// GIF output needs an alpha channel; everything else takes the image as is.
fn encodable(image: &DynamicImage, path: &Path) -> DynamicImage {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Gif) => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => image.clone(),
    }
}

pub struct Workbench {
    config: WorkbenchConfig,
    loader: ImageLoader,
    extractor: TextureExtractor,
}

impl Workbench {
    pub fn new(config: WorkbenchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let extractor =
            TextureExtractor::new(config.texture.window_size, config.texture.step_size)
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(Self {
            loader: ImageLoader::new(config.svg.canvas_size),
            extractor,
            config,
        })
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Supported images in `dir`, sorted by name.
    pub fn list(&self, dir: &Path) -> Vec<String> {
        list_images(dir)
    }

    /// Aspect rescale, then optional binarize and blur.
    pub fn aspect(
        &self,
        source: &SourceDescriptor,
        params: &AspectParams,
        tone: &ToneParams,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        let pipeline = with_tone(StagePipeline::new().then(AspectStage(*params)), tone);
        self.run_rgb(source, &pipeline, output)
    }

    /// Resize to exact dimensions, then optional binarize and blur.
    pub fn custom(
        &self,
        source: &SourceDescriptor,
        params: &CustomSizeParams,
        tone: &ToneParams,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        let pipeline = with_tone(StagePipeline::new().then(CustomResizeStage(*params)), tone);
        self.run_rgb(source, &pipeline, output)
    }

    pub fn crop(
        &self,
        source: &SourceDescriptor,
        params: &CropParams,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        let pipeline = StagePipeline::new().then(CropStage(*params));
        self.run_rgb(source, &pipeline, output)
    }

    /// Crop every supported image in `folder`.
    ///
    /// Items are processed in file-name order and always auto-named; only
    /// the directory of `output` is honored. A failing file is recorded and
    /// the batch moves on.
    pub fn crop_batch(&self, folder: &Path, params: &CropParams, output: &OutputSpec) -> BatchReport {
        let output = OutputSpec::new(output.directory.clone(), None);
        let names = list_images(folder);
        tracing::info!(folder = %folder.display(), files = names.len(), "batch crop");

        let items = names
            .into_iter()
            .map(|filename| {
                let source = SourceDescriptor::new(folder, filename.clone());
                let status = self.crop(&source, params, &output).status;
                if !status.success {
                    tracing::warn!(file = %filename, message = %status.message, "batch item failed");
                }
                BatchItem { filename, status }
            })
            .collect();
        BatchReport { items }
    }

    /// Composite a foreground through a binary mask. Named after the mask
    /// file with the `stroke` tag.
    pub fn mask(
        &self,
        mask: &SourceDescriptor,
        foreground: &MaskSource,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        if mask.is_empty() {
            return fail(ImagingError::NoInputSelected);
        }
        let mask_image = match self.loader.load(&mask.path()) {
            Ok(img) => DynamicImage::ImageRgb8(img),
            Err(e) => return fail(e),
        };
        let fill = match foreground {
            MaskSource::Image(src) if !src.is_empty() => match self.loader.load(&src.path()) {
                Ok(img) => Some(img),
                Err(e) => return fail(e),
            },
            _ => None,
        };
        let fg = match &fill {
            Some(img) => Foreground::Image(img),
            None => Foreground::BlackFill,
        };
        let result = DynamicImage::ImageRgb8(composite(&mask_image, fg));
        self.persist(&mask.filename, result, "stroke", output)
    }

    pub fn edges(
        &self,
        source: &SourceDescriptor,
        algorithm: EdgeAlgorithm,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        let pipeline = StagePipeline::new().then(EdgeStage(algorithm));
        self.run_gray(source, output, |gray| pipeline.run(gray))
    }

    pub fn morphology(
        &self,
        source: &SourceDescriptor,
        params: &MorphologyParams,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        self.run_gray(source, output, |gray| run_morphology(gray, params))
    }

    /// Extract texture features. Nothing is written; keep the returned
    /// session and pass it to [`save_texture`](Self::save_texture).
    pub fn texture(&self, source: &SourceDescriptor, params: &TextureParams) -> TextureReport {
        if source.is_empty() {
            return TextureReport::no_input();
        }
        let gray = match self.loader.load_grayscale(&source.path()) {
            Ok(gray) => gray,
            Err(e) => {
                tracing::warn!(source = %source.filename, error = %e, "texture source failed to load");
                return TextureReport::error(e.to_string());
            }
        };
        if params.features.is_empty() {
            return TextureReport::no_features();
        }
        match self.extractor.extract(&gray, &source.filename, params) {
            Ok(session) => TextureReport::from_session(session),
            Err(e) => {
                tracing::warn!(source = %source.filename, error = %e, "texture extraction failed");
                TextureReport::error(e.to_string())
            }
        }
    }

    /// Write the maps, combined figure and stats of a session.
    ///
    /// Files go to the output directory if given, else to the configured
    /// features directory. The base name is the output file name's stem, or
    /// the source's stem.
    pub fn save_texture(&self, session: Option<&TextureSession>, output: &OutputSpec) -> StatusResult {
        let Some(session) = session.filter(|s| !s.is_empty()) else {
            return StatusResult::failed("No features to save".to_string());
        };
        let dir = output
            .directory()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.features_dir());
        let base = match output.filename() {
            Some(name) => source_stem(name),
            None => source_stem(&session.source_name),
        };
        let base = if base.is_empty() { "glcm_features".to_string() } else { base };

        match save_session(session, &dir, &base) {
            Ok(saved) => StatusResult::saved(
                saved.directory.clone(),
                format!("Save successful: {}", saved.listing()),
            ),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "texture save failed");
                StatusResult::failed(failure_message(&e))
            }
        }
    }

    /// Load as RGB, run, persist.
    fn run_rgb(
        &self,
        source: &SourceDescriptor,
        pipeline: &StagePipeline,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        if source.is_empty() {
            return fail(ImagingError::NoInputSelected);
        }
        let image = match self.loader.load(&source.path()) {
            Ok(img) => DynamicImage::ImageRgb8(img),
            Err(e) => return fail(e),
        };
        self.finish(source, pipeline.run(image), output)
    }

    /// Load as grayscale, run, persist.
    fn run_gray(
        &self,
        source: &SourceDescriptor,
        output: &OutputSpec,
        run: impl FnOnce(DynamicImage) -> crate::imaging::Result<PipelineRun>,
    ) -> Outcome<DynamicImage> {
        if source.is_empty() {
            return fail(ImagingError::NoInputSelected);
        }
        let gray = match self.loader.load_grayscale(&source.path()) {
            Ok(gray) => DynamicImage::ImageLuma8(gray),
            Err(e) => return fail(e),
        };
        self.finish(source, run(gray), output)
    }

    fn finish(
        &self,
        source: &SourceDescriptor,
        run: crate::imaging::Result<PipelineRun>,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        match run {
            Ok(run) => {
                let tag = run.mode_tag();
                self.persist(&source.filename, run.image, &tag, output)
            }
            Err(e) => fail(e),
        }
    }

    /// Write `image` to its resolved path. On failure the image is kept in
    /// the outcome.
    fn persist(
        &self,
        source_filename: &str,
        image: DynamicImage,
        mode_tag: &str,
        output: &OutputSpec,
    ) -> Outcome<DynamicImage> {
        let written = resolve_output_path(output, source_filename, mode_tag, &self.config.default_dir())
            .map_err(ImagingError::from)
            .and_then(|path| {
                encodable(&image, &path)
                    .save(&path)
                    .map_err(|e| ImagingError::Write {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(path)
            });

        let status = match written {
            Ok(path) => {
                tracing::info!(path = %path.display(), mode = mode_tag, "result written");
                StatusResult::saved(path.clone(), saved_message(&path))
            }
            Err(e) => {
                tracing::warn!(source = source_filename, error = %e, "result not written");
                StatusResult::failed(failure_message(&e))
            }
        };
        Outcome {
            output: Some(image),
            status,
        }
    }
}

fn with_tone(pipeline: StagePipeline, tone: &ToneParams) -> StagePipeline {
    pipeline
        .then_some(tone.binary.map(BinarizeStage))
        .then_some(tone.blur.map(BlurStage))
}

fn fail(err: ImagingError) -> Outcome<DynamicImage> {
    tracing::warn!(error = %err, "pipeline failed");
    Outcome::failed(StatusResult::failed(failure_message(&err)))
}
