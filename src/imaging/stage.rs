//! Pipeline stages and the executor that runs them.
//!
//! Every transform that takes one image and returns one image implements
//! [`Stage`]. A [`StagePipeline`] is an ordered list of stages: the first is
//! the pipeline's base transform (aspect rescale, crop, threshold, ...) and
//! the rest are optional add-ons such as binarize or blur. Stage order is
//! data, so the aspect and custom pipelines share one executor instead of
//! one hand-wired function per combination of options.
//!
//! The tags of the stages that ran are collected into a mode tag, which ends
//! up in auto-generated output file names (`aspect_square_binary_blur`).

use image::DynamicImage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("No image selected")]
    NoInputSelected,
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("Color conversion failed: {0}")]
    Conversion(String),
    #[error(
        "Invalid crop box: left={left}, top={top}, right={right}, bottom={bottom} on a {width}x{height} image"
    )]
    InvalidCropBox {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        width: u32,
        height: u32,
    },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("{}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
    #[error("{0}")]
    ProcessingFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImagingError {
    /// True for failures that happen while opening the source.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ImagingError::FileNotFound(_) | ImagingError::Decode { .. } | ImagingError::Conversion(_)
        )
    }
}

/// Result type for imaging operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// One image-to-image transform.
pub trait Stage {
    /// Tag appended to the mode tag when this stage runs.
    fn tag(&self) -> &str;

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage>;
}

/// Output of a pipeline run: the final image and the tags of every stage
/// that was applied, in order.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub image: DynamicImage,
    pub applied: Vec<String>,
}

impl PipelineRun {
    /// Applied stage tags joined with `_`.
    pub fn mode_tag(&self) -> String {
        self.applied.join("_")
    }
}

/// Ordered list of stages applied one after another.
#[derive(Default)]
pub struct StagePipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl StagePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append `stage` only when it is present.
    pub fn then_some(self, stage: Option<impl Stage + 'static>) -> Self {
        match stage {
            Some(stage) => self.then(stage),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Tags of all stages in execution order.
    pub fn tags(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.tag()).collect()
    }

    /// Run every stage in order. The first failing stage aborts the run.
    pub fn run(&self, image: DynamicImage) -> Result<PipelineRun> {
        let mut image = image;
        let mut applied = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            tracing::debug!(stage = stage.tag(), "applying stage");
            image = stage.apply(image)?;
            applied.push(stage.tag().to_string());
        }
        Ok(PipelineRun { image, applied })
    }
}
