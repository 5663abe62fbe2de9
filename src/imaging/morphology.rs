//! Binary morphology.
//!
//! The source is thresholded first (samples above [`MORPH_THRESHOLD`] become
//! foreground), then the enabled operations run in a fixed order: erosion,
//! dilation, opening, closing. Kernels are square, so each one maps to an
//! `imageproc` operation under the chessboard (`LInf`) norm with radius
//! `size / 2`.

use super::params::{KernelSize, MorphologyParams};
use super::stage::{PipelineRun, Result, Stage, StagePipeline};
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Luma samples strictly above this are foreground.
pub const MORPH_THRESHOLD: u8 = 127;

/// Base stage of the morphology pipeline.
pub struct ThresholdStage;

impl Stage for ThresholdStage {
    fn tag(&self) -> &str {
        "morph"
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        let binary = threshold(&image.to_luma8(), MORPH_THRESHOLD, ThresholdType::Binary);
        Ok(DynamicImage::ImageLuma8(binary))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    Erosion,
    Dilation,
    Opening,
    Closing,
}

impl MorphOp {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Erosion => "erosion",
            Self::Dilation => "dilation",
            Self::Opening => "opening",
            Self::Closing => "closing",
        }
    }

    pub fn apply_gray(self, image: &GrayImage, kernel: KernelSize) -> GrayImage {
        let k = kernel.radius();
        match self {
            Self::Erosion => morphology::erode(image, Norm::LInf, k),
            Self::Dilation => morphology::dilate(image, Norm::LInf, k),
            Self::Opening => morphology::open(image, Norm::LInf, k),
            Self::Closing => morphology::close(image, Norm::LInf, k),
        }
    }
}

pub struct MorphStage {
    pub op: MorphOp,
    pub kernel: KernelSize,
}

impl Stage for MorphStage {
    fn tag(&self) -> &str {
        self.op.tag()
    }

    fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageLuma8(
            self.op.apply_gray(&image.to_luma8(), self.kernel),
        ))
    }
}

/// Threshold stage followed by every enabled operation, in fixed order.
pub fn morphology_pipeline(params: &MorphologyParams) -> StagePipeline {
    let stage = |op, kernel: Option<KernelSize>| kernel.map(|kernel| MorphStage { op, kernel });
    StagePipeline::new()
        .then(ThresholdStage)
        .then_some(stage(MorphOp::Erosion, params.erosion))
        .then_some(stage(MorphOp::Dilation, params.dilation))
        .then_some(stage(MorphOp::Opening, params.opening))
        .then_some(stage(MorphOp::Closing, params.closing))
}

/// Run the morphology pipeline. With no operation enabled the mode tag is
/// `morph_original`.
pub fn run_morphology(image: DynamicImage, params: &MorphologyParams) -> Result<PipelineRun> {
    let mut run = morphology_pipeline(params).run(image)?;
    if run.applied.len() == 1 {
        run.applied.push("original".to_string());
    }
    Ok(run)
}
