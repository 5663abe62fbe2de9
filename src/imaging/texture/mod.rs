//! Texture features from sliding-window gray-level co-occurrence matrices.
//!
//! [`TextureExtractor::extract`] turns a grayscale image into one feature map
//! per selected statistic and hands them back in a [`TextureSession`]. The
//! caller keeps the session and passes it to [`export::save_session`] when
//! the user asks to save; nothing is held between calls here.
//!
//! ```text
//! gray ─► windows (16×16, stride 8) ─► quantize ─► GLCM per angle
//!      ─► statistic averaged over angles ─► running mean per pixel
//!      ─► min-max rescale ─► FeatureMap
//! ```

pub mod export;
mod extract;
pub mod glcm;
pub mod render;

pub use extract::TextureExtractor;

use image::{ImageBuffer, Luma, RgbImage};
use serde::Serialize;
use std::f64::consts::PI;

/// Single-channel float map with the source's dimensions.
pub type FeatureMap = ImageBuffer<Luma<f32>, Vec<f32>>;

pub const MIN_LEVELS: u16 = 2;
pub const MAX_LEVELS: u16 = 256;
pub const MIN_DISTANCE: u32 = 1;
pub const MAX_DISTANCE: u32 = 5;

/// GLCM statistics, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TextureFeature {
    Contrast,
    Dissimilarity,
    Homogeneity,
    Energy,
    Correlation,
    #[serde(rename = "ASM")]
    Asm,
}

impl TextureFeature {
    pub const ALL: [TextureFeature; 6] = [
        Self::Contrast,
        Self::Dissimilarity,
        Self::Homogeneity,
        Self::Energy,
        Self::Correlation,
        Self::Asm,
    ];

    /// Name used in tables and file names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Contrast => "Contrast",
            Self::Dissimilarity => "Dissimilarity",
            Self::Homogeneity => "Homogeneity",
            Self::Energy => "Energy",
            Self::Correlation => "Correlation",
            Self::Asm => "ASM",
        }
    }

    /// Case-insensitive lookup by [`name`](Self::name).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
    }
}

/// Pair direction for the co-occurrence matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlcmAngle {
    Deg0,
    Deg45,
    Deg90,
    Deg135,
}

impl GlcmAngle {
    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg45 => 45,
            Self::Deg90 => 90,
            Self::Deg135 => 135,
        }
    }

    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            45 => Some(Self::Deg45),
            90 => Some(Self::Deg90),
            135 => Some(Self::Deg135),
            _ => None,
        }
    }

    pub fn radians(self) -> f64 {
        f64::from(self.degrees()) * PI / 180.0
    }
}

impl std::fmt::Display for GlcmAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// Per-call GLCM settings. Constructor clamps and deduplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureParams {
    pub distance: u32,
    pub angles: Vec<GlcmAngle>,
    pub levels: u16,
    pub symmetric: bool,
    pub normalize: bool,
    /// Selected statistics, always in [`TextureFeature::ALL`] order.
    pub features: Vec<TextureFeature>,
}

impl TextureParams {
    pub fn new(
        distance: u32,
        angles: &[GlcmAngle],
        levels: u32,
        symmetric: bool,
        normalize: bool,
        features: &[TextureFeature],
    ) -> Self {
        let mut angles = angles.to_vec();
        angles.sort();
        angles.dedup();
        Self {
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            angles,
            levels: levels.clamp(u32::from(MIN_LEVELS), u32::from(MAX_LEVELS)) as u16,
            symmetric,
            normalize,
            features: TextureFeature::ALL
                .into_iter()
                .filter(|f| features.contains(f))
                .collect(),
        }
    }
}

impl Default for TextureParams {
    fn default() -> Self {
        Self::new(1, &[GlcmAngle::Deg0], 64, true, true, &TextureFeature::ALL)
    }
}

/// Mean, population standard deviation and range of one map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl FeatureSummary {
    pub fn of(map: &FeatureMap) -> Self {
        let values = map.as_raw();
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let n = values.len() as f64;
        let (mut sum, mut min, mut max) = (0.0, f64::INFINITY, f64::NEG_INFINITY);
        for &v in values {
            let v = f64::from(v);
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        let mean = sum / n;
        let var = values
            .iter()
            .map(|&v| (f64::from(v) - mean).powi(2))
            .sum::<f64>()
            / n;
        Self {
            mean,
            std: var.sqrt(),
            min,
            max,
        }
    }

    /// `mean ± std (min: .., max: ..)` with five decimals.
    pub fn describe(&self) -> String {
        format!(
            "{:.5} ± {:.5} (min: {:.5}, max: {:.5})",
            self.mean, self.std, self.min, self.max
        )
    }
}

/// One feature's map and its summary.
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    pub feature: TextureFeature,
    pub map: FeatureMap,
    pub summary: FeatureSummary,
}

/// Feature maps from one extraction, owned by the caller until saved.
#[derive(Debug, Clone)]
pub struct TextureSession {
    /// File name of the analyzed source.
    pub source_name: String,
    pub layers: Vec<FeatureLayer>,
}

impl TextureSession {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, feature: TextureFeature) -> Option<&FeatureLayer> {
        self.layers.iter().find(|l| l.feature == feature)
    }
}

/// One row of the summary table shown next to the visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub detail: String,
}

impl SummaryRow {
    pub fn new(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
        }
    }
}

/// Everything the texture tool returns to its caller.
#[derive(Debug, Clone)]
pub struct TextureReport {
    pub visualization: RgbImage,
    pub table: Vec<SummaryRow>,
    /// Present only after a successful extraction with at least one feature.
    pub session: Option<TextureSession>,
}

impl TextureReport {
    pub fn from_session(session: TextureSession) -> Self {
        let table = session
            .layers
            .iter()
            .map(|l| SummaryRow::new(l.feature.name(), l.summary.describe()))
            .collect();
        Self {
            visualization: render::combined_figure(&session.layers),
            table,
            session: Some(session),
        }
    }

    pub fn no_input() -> Self {
        Self {
            visualization: render::neutral_placeholder(),
            table: vec![SummaryRow::new("No image selected", "")],
            session: None,
        }
    }

    pub fn no_features() -> Self {
        Self {
            visualization: render::neutral_placeholder(),
            table: vec![SummaryRow::new("No features selected", "")],
            session: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            visualization: render::error_placeholder(),
            table: vec![SummaryRow::new("Error", message)],
            session: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_clamp_and_order() {
        let p = TextureParams::new(
            9,
            &[GlcmAngle::Deg90, GlcmAngle::Deg0, GlcmAngle::Deg90],
            1000,
            true,
            false,
            &[TextureFeature::Asm, TextureFeature::Contrast],
        );
        assert_eq!(p.distance, MAX_DISTANCE);
        assert_eq!(p.angles, vec![GlcmAngle::Deg0, GlcmAngle::Deg90]);
        assert_eq!(p.levels, 256);
        assert_eq!(p.features, vec![TextureFeature::Contrast, TextureFeature::Asm]);

        let p = TextureParams::new(0, &[], 0, true, true, &[]);
        assert_eq!(p.distance, 1);
        assert_eq!(p.levels, 2);
    }

    #[test]
    fn feature_names_round_trip_through_parse() {
        for f in TextureFeature::ALL {
            assert_eq!(TextureFeature::parse(f.name()), Some(f));
        }
        assert_eq!(TextureFeature::parse("asm"), Some(TextureFeature::Asm));
        assert_eq!(TextureFeature::parse("entropy"), None);
    }

    #[test]
    fn angles_from_degrees() {
        assert_eq!(GlcmAngle::from_degrees(135), Some(GlcmAngle::Deg135));
        assert_eq!(GlcmAngle::from_degrees(30), None);
    }

    #[test]
    fn summary_of_simple_map() {
        let map = FeatureMap::from_raw(2, 2, vec![0.0, 1.0, 0.0, 1.0]).unwrap();
        let s = FeatureSummary::of(&map);
        assert_eq!(s.mean, 0.5);
        assert_eq!(s.std, 0.5);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.max, 1.0);
        assert_eq!(s.describe(), "0.50000 ± 0.50000 (min: 0.00000, max: 1.00000)");
    }

    #[test]
    fn placeholder_reports_have_no_session() {
        let r = TextureReport::no_features();
        assert!(!r.is_success());
        assert_eq!(r.table, vec![SummaryRow::new("No features selected", "")]);

        let r = TextureReport::error("boom");
        assert_eq!(r.table[0].label, "Error");
        assert_eq!(r.table[0].detail, "boom");
        assert!(r.session.is_none());
    }
}
