use super::glcm::{quantize, window_properties};
use super::{FeatureLayer, FeatureMap, FeatureSummary, TextureParams, TextureSession};
use crate::imaging::stage::{ImagingError, Result};
use image::{GrayImage, Luma};

pub const DEFAULT_WINDOW_SIZE: u32 = 16;
pub const DEFAULT_STEP_SIZE: u32 = 8;

/// Sliding-window feature extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureExtractor {
    window_size: u32,
    step_size: u32,
}

impl Default for TextureExtractor {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            step_size: DEFAULT_STEP_SIZE,
        }
    }
}

impl TextureExtractor {
    pub fn new(window_size: u32, step_size: u32) -> Result<Self> {
        if window_size < 2 || step_size == 0 || step_size >= window_size {
            return Err(ImagingError::InvalidParameter(format!(
                "texture step {step_size} must be non-zero and smaller than window {window_size}"
            )));
        }
        Ok(Self {
            window_size,
            step_size,
        })
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn step_size(&self) -> u32 {
        self.step_size
    }

    /// Compute one map per selected feature.
    ///
    /// Each window's statistic is folded into every pixel it covers as a
    /// running mean, so the result does not depend on window order. Pixels
    /// no window reaches (right and bottom strips narrower than the stride)
    /// stay at zero. Each map is then rescaled to `[0, 1]` unless flat.
    pub fn extract(
        &self,
        gray: &GrayImage,
        source_name: &str,
        params: &TextureParams,
    ) -> Result<TextureSession> {
        if params.angles.is_empty() {
            return Err(ImagingError::ProcessingFailed(
                "no GLCM angle selected".to_string(),
            ));
        }
        let (w, h) = gray.dimensions();
        if w < self.window_size || h < self.window_size {
            return Err(ImagingError::InvalidParameter(format!(
                "image {w}x{h} is smaller than the {0}x{0} texture window",
                self.window_size
            )));
        }

        let quantized: Vec<u16> = gray
            .as_raw()
            .iter()
            .map(|&v| quantize(v, params.levels))
            .collect();

        let (w, h, win) = (w as usize, h as usize, self.window_size as usize);
        let step = self.step_size as usize;
        let n_features = params.features.len();
        let mut means = vec![vec![0.0f64; w * h]; n_features];
        let mut counts = vec![0u32; w * h];
        let mut window = vec![0u16; win * win];

        for y in (0..=h - win).step_by(step) {
            for x in (0..=w - win).step_by(step) {
                for wy in 0..win {
                    let row = (y + wy) * w + x;
                    window[wy * win..(wy + 1) * win].copy_from_slice(&quantized[row..row + win]);
                }
                let values = window_properties(
                    &window,
                    win,
                    params.distance,
                    &params.angles,
                    params.symmetric,
                    params.normalize,
                    &params.features,
                );
                for wy in 0..win {
                    for wx in 0..win {
                        let idx = (y + wy) * w + x + wx;
                        counts[idx] += 1;
                        let n = f64::from(counts[idx]);
                        for (map, &v) in means.iter_mut().zip(&values) {
                            map[idx] += (v - map[idx]) / n;
                        }
                    }
                }
            }
        }
        tracing::debug!(
            source = source_name,
            features = n_features,
            "texture windows accumulated"
        );

        let layers = params
            .features
            .iter()
            .zip(means)
            .map(|(&feature, values)| {
                let map = rescale(to_map(w as u32, h as u32, &values));
                let summary = FeatureSummary::of(&map);
                FeatureLayer {
                    feature,
                    map,
                    summary,
                }
            })
            .collect();

        Ok(TextureSession {
            source_name: source_name.to_string(),
            layers,
        })
    }
}

fn to_map(w: u32, h: u32, values: &[f64]) -> FeatureMap {
    FeatureMap::from_fn(w, h, |x, y| {
        Luma([values[(y * w + x) as usize] as f32])
    })
}

/// Min-max rescale to `[0, 1]`. Flat maps are left untouched.
pub(crate) fn rescale(mut map: FeatureMap) -> FeatureMap {
    let (min, max) = value_range(&map);
    if max > min {
        let range = max - min;
        for p in map.pixels_mut() {
            p.0[0] = (p.0[0] - min) / range;
        }
    }
    map
}

pub(crate) fn value_range(map: &FeatureMap) -> (f32, f32) {
    map.pixels()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.0[0]), hi.max(p.0[0]))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::texture::{GlcmAngle, TextureFeature};

    fn checker(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([if (x + y) % 2 == 0 { 0 } else { 255 }]))
    }

    fn all_angles() -> TextureParams {
        TextureParams::new(
            1,
            &[GlcmAngle::Deg0, GlcmAngle::Deg45, GlcmAngle::Deg90, GlcmAngle::Deg135],
            64,
            true,
            true,
            &TextureFeature::ALL,
        )
    }

    #[test]
    fn uniform_image_has_zero_contrast_and_unit_energy() {
        let gray = GrayImage::from_pixel(32, 32, Luma([120]));
        let session = TextureExtractor::default()
            .extract(&gray, "flat.png", &all_angles())
            .unwrap();
        let contrast = session.layer(TextureFeature::Contrast).unwrap();
        let dissimilarity = session.layer(TextureFeature::Dissimilarity).unwrap();
        let energy = session.layer(TextureFeature::Energy).unwrap();
        assert!(contrast.map.pixels().all(|p| p.0[0].abs() < 1e-6));
        assert!(dissimilarity.map.pixels().all(|p| p.0[0].abs() < 1e-6));
        assert!(energy.map.pixels().all(|p| (p.0[0] - 1.0).abs() < 1e-6));
    }

    #[test]
    fn maps_have_source_dimensions_and_selected_features() {
        let params = TextureParams::new(
            2,
            &[GlcmAngle::Deg0],
            16,
            true,
            true,
            &[TextureFeature::Homogeneity, TextureFeature::Contrast],
        );
        let session = TextureExtractor::default()
            .extract(&checker(40, 24), "c.png", &params)
            .unwrap();
        let names: Vec<_> = session.layers.iter().map(|l| l.feature).collect();
        assert_eq!(names, vec![TextureFeature::Contrast, TextureFeature::Homogeneity]);
        for layer in &session.layers {
            assert_eq!(layer.map.dimensions(), (40, 24));
        }
    }

    #[test]
    fn textured_half_has_higher_contrast_after_rescale() {
        let gray = GrayImage::from_fn(48, 32, |x, y| {
            if x < 24 {
                Luma([100])
            } else {
                Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])
            }
        });
        let session = TextureExtractor::default()
            .extract(&gray, "half.png", &all_angles())
            .unwrap();
        let map = &session.layer(TextureFeature::Contrast).unwrap().map;
        assert_eq!(map.get_pixel(2, 2).0[0], 0.0);
        assert_eq!(map.get_pixel(45, 2).0[0], 1.0);
        let summary = session.layer(TextureFeature::Contrast).unwrap().summary;
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 1.0);
    }

    #[test]
    fn pixels_outside_every_window_stay_zero() {
        let gray = GrayImage::from_pixel(20, 20, Luma([50]));
        let params = TextureParams::new(1, &[GlcmAngle::Deg0], 8, true, true, &[TextureFeature::Energy]);
        let session = TextureExtractor::default()
            .extract(&gray, "s.png", &params)
            .unwrap();
        let map = &session.layers[0].map;
        // Only the window at the origin fits; energy 1 there, 0 elsewhere, then rescaled.
        assert_eq!(map.get_pixel(15, 15).0[0], 1.0);
        assert_eq!(map.get_pixel(16, 3).0[0], 0.0);
        assert_eq!(map.get_pixel(3, 19).0[0], 0.0);
    }

    #[test]
    fn empty_angle_set_is_rejected() {
        let params = TextureParams::new(1, &[], 8, true, true, &TextureFeature::ALL);
        let err = TextureExtractor::default()
            .extract(&checker(32, 32), "c.png", &params)
            .unwrap_err();
        assert!(matches!(err, ImagingError::ProcessingFailed(_)));
    }

    #[test]
    fn image_smaller_than_window_is_rejected() {
        let err = TextureExtractor::default()
            .extract(&checker(10, 40), "tiny.png", &TextureParams::default())
            .unwrap_err();
        assert!(matches!(err, ImagingError::InvalidParameter(_)));
    }

    #[test]
    fn window_settings_are_validated() {
        assert!(TextureExtractor::new(16, 0).is_err());
        assert!(TextureExtractor::new(8, 16).is_err());
        assert!(TextureExtractor::new(8, 8).is_err(), "a stride equal to the window leaves no overlap");
        let e = TextureExtractor::new(8, 4).unwrap();
        assert_eq!((e.window_size(), e.step_size()), (8, 4));
    }

    #[test]
    fn rescale_leaves_flat_map_alone() {
        let map = FeatureMap::from_pixel(3, 3, Luma([0.4]));
        assert!(rescale(map).pixels().all(|p| p.0[0] == 0.4));
    }
}
