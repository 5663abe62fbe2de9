//! Gray-level co-occurrence matrices and the statistics derived from them.
//!
//! A 16×16 window yields at most a few hundred pixel pairs, while a 256-level
//! matrix has 65 536 cells, so matrices are stored sparsely.

use super::{GlcmAngle, TextureFeature};
use std::collections::BTreeMap;

/// Statistics below this standard deviation make correlation undefined; it
/// is reported as 1.
const MIN_STD: f64 = 1e-15;

/// Map an 8-bit sample onto `levels` uniform bins over `[0, 255]`.
///
/// ```
/// # use image_workbench::imaging::texture::glcm::quantize;
/// assert_eq!(quantize(0, 64), 0);
/// assert_eq!(quantize(255, 64), 63);
/// assert_eq!(quantize(128, 2), 0);
/// ```
pub fn quantize(value: u8, levels: u16) -> u16 {
    ((u32::from(value) * (u32::from(levels) - 1)) / 255) as u16
}

/// Row/column displacement for `angle` at `distance`.
pub fn offset(angle: GlcmAngle, distance: u32) -> (i64, i64) {
    let theta = angle.radians();
    let d = f64::from(distance);
    ((theta.sin() * d).round() as i64, (theta.cos() * d).round() as i64)
}

/// Co-occurrence matrix of one window for one (distance, angle) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoMatrix {
    cells: BTreeMap<(u16, u16), f64>,
    total: f64,
}

impl CoMatrix {
    /// Count pairs `(q[r][c], q[r + dr][c + dc])` inside a quantized window.
    ///
    /// `window` is row-major with `width` columns. With `symmetric` each
    /// pair is counted in both directions. With `normalize` the stored
    /// cells sum to 1.
    pub fn build(
        window: &[u16],
        width: usize,
        (dr, dc): (i64, i64),
        symmetric: bool,
        normalize: bool,
    ) -> Self {
        let height = if width == 0 { 0 } else { window.len() / width };
        let mut m = Self::default();
        for r in 0..height as i64 {
            for c in 0..width as i64 {
                let (r2, c2) = (r + dr, c + dc);
                if r2 < 0 || c2 < 0 || r2 >= height as i64 || c2 >= width as i64 {
                    continue;
                }
                let i = window[r as usize * width + c as usize];
                let j = window[r2 as usize * width + c2 as usize];
                m.add(i, j);
                if symmetric {
                    m.add(j, i);
                }
            }
        }
        if normalize && m.total > 0.0 {
            let total = m.total;
            for v in m.cells.values_mut() {
                *v /= total;
            }
            m.total = 1.0;
        }
        m
    }

    fn add(&mut self, i: u16, j: u16) {
        *self.cells.entry((i, j)).or_insert(0.0) += 1.0;
        self.total += 1.0;
    }

    /// Value at `(i, j)`: a count, or a probability if built normalized.
    pub fn get(&self, i: u16, j: u16) -> f64 {
        self.cells.get(&(i, j)).copied().unwrap_or(0.0)
    }

    /// Sum of all cells.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Non-zero cells as `((i, j), probability)`.
    fn probabilities(&self) -> impl Iterator<Item = ((f64, f64), f64)> + '_ {
        let total = self.total;
        self.cells
            .iter()
            .map(move |(&(i, j), &v)| ((f64::from(i), f64::from(j)), v / total))
    }

    /// One statistic, always computed on the probability-normalized matrix.
    pub fn property(&self, feature: TextureFeature) -> f64 {
        if self.total <= 0.0 {
            return match feature {
                TextureFeature::Correlation => 1.0,
                _ => 0.0,
            };
        }
        match feature {
            TextureFeature::Contrast => self.probabilities().map(|((i, j), p)| p * (i - j).powi(2)).sum(),
            TextureFeature::Dissimilarity => self.probabilities().map(|((i, j), p)| p * (i - j).abs()).sum(),
            TextureFeature::Homogeneity => self
                .probabilities()
                .map(|((i, j), p)| p / (1.0 + (i - j).powi(2)))
                .sum(),
            TextureFeature::Asm => self.asm(),
            TextureFeature::Energy => self.asm().sqrt(),
            TextureFeature::Correlation => self.correlation(),
        }
    }

    fn asm(&self) -> f64 {
        self.probabilities().map(|(_, p)| p * p).sum()
    }

    fn correlation(&self) -> f64 {
        let (mut mean_i, mut mean_j) = (0.0, 0.0);
        for ((i, j), p) in self.probabilities() {
            mean_i += i * p;
            mean_j += j * p;
        }
        let (mut var_i, mut var_j, mut cov) = (0.0, 0.0, 0.0);
        for ((i, j), p) in self.probabilities() {
            var_i += p * (i - mean_i).powi(2);
            var_j += p * (j - mean_j).powi(2);
            cov += p * (i - mean_i) * (j - mean_j);
        }
        let (std_i, std_j) = (var_i.sqrt(), var_j.sqrt());
        if std_i < MIN_STD || std_j < MIN_STD {
            1.0
        } else {
            cov / (std_i * std_j)
        }
    }
}

/// Quantize a window and average each requested statistic over `angles`.
pub fn window_properties(
    quantized: &[u16],
    width: usize,
    distance: u32,
    angles: &[GlcmAngle],
    symmetric: bool,
    normalize: bool,
    features: &[TextureFeature],
) -> Vec<f64> {
    let matrices: Vec<CoMatrix> = angles
        .iter()
        .map(|&a| CoMatrix::build(quantized, width, offset(a, distance), symmetric, normalize))
        .collect();
    features
        .iter()
        .map(|&f| {
            let sum: f64 = matrices.iter().map(|m| m.property(f)).sum();
            sum / matrices.len().max(1) as f64
        })
        .collect()
}
