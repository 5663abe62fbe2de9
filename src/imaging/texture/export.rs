//! Writing an extraction session to disk.
//!
//! ```text
//! <dir>/<base>_Contrast.png     one per feature, own color scale
//! <dir>/<base>_combined.png     grid on a shared scale
//! <dir>/<base>_stats.csv        Feature,Mean,Std Dev,Min,Max
//! ```

use super::render::{combined_figure, feature_figure};
use super::TextureSession;
use crate::imaging::stage::{ImagingError, Result};
use image::RgbImage;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "Feature,Mean,Std Dev,Min,Max";

/// Files written by [`save_session`], in write order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFeatures {
    pub directory: PathBuf,
    pub files: Vec<String>,
}

impl SavedFeatures {
    /// `<dir>/<file>, <file>, ...`
    pub fn listing(&self) -> String {
        format!("{}/{}", self.directory.display(), self.files.join(", "))
    }
}

/// Summary statistics as CSV with five decimals.
pub fn stats_csv(session: &TextureSession) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for layer in &session.layers {
        let s = &layer.summary;
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{},{:.5},{:.5},{:.5},{:.5}",
            layer.feature.name(),
            s.mean,
            s.std,
            s.min,
            s.max
        );
    }
    out
}

fn write_png(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|e| ImagingError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write every feature figure, the combined figure and the stats table.
///
/// The directory is created if needed. An empty session is an error.
pub fn save_session(session: &TextureSession, dir: &Path, base: &str) -> Result<SavedFeatures> {
    if session.is_empty() {
        return Err(ImagingError::ProcessingFailed("No features to save".to_string()));
    }
    std::fs::create_dir_all(dir)?;

    let mut files = Vec::with_capacity(session.layers.len() + 2);
    for layer in &session.layers {
        let name = format!("{base}_{}.png", layer.feature.name());
        write_png(&feature_figure(layer), &dir.join(&name))?;
        files.push(name);
    }

    let combined = format!("{base}_combined.png");
    write_png(&combined_figure(&session.layers), &dir.join(&combined))?;
    files.push(combined);

    let csv = format!("{base}_stats.csv");
    let csv_path = dir.join(&csv);
    std::fs::write(&csv_path, stats_csv(session)).map_err(|e| ImagingError::Write {
        path: csv_path.clone(),
        reason: e.to_string(),
    })?;
    files.push(csv);

    tracing::info!(dir = %dir.display(), files = files.len(), "texture features saved");
    Ok(SavedFeatures {
        directory: dir.to_path_buf(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::texture::{
        FeatureLayer, FeatureMap, FeatureSummary, TextureFeature,
    };
    use image::Luma;
    use tempfile::TempDir;

    fn session() -> TextureSession {
        let layers = [TextureFeature::Contrast, TextureFeature::Asm]
            .into_iter()
            .map(|feature| {
                let map = FeatureMap::from_fn(12, 8, |x, _| Luma([x as f32 / 11.0]));
                FeatureLayer {
                    feature,
                    summary: FeatureSummary::of(&map),
                    map,
                }
            })
            .collect();
        TextureSession {
            source_name: "bark.png".to_string(),
            layers,
        }
    }

    #[test]
    fn csv_has_header_and_five_decimals() {
        let csv = stats_csv(&session());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Contrast,0.50000,"));
        assert!(lines[2].starts_with("ASM,"));
        assert!(lines[2].ends_with(",0.00000,1.00000"));
    }

    #[test]
    fn save_writes_all_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("features");
        let saved = save_session(&session(), &dir, "bark").unwrap();
        assert_eq!(
            saved.files,
            vec![
                "bark_Contrast.png",
                "bark_ASM.png",
                "bark_combined.png",
                "bark_stats.csv"
            ]
        );
        for f in &saved.files {
            assert!(dir.join(f).exists(), "{f} missing");
        }
        let combined = image::open(dir.join("bark_combined.png")).unwrap();
        assert!(combined.width() > 24);
        assert!(saved.listing().ends_with("bark_stats.csv"));
    }

    #[test]
    fn empty_session_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let empty = TextureSession {
            source_name: "x.png".to_string(),
            layers: vec![],
        };
        let err = save_session(&empty, tmp.path(), "x").unwrap_err();
        assert_eq!(err.to_string(), "No features to save");
    }
}
