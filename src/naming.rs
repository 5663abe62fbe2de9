//! Output path policy shared by every pipeline.
//!
//! A result lands in a directory and under a file name derived from the
//! caller's [`OutputSpec`], the source file name and the pipeline's mode tag:
//!
//! | `OutputSpec` | Result |
//! |---|---|
//! | no directory, or the default directory itself | `<default>/<stem>/` |
//! | explicit directory | that directory |
//! | no file name | `<stem>_<mode_tag><ext>` |
//! | explicit file name | used verbatim |
//!
//! `<ext>` follows the source, except that SVG sources and sources without
//! an extension are written as PNG:
//! - `photo.png` + `aspect_square` → `output/photo/photo_aspect_square.png`
//! - `logo.svg` + `morph_erosion` → `output/logo/logo_morph_erosion.png`

use crate::types::OutputSpec;
use std::path::{Path, PathBuf};

/// Source file name without its extension.
pub fn source_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension (with the dot) an output derived from `filename` gets.
pub fn output_extension(filename: &str) -> String {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.eq_ignore_ascii_case("svg") => format!(".{ext}"),
        _ => ".png".to_string(),
    }
}

/// True when `dir` names the default output directory.
pub fn is_default_dir(dir: &str, default_dir: &Path) -> bool {
    let trimmed = dir.trim().trim_end_matches(['/', '\\']);
    Path::new(trimmed) == default_dir
}

/// Auto-generated file name: `<stem>_<mode_tag><ext>`.
pub fn auto_filename(source_filename: &str, mode_tag: &str) -> String {
    format!(
        "{}_{}{}",
        source_stem(source_filename),
        mode_tag,
        output_extension(source_filename)
    )
}

/// Derive the output path without touching the filesystem.
pub fn plan_output_path(
    spec: &OutputSpec,
    source_filename: &str,
    mode_tag: &str,
    default_dir: &Path,
) -> PathBuf {
    let directory = match spec.directory() {
        Some(dir) if !is_default_dir(dir, default_dir) => PathBuf::from(dir),
        _ => default_dir.join(source_stem(source_filename)),
    };
    let filename = match spec.filename() {
        Some(name) => name.to_string(),
        None => auto_filename(source_filename, mode_tag),
    };
    directory.join(filename)
}

/// [`plan_output_path`], then create the parent directory.
pub fn resolve_output_path(
    spec: &OutputSpec,
    source_filename: &str,
    mode_tag: &str,
    default_dir: &Path,
) -> std::io::Result<PathBuf> {
    let path = plan_output_path(spec, source_filename, mode_tag, default_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(dir: &str, name: &str) -> OutputSpec {
        OutputSpec::new(Some(dir.to_string()), Some(name.to_string()))
    }

    #[test]
    fn blank_spec_goes_to_default_stem_dir() {
        let path = plan_output_path(&spec("", ""), "photo.png", "aspect_square", Path::new("output"));
        assert_eq!(path, PathBuf::from("output/photo/photo_aspect_square.png"));
    }

    #[test]
    fn default_dir_token_is_treated_as_blank() {
        let path = plan_output_path(&spec("output/", ""), "photo.jpg", "crop", Path::new("output"));
        assert_eq!(path, PathBuf::from("output/photo/photo_crop.jpg"));
    }

    #[test]
    fn explicit_directory_and_name_are_used_verbatim() {
        let path = plan_output_path(
            &spec("results", "final.png"),
            "photo.jpg",
            "aspect",
            Path::new("output"),
        );
        assert_eq!(path, PathBuf::from("results/final.png"));
    }

    #[test]
    fn svg_and_extensionless_sources_become_png() {
        assert_eq!(auto_filename("logo.svg", "sobel"), "logo_sobel.png");
        assert_eq!(auto_filename("LOGO.SVG", "sobel"), "LOGO_sobel.png");
        assert_eq!(auto_filename("scan", "morph_original"), "scan_morph_original.png");
    }

    #[test]
    fn extension_case_is_preserved() {
        assert_eq!(auto_filename("IMG_01.JPG", "custom"), "IMG_01_custom.JPG");
    }

    #[test]
    fn stem_keeps_inner_dots() {
        assert_eq!(source_stem("a.b.tiff"), "a.b");
        assert_eq!(auto_filename("a.b.tiff", "stroke"), "a.b_stroke.tiff");
    }

    #[test]
    fn resolve_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let default = tmp.path().join("output");
        let path = resolve_output_path(&OutputSpec::default(), "cat.png", "aspect", &default).unwrap();
        assert_eq!(path, default.join("cat").join("cat_aspect.png"));
        assert!(default.join("cat").is_dir());
    }
}
