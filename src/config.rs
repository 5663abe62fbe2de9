//! Workbench configuration.
//!
//! Settings come from `workbench.toml` in the working directory, or from a
//! file named with `--config`. The file is sparse: it is merged key by key
//! over the stock defaults, so it only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! default_dir = "output"      # Root for auto-placed results
//! features_dir = "features"   # Texture exports, under default_dir
//!
//! [svg]
//! canvas_size = 1024          # Square canvas SVG sources are rendered onto
//!
//! [texture]
//! window_size = 16            # GLCM window side in pixels
//! step_size = 8               # Window stride
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "workbench.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Workbench configuration loaded from `workbench.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkbenchConfig {
    /// Where results go when the caller names no directory.
    pub output: OutputConfig,
    /// SVG rasterization.
    pub svg: SvgConfig,
    /// Sliding-window texture extraction.
    pub texture: TextureConfig,
}

impl WorkbenchConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.default_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.default_dir must not be empty".into(),
            ));
        }
        if self.output.features_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.features_dir must not be empty".into(),
            ));
        }
        if !(SvgConfig::MIN_CANVAS..=SvgConfig::MAX_CANVAS).contains(&self.svg.canvas_size) {
            return Err(ConfigError::Validation(format!(
                "svg.canvas_size must be {}-{}",
                SvgConfig::MIN_CANVAS,
                SvgConfig::MAX_CANVAS
            )));
        }
        if self.texture.window_size < TextureConfig::MIN_WINDOW {
            return Err(ConfigError::Validation(format!(
                "texture.window_size must be at least {}",
                TextureConfig::MIN_WINDOW
            )));
        }
        if self.texture.step_size == 0 || self.texture.step_size >= self.texture.window_size {
            return Err(ConfigError::Validation(
                "texture.step_size must be non-zero and smaller than texture.window_size".into(),
            ));
        }
        Ok(())
    }

    pub fn default_dir(&self) -> PathBuf {
        PathBuf::from(self.output.default_dir.trim())
    }

    /// `<default_dir>/<features_dir>`.
    pub fn features_dir(&self) -> PathBuf {
        self.default_dir().join(self.output.features_dir.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub default_dir: String,
    pub features_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: "output".to_string(),
            features_dir: "features".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SvgConfig {
    /// Side of the square canvas, in pixels.
    pub canvas_size: u32,
}

impl SvgConfig {
    pub const MIN_CANVAS: u32 = 16;
    pub const MAX_CANVAS: u32 = 8192;
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self { canvas_size: 1024 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextureConfig {
    pub window_size: u32,
    pub step_size: u32,
}

impl TextureConfig {
    pub const MIN_WINDOW: u32 = 8;
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            window_size: 16,
            step_size: 8,
        }
    }
}

// =============================================================================
// Loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(WorkbenchConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<WorkbenchConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: WorkbenchConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `workbench.toml` from `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<WorkbenchConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Load a specific config file, falling back to stock defaults if absent.
pub fn load_config_file(path: &Path) -> Result<WorkbenchConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value()?, overlay)
}

/// A fully-commented stock `workbench.toml`. Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Workbench Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output placement
# ---------------------------------------------------------------------------
[output]
# Results without an explicit directory go to <default_dir>/<source stem>/.
default_dir = "output"

# Texture exports without an explicit directory go to <default_dir>/<features_dir>/.
features_dir = "features"

# ---------------------------------------------------------------------------
# SVG sources
# ---------------------------------------------------------------------------
[svg]
# SVGs are rendered centered on a white square canvas of this side (pixels).
canvas_size = 1024

# ---------------------------------------------------------------------------
# Texture features
# ---------------------------------------------------------------------------
[texture]
# Side of the square GLCM window, in pixels (at least 8).
window_size = 16

# Distance between window origins. Must be smaller than window_size.
step_size = 8
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.output.default_dir, "output");
        assert_eq!(config.svg.canvas_size, 1024);
        assert_eq!(config.texture.window_size, 16);
        assert_eq!(config.texture.step_size, 8);
        assert_eq!(config.features_dir(), PathBuf::from("output/features"));
    }

    #[test]
    fn parse_partial_config() {
        let config: WorkbenchConfig = toml::from_str("[texture]\nstep_size = 4\n").unwrap();
        assert_eq!(config.texture.step_size, 4);
        // Default values preserved
        assert_eq!(config.texture.window_size, 16);
        assert_eq!(config.output.default_dir, "output");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<WorkbenchConfig, _> = toml::from_str("[svg]\ncanvas = 10\n");
        assert!(result.is_err());
    }

    #[test]
    fn stock_toml_parses_to_defaults() {
        let config: WorkbenchConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, WorkbenchConfig::default());
    }

    #[test]
    fn merge_overrides_nested_keys_only() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[output]\ndefault_dir = \"results\"\n").unwrap();
        let merged: WorkbenchConfig = merge_toml(base, overlay).try_into().unwrap();
        assert_eq!(merged.output.default_dir, "results");
        assert_eq!(merged.output.features_dir, "features");
        assert_eq!(merged.svg.canvas_size, 1024);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = WorkbenchConfig::default();
        config.texture.step_size = 16;
        assert!(config.validate().is_err());

        let mut config = WorkbenchConfig::default();
        config.texture.window_size = 4;
        config.texture.step_size = 2;
        assert!(config.validate().is_err());

        let mut config = WorkbenchConfig::default();
        config.svg.canvas_size = 0;
        assert!(config.validate().is_err());

        let mut config = WorkbenchConfig::default();
        config.output.default_dir = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, WorkbenchConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[svg]\ncanvas_size = 256\n[texture]\nwindow_size = 32\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.svg.canvas_size, 256);
        assert_eq!(config.texture.window_size, 32);
        assert_eq!(config.texture.step_size, 8);
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[texture]\nstep_size = 0\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        fs::write(&path, "[svg\ncanvas_size = ").unwrap();
        assert!(matches!(load_config_file(&path), Err(ConfigError::Toml(_))));
    }
}
