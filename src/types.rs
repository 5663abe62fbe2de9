//! Shared types passed between the caller and every pipeline entry point.
//!
//! A pipeline call consumes a [`SourceDescriptor`] and an [`OutputSpec`] and
//! always hands back a [`StatusResult`], wrapped with the produced image in
//! an [`Outcome`]. Failures never cross the pipeline boundary as errors.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A source image picked by the caller: a directory plus a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub directory: PathBuf,
    pub filename: String,
}

impl SourceDescriptor {
    pub fn new(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
        }
    }

    /// Split a full path into directory and file name.
    pub fn from_path(path: &Path) -> Self {
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            directory,
            filename,
        }
    }

    /// True when no file was selected.
    pub fn is_empty(&self) -> bool {
        self.filename.trim().is_empty()
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Where a pipeline should write its result.
///
/// Both fields are optional; [`crate::naming::plan_output_path`] fills the
/// gaps from the source file name and the mode tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSpec {
    pub directory: Option<String>,
    pub filename: Option<String>,
}

impl OutputSpec {
    pub fn new(directory: Option<String>, filename: Option<String>) -> Self {
        Self {
            directory,
            filename,
        }
    }

    /// Directory, with blank input treated as absent.
    pub fn directory(&self) -> Option<&str> {
        self.directory
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// File name, with blank input treated as absent.
    pub fn filename(&self) -> Option<&str> {
        self.filename
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}

/// Human-readable result of a pipeline call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StatusResult {
    pub fn saved(path: PathBuf, message: String) -> Self {
        Self {
            success: true,
            message,
            path: Some(path),
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            path: None,
        }
    }
}

/// Output of a pipeline plus its status.
///
/// `output` is `None` whenever the pipeline could not produce a result. A
/// failed write keeps the computed output but reports `success = false`.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub output: Option<T>,
    pub status: StatusResult,
}

impl<T> Outcome<T> {
    pub fn failed(status: StatusResult) -> Self {
        Self {
            output: None,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.success
    }
}
