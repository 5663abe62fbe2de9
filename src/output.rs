//! CLI output formatting for every pipeline.
//!
//! # Output Format
//!
//! ## Single image
//!
//! ```text
//! Save successful: output/photo/photo_aspect_square.png
//! ```
//!
//! ## Batch crop
//!
//! ```text
//! 001 a.png
//!     Failed to open image: Failed to decode a.png: ...
//! 002 b.png
//!     Save successful: output/b/b_crop_square.png
//! Cropped 1 of 2 images (1 failed)
//! ```
//!
//! ## Texture
//!
//! ```text
//! Contrast       0.21845 ± 0.17420 (min: 0.00000, max: 1.00000)
//! Homogeneity    0.62011 ± 0.20133 (min: 0.00000, max: 1.00000)
//! ```
//!
//! ## List
//!
//! ```text
//! input/ (2 images)
//!     001 cat.png
//!     002 logo.svg
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::texture::SummaryRow;
use crate::types::StatusResult;
use crate::workbench::BatchReport;
use serde::Serialize;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Single pipeline status
// ============================================================================

pub fn format_status(status: &StatusResult) -> Vec<String> {
    vec![status.message.clone()]
}

pub fn print_status(status: &StatusResult) {
    for line in format_status(status) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch crop
// ============================================================================

/// One header per file with its status indented below, then a tally.
pub fn format_batch(report: &BatchReport) -> Vec<String> {
    if report.items.is_empty() {
        return vec!["No supported images found".to_string()];
    }
    let mut lines = Vec::with_capacity(report.items.len() * 2 + 1);
    for (i, item) in report.items.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), item.filename));
        lines.push(format!("{}{}", indent(1), item.status.message));
    }
    let failed = report.failed();
    let tally = format!(
        "Cropped {} of {} images",
        report.succeeded(),
        report.items.len()
    );
    lines.push(if failed > 0 {
        format!("{tally} ({failed} failed)")
    } else {
        tally
    });
    lines
}

pub fn print_batch(report: &BatchReport) {
    for line in format_batch(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Texture summary
// ============================================================================

/// Label column padded to the longest label.
pub fn format_texture_table(rows: &[SummaryRow]) -> Vec<String> {
    let width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|r| {
            if r.detail.is_empty() {
                r.label.clone()
            } else {
                format!("{:<width$}    {}", r.label, r.detail)
            }
        })
        .collect()
}

pub fn print_texture_table(rows: &[SummaryRow]) {
    for line in format_texture_table(rows) {
        println!("{}", line);
    }
}

// ============================================================================
// Image listing
// ============================================================================

pub fn format_image_list(dir: &Path, names: &[String]) -> Vec<String> {
    if names.is_empty() {
        return vec![format!("No supported images in {}", dir.display())];
    }
    let mut lines = vec![format!("{} ({} images)", dir.display(), names.len())];
    lines.extend(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}{} {}", indent(1), format_index(i + 1), name)),
    );
    lines
}

pub fn print_image_list(dir: &Path, names: &[String]) {
    for line in format_image_list(dir, names) {
        println!("{}", line);
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Pretty JSON for `--json` mode.
pub fn format_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
