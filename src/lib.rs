//! # Image Workbench
//!
//! A set of image transformation pipelines: aspect rescale, custom resize,
//! crop (single and batch), mask compositing, edge detection, binary
//! morphology and GLCM texture features. Every pipeline takes a source file,
//! runs one or more stages, writes the result under a predictable path and
//! reports a human-readable status.
//!
//! # Architecture: Load → Stages → Persist
//!
//! ```text
//! SourceDescriptor ─► ImageLoader ─► StagePipeline ─► OutputPathResolver ─► file
//!   (dir + name)       (RGB / luma)   (ordered stages)  (<default>/<stem>/...)
//! ```
//!
//! - **Loading** normalizes everything to RGB8 first. SVGs are rasterized on
//!   a white square canvas so later pixel math never sees transparency.
//! - **Stages** implement [`imaging::Stage`]. A pipeline is an ordered list
//!   of them; the tags of the stages that ran form the mode tag
//!   (`aspect_square_binary_blur`), which ends up in the output file name.
//! - **Persisting** derives the output path from the caller's
//!   [`types::OutputSpec`] with [`naming::plan_output_path`].
//!
//! Failures never escape [`workbench::Workbench`]: every call returns a
//! [`types::StatusResult`], so a batch can record a bad file and move on.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`workbench`] | Pipeline entry points; converts errors into statuses |
//! | [`imaging`] | Loader, stages, transforms and texture features |
//! | [`naming`] | Output directory and file name policy |
//! | [`config`] | `workbench.toml` loading, merging and validation |
//! | [`types`] | Source, output spec, status and outcome types |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Parameters Validate Themselves
//!
//! The CLI and scripted callers have no sliders to keep values in range, so
//! every parameter type clamps or rejects at construction: sizes to
//! `1..=8192`, thresholds to `[0, 1]`, blur sigma to `[0.1, 10]`; kernel
//! sizes that are even or above 31 are rejected. Pipelines can then assume
//! valid input.
//!
//! ## Texture State Belongs to the Caller
//!
//! Extraction returns a [`imaging::TextureSession`] and saving borrows it.
//! The workbench keeps no "last result" between calls.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod types;
pub mod workbench;

pub use workbench::Workbench;

#[cfg(test)]
pub(crate) mod test_helpers;
