//! Data models for the icon pipeline.
//!
//! - [`IconRecord`]: one entry scanned from an icon definition file, with its [`Matcher`]s
//! - [`IndexKind`]: file-icon or folder-icon index, which decides recognised fields and header
//! - [`RenderTask`]: one SVG to PNG conversion
//! - [`PipelineConfig`]: defaults loaded from `icon-pipeline.yaml`
//! - [`MAX_CONCURRENT_RENDERS`]: ceiling on simultaneously running rasterizer processes

pub mod config;
pub mod icon;
pub mod task;

pub use config::{IndexSettings, PipelineConfig, RenderSettings};
pub use icon::{IconField, IconRecord, IndexKind, Matcher};
pub use task::{ICON_SIZE, MAX_CONCURRENT_RENDERS, RenderTask};
