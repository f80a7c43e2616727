//! Services module - the two halves of the icon pipeline.
//!
//! # Components
//!
//! - [`extractor`]: reads icon definition files (a flat subset of TypeScript object
//!   literals) and writes pipe-delimited index files. Built on the lazy
//!   [`Tokenizer`], which only surfaces the fields an [`IndexKind`](crate::models::IndexKind)
//!   cares about.
//!
//! - [`renderer`]: converts a directory of SVG files into fixed-size PNGs through an
//!   external [`Rasterizer`] (Inkscape by default). Conversions run as tokio tasks
//!   gated by a semaphore; completions are reported in the order they happen.
//!
//! Both halves are fail-fast: the first error aborts the whole operation and is
//! returned to the caller unchanged.
//!
//! # Usage Example
//!
//! ```ignore
//! use icon_pipeline::services::{IndexService, InkscapeRasterizer, RenderService, print_progress};
//! use icon_pipeline::models::{IndexKind, RenderSettings};
//!
//! IndexService::default().generate_all("external/icons/src/icons".into(), "icons".into(), &IndexKind::ALL)?;
//!
//! let service = RenderService::new(InkscapeRasterizer::default(), 18)?;
//! service.render_directory(&RenderSettings::default(), print_progress).await?;
//! ```

pub mod extractor;
pub mod renderer;
pub mod tokenizer;

pub use extractor::{
    ExtractError, IndexService, build_index, extract_index, parse_records, render_index,
    select_region,
};
pub use renderer::{
    InkscapeRasterizer, Rasterizer, RenderError, RenderProgress, RenderService, RenderSummary,
    discover_tasks, print_progress,
};
pub use tokenizer::{Token, Tokenizer};
