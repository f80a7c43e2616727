// icon-pipeline - icon index extraction and parallel SVG rasterization
//
// This is the library crate containing the parser, the render scheduler and their models.
// The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::RenderMetrics;
pub use models::{IconRecord, IndexKind, PipelineConfig, RenderTask};
pub use services::{IndexService, InkscapeRasterizer, RenderService};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
