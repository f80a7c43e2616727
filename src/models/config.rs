use super::task::{ICON_SIZE, MAX_CONCURRENT_RENDERS};
use serde::{Deserialize, Serialize};

/// Pipeline configuration from icon-pipeline.yaml
///
/// Holds the defaults for both the index extractor and the renderer.
/// Command-line flags take precedence over anything loaded here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(rename = "Index", default)]
    pub index: IndexSettings,

    #[serde(rename = "Render", default)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Directory containing fileIcons.ts and folderIcons.ts
    #[serde(rename = "Source Dir", default = "default_index_source_dir")]
    pub source_dir: String,

    #[serde(rename = "Output Dir", default = "default_output_dir")]
    pub output_dir: String,

    /// Keyword of the line that opens the icon list
    #[serde(rename = "Marker", default = "default_marker")]
    pub marker: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            source_dir: default_index_source_dir(),
            output_dir: default_output_dir(),
            marker: default_marker(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(rename = "Source Dir", default = "default_render_source_dir")]
    pub source_dir: String,

    #[serde(rename = "Dest Dir", default = "default_output_dir")]
    pub dest_dir: String,

    #[serde(rename = "Size", default = "default_size")]
    pub size: u32,

    #[serde(rename = "Max Concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Rasterizer executable, looked up on PATH
    #[serde(rename = "Tool", default = "default_tool")]
    pub tool: String,

    #[serde(rename = "Source Extension", default = "default_source_ext")]
    pub source_ext: String,

    #[serde(rename = "Dest Extension", default = "default_dest_ext")]
    pub dest_ext: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            source_dir: default_render_source_dir(),
            dest_dir: default_output_dir(),
            size: default_size(),
            max_concurrency: default_max_concurrency(),
            tool: default_tool(),
            source_ext: default_source_ext(),
            dest_ext: default_dest_ext(),
        }
    }
}

fn default_index_source_dir() -> String {
    "external/icons/src/icons".to_string()
}

fn default_render_source_dir() -> String {
    "external/icons/icons".to_string()
}

fn default_output_dir() -> String {
    "icons".to_string()
}

fn default_marker() -> String {
    "icons:".to_string()
}

fn default_size() -> u32 {
    ICON_SIZE
}

fn default_max_concurrency() -> usize {
    MAX_CONCURRENT_RENDERS
}

fn default_tool() -> String {
    "inkscape".to_string()
}

fn default_source_ext() -> String {
    "svg".to_string()
}

fn default_dest_ext() -> String {
    "png".to_string()
}
