use camino::{Utf8Path, Utf8PathBuf};

/// Fixed pixel size used for both width and height of rendered icons.
pub const ICON_SIZE: u32 = 32;

/// Upper bound on simultaneously running rasterizer processes (12 * 1.5, truncated).
pub const MAX_CONCURRENT_RENDERS: usize = 12 * 3 / 2;

/// A single vector-to-raster conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTask {
    pub source_path: Utf8PathBuf,
    pub dest_path: Utf8PathBuf,
    pub size: u32,
}

impl RenderTask {
    /// Build a task for `file_name` inside `source_dir`, writing into `dest_dir`
    /// with the extension swapped for `dest_ext`.
    pub fn new(
        source_dir: &Utf8Path,
        dest_dir: &Utf8Path,
        file_name: &str,
        dest_ext: &str,
        size: u32,
    ) -> Self {
        let source_path = source_dir.join(file_name);
        let dest_path = dest_dir.join(file_name).with_extension(dest_ext);

        Self {
            source_path,
            dest_path,
            size,
        }
    }

    /// Name used in progress output.
    pub fn name(&self) -> &str {
        self.source_path.file_name().unwrap_or(self.source_path.as_str())
    }
}
