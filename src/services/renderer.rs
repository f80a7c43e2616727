use crate::metrics::RenderMetrics;
use crate::models::{RenderSettings, RenderTask};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::future::Future;
use std::io::Write;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Errors that can occur while rendering icons
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Rasterizer '{tool}' is not available ({reason}), please install it")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Failed to read source directory {dir}: {source}")]
    SourceDir {
        dir: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create destination directory {dir}: {source}")]
    DestDir {
        dir: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start rasterizer for \"{file}\": {source}")]
    Spawn {
        file: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Conversion of \"{file}\" failed (exit code {code:?})")]
    ConversionFailed { file: Utf8PathBuf, code: Option<i32> },

    #[error("Render task panicked: {0}")]
    TaskPanicked(String),

    #[error("Render scheduler closed: {0}")]
    SchedulerClosed(#[from] AcquireError),

    #[error("Max concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Icon size must be at least 1 pixel")]
    InvalidSize,
}

/// An external program that turns one vector file into a raster file.
pub trait Rasterizer: Send + Sync + 'static {
    /// Make sure the tool can be run at all. Returns its version string.
    fn check_available(&self) -> impl Future<Output = Result<String, RenderError>> + Send;

    /// Convert `task.source_path` into `task.dest_path` at `task.size` pixels square.
    fn rasterize(&self, task: &RenderTask)
    -> impl Future<Output = Result<(), RenderError>> + Send;
}

/// Inkscape command-line rasterizer
///
/// Runs `inkscape -o <dest> -w <size> -h <size> <source>` for each file with
/// its output discarded.
#[derive(Debug, Clone)]
pub struct InkscapeRasterizer {
    program: String,
}

impl InkscapeRasterizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for InkscapeRasterizer {
    fn default() -> Self {
        Self::new("inkscape")
    }
}

impl Rasterizer for InkscapeRasterizer {
    async fn check_available(&self) -> Result<String, RenderError> {
        let output = Command::new(&self.program)
            .arg("-V")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| RenderError::ToolUnavailable {
                tool: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(RenderError::ToolUnavailable {
                tool: self.program.clone(),
                reason: format!("version check exited with {}", output.status),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::info!("Rasterizer available: {}", version);
        Ok(version)
    }

    async fn rasterize(&self, task: &RenderTask) -> Result<(), RenderError> {
        let size = task.size.to_string();

        let status = Command::new(&self.program)
            .arg("-o")
            .arg(task.dest_path.as_str())
            .arg("-w")
            .arg(&size)
            .arg("-h")
            .arg(&size)
            .arg(task.source_path.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| RenderError::Spawn {
                file: task.source_path.clone(),
                source,
            })?;

        if !status.success() {
            return Err(RenderError::ConversionFailed {
                file: task.source_path.clone(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// List every `source_ext` file in `source_dir`, sorted by name, as render tasks.
pub fn discover_tasks(
    source_dir: &Utf8Path,
    dest_dir: &Utf8Path,
    size: u32,
    source_ext: &str,
    dest_ext: &str,
) -> Result<Vec<RenderTask>, RenderError> {
    let source_err = |source| RenderError::SourceDir {
        dir: source_dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(source_err)? {
        let entry = entry.map_err(source_err)?;
        if entry.file_type().map_err(source_err)?.is_dir() {
            continue;
        }

        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!("Skipping non UTF-8 file name in {}", source_dir);
            continue;
        };
        if Utf8Path::new(&name).extension() == Some(source_ext) {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .iter()
        .map(|name| RenderTask::new(source_dir, dest_dir, name, dest_ext, size))
        .collect())
}

/// Progress event emitted once per finished conversion, in completion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress<'a> {
    pub done: usize,
    pub total: usize,
    pub name: &'a str,
}

/// Write a progress event as a single overwritten console line.
pub fn print_progress(progress: RenderProgress<'_>) {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(
        stdout,
        "\rDone: {}/{} - {}{}",
        progress.done,
        progress.total,
        progress.name,
        " ".repeat(40)
    );
    let _ = stdout.flush();
}

/// Outcome of a successful batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

type Finished = (OwnedSemaphorePermit, Result<String, RenderError>);

/// Service that runs a batch of conversions with bounded concurrency
///
/// A conversion takes a semaphore permit before it is spawned and hands it back
/// with its result; the permit is released once the scheduler has seen that
/// result. No more than `max_concurrency` processes exist at once, and a slot
/// is never reused before the previous occupant's outcome is known. The first
/// failed conversion ends the batch: nothing new is launched and the error is
/// returned once the conversions still running have been aborted and their
/// processes killed.
pub struct RenderService<R: Rasterizer> {
    rasterizer: Arc<R>,
    max_concurrency: usize,
    metrics: Arc<RenderMetrics>,
}

impl<R: Rasterizer> RenderService<R> {
    pub fn new(rasterizer: R, max_concurrency: usize) -> Result<Self, RenderError> {
        if max_concurrency == 0 {
            return Err(RenderError::InvalidConcurrency);
        }

        Ok(Self {
            rasterizer: Arc::new(rasterizer),
            max_concurrency,
            metrics: Arc::new(RenderMetrics::new()),
        })
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// Verify the rasterizer before any work is scheduled.
    pub async fn preflight(&self) -> Result<String, RenderError> {
        self.rasterizer.check_available().await
    }

    /// Run `tasks` in order, reporting every completion through `on_progress`.
    pub async fn run<F>(
        &self,
        tasks: Vec<RenderTask>,
        mut on_progress: F,
    ) -> Result<RenderSummary, RenderError>
    where
        F: FnMut(RenderProgress<'_>),
    {
        if tasks.iter().any(|task| task.size == 0) {
            return Err(RenderError::InvalidSize);
        }

        let total = tasks.len();
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut in_flight: JoinSet<Finished> = JoinSet::new();
        let mut done = 0;

        tracing::info!(
            "Rendering {} files (max concurrent: {})",
            total,
            self.max_concurrency
        );

        for task in tasks {
            // Collect finished tasks until a slot is free
            let permit = loop {
                tokio::select! {
                    biased;
                    Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                        match Self::finished(joined) {
                            Ok(name) => {
                                done += 1;
                                on_progress(RenderProgress { done, total, name: &name });
                            }
                            Err(e) => return Err(Self::cancel(in_flight, e).await),
                        }
                    }
                    permit = semaphore.clone().acquire_owned() => match permit {
                        Ok(permit) => break permit,
                        Err(e) => return Err(Self::cancel(in_flight, e.into()).await),
                    },
                }
            };

            let rasterizer = Arc::clone(&self.rasterizer);
            let metrics = Arc::clone(&self.metrics);
            tracing::debug!("Starting {}", task.name());

            in_flight.spawn(async move {
                let guard = metrics.track();
                let result = rasterizer.rasterize(&task).await;
                guard.finish(result.is_ok());
                (permit, result.map(|()| task.name().to_string()))
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            match Self::finished(joined) {
                Ok(name) => {
                    done += 1;
                    on_progress(RenderProgress { done, total, name: &name });
                }
                Err(e) => return Err(Self::cancel(in_flight, e).await),
            }
        }

        let summary = RenderSummary {
            rendered: done,
            peak_in_flight: self.metrics.peak(),
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Rendered {} files in {:.2}s",
            summary.rendered,
            summary.elapsed.as_secs_f32()
        );
        Ok(summary)
    }

    /// Preflight, discover and render a whole directory as described by `settings`.
    pub async fn render_directory<F>(
        &self,
        settings: &RenderSettings,
        on_progress: F,
    ) -> Result<RenderSummary, RenderError>
    where
        F: FnMut(RenderProgress<'_>),
    {
        let source_dir = Utf8Path::new(&settings.source_dir);
        let dest_dir = Utf8Path::new(&settings.dest_dir);

        if settings.size == 0 {
            return Err(RenderError::InvalidSize);
        }

        self.preflight().await?;

        let tasks = discover_tasks(
            source_dir,
            dest_dir,
            settings.size,
            &settings.source_ext,
            &settings.dest_ext,
        )?;

        if !dest_dir.exists() {
            fs::create_dir_all(dest_dir).map_err(|source| RenderError::DestDir {
                dir: dest_dir.to_path_buf(),
                source,
            })?;
        }

        self.run(tasks, on_progress).await
    }

    /// Abort every conversion still running and wait until they are gone.
    ///
    /// Aborting drops each rasterizer future, which kills its child process and
    /// records the conversion as aborted. Results that were already in are
    /// discarded; `error` is handed back unchanged.
    async fn cancel(mut in_flight: JoinSet<Finished>, error: RenderError) -> RenderError {
        tracing::warn!(
            "Stopping batch, cancelling {} running conversions",
            in_flight.len()
        );
        in_flight.abort_all();
        while in_flight.join_next().await.is_some() {}
        error
    }

    /// Unpack a joined task. Its permit, if any, is released on return.
    fn finished(joined: Result<Finished, JoinError>) -> Result<String, RenderError> {
        match joined {
            Ok((_permit, Ok(name))) => {
                tracing::debug!("Finished {}", name);
                Ok(name)
            }
            Ok((_permit, Err(e))) => {
                tracing::error!("{}", e);
                Err(e)
            }
            Err(e) => Err(RenderError::TaskPanicked(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_dir(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_discover_tasks_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = utf8_dir(&temp_dir);
        for name in ["b.svg", "a.svg", "notes.txt", "c.SVG", "d.svg.bak"] {
            fs::write(dir.join(name), "<svg/>").unwrap();
        }
        fs::create_dir(dir.join("nested.svg")).unwrap();

        let tasks = discover_tasks(&dir, Utf8Path::new("out"), 32, "svg", "png").unwrap();

        let names: Vec<_> = tasks.iter().map(RenderTask::name).collect();
        assert_eq!(names, vec!["a.svg", "b.svg"]);
        assert_eq!(tasks[0].dest_path, Utf8PathBuf::from("out/a.png"));
    }

    #[test]
    fn test_discover_tasks_missing_dir() {
        let err = discover_tasks(
            Utf8Path::new("/definitely/not/here"),
            Utf8Path::new("out"),
            32,
            "svg",
            "png",
        )
        .unwrap_err();

        assert!(matches!(err, RenderError::SourceDir { .. }));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(matches!(
            RenderService::new(InkscapeRasterizer::default(), 0),
            Err(RenderError::InvalidConcurrency)
        ));
    }

    #[tokio::test]
    async fn test_missing_tool_fails_preflight() {
        let service =
            RenderService::new(InkscapeRasterizer::new("icon-pipeline-no-such-tool"), 2).unwrap();

        let err = service.preflight().await.unwrap_err();
        assert!(matches!(err, RenderError::ToolUnavailable { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_tool_reports_file() {
        let rasterizer = InkscapeRasterizer::new("false");
        let task = RenderTask::new(
            Utf8Path::new("in"),
            Utf8Path::new("out"),
            "broken.svg",
            "png",
            32,
        );

        match rasterizer.rasterize(&task).await {
            Err(RenderError::ConversionFailed { file, code }) => {
                assert_eq!(file, Utf8PathBuf::from("in/broken.svg"));
                assert_eq!(code, Some(1));
            }
            other => panic!("expected conversion failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_succeeding_tool() {
        let rasterizer = InkscapeRasterizer::new("true");
        assert!(rasterizer.check_available().await.is_ok());

        let task = RenderTask::new(Utf8Path::new("in"), Utf8Path::new("out"), "ok.svg", "png", 32);
        assert!(rasterizer.rasterize(&task).await.is_ok());
    }
}
