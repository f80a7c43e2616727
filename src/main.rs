//! icon-pipeline - command-line entry point.
//!
//! # Commands
//!
//! - `index`: parse `fileIcons.ts` / `folderIcons.ts` and write
//!   `file_icon_index.txt` / `folder_icon_index.txt`
//! - `render`: rasterize every SVG of a directory into fixed-size PNGs with
//!   up to 18 Inkscape processes at once
//! - `init-config`: write `icon-pipeline.yaml` with the default settings
//!
//! Defaults come from `icon-pipeline.yaml` in `--config-dir`; flags override them.
//! Every failure is fatal: the error is printed and the process exits non-zero.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use icon_pipeline::services::print_progress;
use icon_pipeline::{
    APP_NAME, ConfigManager, IndexKind, IndexService, InkscapeRasterizer, PipelineConfig,
    RenderService, VERSION,
};

/// Icon index extraction and parallel SVG rasterization.
#[derive(Parser)]
#[command(name = "icon-pipeline", version, about)]
struct Cli {
    /// Directory containing icon-pipeline.yaml
    #[arg(long, global = true, default_value = ".")]
    config_dir: Utf8PathBuf,

    /// Directory for rotating log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Mirror log records to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate icon index files from icon definition sources.
    Index(IndexArgs),
    /// Render SVG icons to PNG with an external rasterizer.
    Render(RenderArgs),
    /// Write the default configuration file.
    InitConfig,
}

#[derive(clap::Args)]
struct IndexArgs {
    /// Directory containing fileIcons.ts and folderIcons.ts
    #[arg(long)]
    source_dir: Option<Utf8PathBuf>,

    /// Directory receiving the index files
    #[arg(long)]
    output_dir: Option<Utf8PathBuf>,

    /// Which index to generate
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    kind: KindArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    File,
    Folder,
    All,
}

impl KindArg {
    fn kinds(self) -> &'static [IndexKind] {
        match self {
            KindArg::File => &[IndexKind::File],
            KindArg::Folder => &[IndexKind::Folder],
            KindArg::All => &IndexKind::ALL,
        }
    }
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Directory of SVG files
    #[arg(long)]
    source_dir: Option<Utf8PathBuf>,

    /// Directory receiving the PNG files
    #[arg(long)]
    dest_dir: Option<Utf8PathBuf>,

    /// Output width and height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    size: Option<u32>,

    /// Maximum number of rasterizer processes running at once
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Rasterizer executable
    #[arg(long)]
    tool: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = icon_pipeline::logging::setup_logging_with_console(
        &cli.log_dir,
        APP_NAME,
        cli.debug,
        cli.verbose,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&cli.config_dir);

    let result = match cli.command {
        Commands::Index(args) => run_index(&config_manager, args),
        Commands::Render(args) => run_render(&config_manager, args),
        Commands::InitConfig => config_manager.save_config(&PipelineConfig::default()),
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

fn run_index(config_manager: &ConfigManager, args: IndexArgs) -> Result<()> {
    let settings = config_manager.load_config()?.index;

    let source_dir = args
        .source_dir
        .unwrap_or_else(|| Utf8PathBuf::from(&settings.source_dir));
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| Utf8PathBuf::from(&settings.output_dir));

    let service = IndexService::new(settings.marker);
    service.generate_all(&source_dir, &output_dir, args.kind.kinds())?;

    Ok(())
}

fn run_render(config_manager: &ConfigManager, args: RenderArgs) -> Result<()> {
    let mut settings = config_manager.load_config()?.render;

    if let Some(dir) = args.source_dir {
        settings.source_dir = dir.into_string();
    }
    if let Some(dir) = args.dest_dir {
        settings.dest_dir = dir.into_string();
    }
    if let Some(size) = args.size {
        settings.size = size;
    }
    if let Some(jobs) = args.jobs {
        settings.max_concurrency = jobs;
    }
    if let Some(tool) = args.tool {
        settings.tool = tool;
    }

    println!("Source directory: {}", settings.source_dir);
    println!("Destination directory: {}", settings.dest_dir);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("icon-render")
        .build()
        .context("Failed to create tokio runtime")?;

    let service = RenderService::new(
        InkscapeRasterizer::new(settings.tool.clone()),
        settings.max_concurrency,
    )?;

    let result = runtime.block_on(service.render_directory(&settings, print_progress));

    // Terminate the overwritten progress line
    println!();
    service.metrics().log_summary();

    let summary = result?;
    println!(
        "Rendered {} icons in {:.2}s",
        summary.rendered,
        summary.elapsed.as_secs_f32()
    );

    Ok(())
}
