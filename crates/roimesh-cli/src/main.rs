//! roimesh - surfaces from labeled NIfTI volumes
//!
//! Batch renders, volume inspection, script playback and the interactive viewer.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

#[derive(Parser)]
#[command(name = "roimesh")]
#[command(author, version, about = "Surfaces from labeled NIfTI volumes")]
#[command(long_about = "
Extracts per-label surfaces from a NIfTI label volume and renders them.

Examples:
  roimesh info atlas.nii.gz                        # Dimensions and labels
  roimesh render -i atlas.nii.gz --label 3 --screenshot l3.png
  roimesh render -i brain.nii.gz --threshold 120 --view top
  roimesh multi -i atlas.nii.gz --labels 1,2,5 --screenshot sel.png
  roimesh multi -i atlas.nii.gz --values roi.csv --colormap magma
  roimesh script session.txt                       # Headless playback
  roimesh gui atlas.nii.gz                         # Interactive session
  roimesh demo demo.nii.gz                         # Synthetic test volume
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write the log to this file
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one surface: a label mask or a raw threshold
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Render several labels with palette or colormap colors
    #[command(visible_alias = "m")]
    Multi(MultiArgs),

    /// Display volume information and labels
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Open the interactive session window
    #[command(visible_alias = "view")]
    Gui(GuiArgs),

    /// Play a session script headlessly
    Script(ScriptArgs),

    /// Write a synthetic multi-label volume
    Demo(DemoArgs),
}

/// Surface extraction settings shared by `render` and `multi`.
#[derive(Args, Clone)]
struct SurfaceArgs {
    /// Gaussian smoothing sigma before marching cubes
    #[arg(long, default_value = "1.0")]
    sigma: f32,

    /// Number of smoothing iterations on the mesh
    #[arg(long, default_value = "50")]
    smooth_iter: usize,

    /// Relaxation factor for mesh smoothing
    #[arg(long, default_value = "0.1")]
    smooth_relax: f32,
}

/// Output settings shared by `render` and `multi`.
#[derive(Args, Clone)]
struct OutputArgs {
    /// Background color (#RRGGBB, #RGB or a name)
    #[arg(long, default_value = "white")]
    background: String,

    /// Camera preset: iso, left, right, top, front
    #[arg(long, default_value = "iso")]
    view: String,

    /// Render off-screen and save a PNG here; otherwise open a preview
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Draw triangle edges on the mesh
    #[arg(long)]
    show_edges: bool,

    /// Rendering style: 3d or 2d
    #[arg(long, default_value = "3d")]
    style: String,
}

#[derive(Args)]
struct RenderArgs {
    /// Path to .nii or .nii.gz file
    #[arg(short, long)]
    input: PathBuf,

    /// Extract the surface of this label value (mask == label, threshold 0.5)
    #[arg(long)]
    label: Option<f64>,

    /// Iso-value used when --label is not given
    #[arg(long, default_value = "0.5")]
    threshold: f32,

    /// Mesh color
    #[arg(long, default_value = "#4C78A8")]
    color: String,

    /// Output size WxH
    #[arg(long, default_value = "1024x768")]
    size: String,

    #[command(flatten)]
    surface: SurfaceArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct MultiArgs {
    /// Path to .nii or .nii.gz file
    #[arg(short, long)]
    input: PathBuf,

    /// Labels to render (default: all)
    #[arg(long, value_delimiter = ',')]
    labels: Vec<f64>,

    /// ROI value table (CSV/TSV) to color labels through a colormap
    #[arg(long)]
    values: Option<PathBuf>,

    /// Colormap used with --values
    #[arg(long, default_value = "viridis")]
    colormap: String,

    /// Output size WxH
    #[arg(long, default_value = "1200x800")]
    size: String,

    #[command(flatten)]
    surface: SurfaceArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct InfoArgs {
    /// Input volume(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Voxel count per label
    #[arg(short, long)]
    counts: bool,
}

#[derive(Args)]
struct GuiArgs {
    /// Volume to open (default: the last one)
    input: Option<PathBuf>,

    /// Quiet period before a scheduled render, in milliseconds
    #[arg(long, default_value = "80")]
    debounce_ms: u64,
}

#[derive(Args)]
struct ScriptArgs {
    /// Script file
    script: PathBuf,

    /// Initial output size WxH
    #[arg(long, default_value = "1024x768")]
    size: String,
}

#[derive(Args)]
struct DemoArgs {
    /// Output volume (.nii or .nii.gz)
    output: PathBuf,

    /// Grid size along each axis
    #[arg(short = 'n', long, default_value = "48")]
    size: usize,

    /// Sample type: u8, i16, f32, ...
    #[arg(short = 'd', long, default_value = "u8")]
    datatype: String,

    /// Also write a matching ROI value table
    #[arg(long)]
    values: Option<PathBuf>,
}

/// Installs the stderr subscriber and, with `--log`, a file writer.
///
/// `RUST_LOG` wins over `-v` when set. The returned guard flushes the file
/// writer on drop.
fn init_logging(verbose: u8, log: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(stderr);

    match log {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir.unwrap_or(std::path::Path::new(".")), name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .context("Failed to install logger")?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init().context("Failed to install logger")?;
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_ref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Render(args) => commands::render::run(args, cli.verbose),
        Commands::Multi(args) => commands::multi::run(args, cli.verbose),
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Gui(args) => commands::gui::run(args, cli.verbose),
        Commands::Script(args) => commands::script::run(args, cli.verbose),
        Commands::Demo(args) => commands::demo::run(args, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_defaults() {
        let cli = Cli::try_parse_from(["roimesh", "render", "-i", "a.nii"]).unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.threshold, 0.5);
        assert_eq!(args.color, "#4C78A8");
        assert_eq!(args.size, "1024x768");
        assert_eq!(args.surface.sigma, 1.0);
        assert_eq!(args.surface.smooth_iter, 50);
        assert_eq!(args.output.view, "iso");
        assert_eq!(args.output.background, "white");
        assert!(args.output.screenshot.is_none());
        assert!(!args.output.show_edges);
    }

    #[test]
    fn multi_label_list() {
        let cli = Cli::try_parse_from([
            "roimesh", "-vv", "multi", "-i", "a.nii", "--labels", "1,2,5",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Multi(args) = cli.command else {
            panic!("expected multi");
        };
        assert_eq!(args.labels, vec![1.0, 2.0, 5.0]);
        assert_eq!(args.size, "1200x800");
    }
}
