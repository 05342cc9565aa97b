//! Volume info command.
//!
//! Displays geometry, sample type and the label list of NIfTI volumes.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::trace;

use crate::InfoArgs;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    for path in &args.input {
        trace!(path = %path.display(), "info::run");
        print_info(path, args.counts || verbose > 0)?;
        if args.input.len() > 1 {
            println!();
        }
    }
    Ok(())
}

fn print_info(path: &Path, counts: bool) -> Result<()> {
    let file_size = fs::metadata(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?
        .len();
    let nifti = roimesh_io::nifti::read(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?;
    let header = &nifti.header;
    let volume = &nifti.volume;

    let [nx, ny, nz] = volume.dims();
    let s = volume.spacing();
    let o = volume.origin();
    let (lo, hi) = volume.value_range();
    let labels = volume.labels();

    println!("{}", path.display());
    println!("  Dimensions: {nx} x {ny} x {nz}");
    println!("  Spacing:    {:.4} x {:.4} x {:.4}", s.x, s.y, s.z);
    println!("  Origin:     ({:.4}, {:.4}, {:.4})", o.x, o.y, o.z);
    println!("  Datatype:   {}", header.datatype.name());
    if let Some((slope, inter)) = header.scaling() {
        println!("  Scaling:    x{slope} + {inter}");
    }
    if header.frames() > 1 {
        println!("  Frames:     {} (first shown)", header.frames());
    }
    println!("  Values:     [{lo}, {hi}]");
    println!("  File size:  {}", format_size(file_size));
    println!("  Labels:     {}", labels.len());

    if counts {
        for label in &labels {
            println!("    {:>6}  {} voxels", label.to_string(), volume.voxel_count(*label));
        }
    } else if !labels.is_empty() {
        let list: Vec<String> = labels.iter().map(ToString::to_string).collect();
        println!("    {}", list.join(" "));
    }
    Ok(())
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
