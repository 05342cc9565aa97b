//! Demo command
//!
//! Writes a synthetic label volume: two symmetric sphere pairs and a box
//! between them, so every tool can be tried without an atlas.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use roimesh_core::{Vec3, Volume};
use roimesh_io::nifti::{self, DataType};
use tracing::{info, trace};

use crate::DemoArgs;

/// Smallest grid that still resolves every structure.
const MIN_SIZE: usize = 12;

/// Label and value of each structure in the companion table.
const DEMO_VALUES: [(i64, f64); 5] = [(1, 0.20), (2, 0.80), (3, 0.35), (4, 0.65), (5, 0.50)];

pub fn run(args: DemoArgs, verbose: u8) -> Result<()> {
    trace!(output = %args.output.display(), size = args.size, "demo::run");

    let Some(datatype) = DataType::from_name(&args.datatype) else {
        bail!("Unknown datatype: {}", args.datatype);
    };
    let volume = demo_volume(args.size)?;
    nifti::write(&args.output, &volume, datatype)
        .with_context(|| format!("Failed to save: {}", args.output.display()))?;
    info!(path = %args.output.display(), size = args.size, datatype = datatype.name(), "demo volume written");
    println!("Wrote {} ({n}x{n}x{n}, {})", args.output.display(), datatype.name(), n = args.size);

    if let Some(path) = &args.values {
        write_values(path)?;
        println!("Wrote {}", path.display());
    }
    if verbose > 0 {
        println!("Labels: 1 2 3 4 5");
    }
    Ok(())
}

/// An `n`³ volume at 1 mm spacing, centred on the origin.
pub fn demo_volume(n: usize) -> Result<Volume> {
    if n < MIN_SIZE {
        bail!("Demo size must be at least {MIN_SIZE}, got {n}");
    }
    let half = (n as f32 - 1.0) * 0.5;
    let origin = Vec3::splat(-half);
    let nf = n as f32;

    let ellipsoid = |p: Vec3, c: Vec3, r: Vec3| ((p - c) / r).length_squared() <= 1.0;
    let volume = Volume::from_fn([n, n, n], Vec3::ONE, origin, |x, y, z| {
        let p = (Vec3::new(x as f32, y as f32, z as f32) + 0.5) / nf;
        let sphere_r = Vec3::splat(0.12);
        let oblong_r = Vec3::new(0.08, 0.15, 0.07);
        if ellipsoid(p, Vec3::new(0.3, 0.5, 0.58), sphere_r) {
            1.0
        } else if ellipsoid(p, Vec3::new(0.7, 0.5, 0.58), sphere_r) {
            2.0
        } else if ellipsoid(p, Vec3::new(0.35, 0.4, 0.32), oblong_r) {
            3.0
        } else if ellipsoid(p, Vec3::new(0.65, 0.4, 0.32), oblong_r) {
            4.0
        } else if (0.44..=0.56).contains(&p.x) && (0.6..=0.78).contains(&p.y) && (0.3..=0.45).contains(&p.z) {
            5.0
        } else {
            0.0
        }
    })?;
    Ok(volume)
}

fn write_values(path: &Path) -> Result<()> {
    let mut text = String::from("label,value\n");
    for (label, value) in DEMO_VALUES {
        text.push_str(&format!("{label},{value}\n"));
    }
    fs::write(path, text).with_context(|| format!("Failed to save: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roimesh_core::Label;

    #[test]
    fn demo_has_five_labels() {
        let volume = demo_volume(32).unwrap();
        assert_eq!(volume.dims(), [32, 32, 32]);
        let labels: Vec<f32> = volume.labels().iter().map(|l| l.value()).collect();
        assert_eq!(labels, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        // mirrored pairs, up to boundary rounding
        let close = |a: usize, b: usize| a.abs_diff(b) * 20 <= a.max(b);
        assert!(close(volume.voxel_count(Label(1.0)), volume.voxel_count(Label(2.0))));
        assert!(close(volume.voxel_count(Label(3.0)), volume.voxel_count(Label(4.0))));
    }

    #[test]
    fn demo_rejects_tiny_grids() {
        assert!(demo_volume(4).is_err());
    }

    #[test]
    fn demo_files_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let nii = dir.path().join("demo.nii.gz");
        let csv = dir.path().join("demo.csv");
        run(
            DemoArgs {
                output: nii.clone(),
                size: 24,
                datatype: "i16".into(),
                values: Some(csv.clone()),
            },
            0,
        )
        .unwrap();

        let volume = roimesh_io::nifti::read_volume(&nii).unwrap();
        assert_eq!(volume.labels().len(), 5);
        let table = roimesh_io::values::read(&csv).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get(Label(2.0)), Some(0.80));
    }
}
