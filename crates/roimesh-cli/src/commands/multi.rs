//! Multi-label command
//!
//! Renders several labels at once. Colors follow the palette by label
//! ordinal, or a colormap over a value table with `--values`.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use roimesh_color::ColorResolver;
use roimesh_core::Label;
use roimesh_mesh::{LabelMesh, LabelMeshExtractor};
use roimesh_session::MASK_THRESHOLD;
use tracing::{debug, info, trace};

use super::Shot;
use crate::MultiArgs;

pub fn run(args: MultiArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), labels = args.labels.len(), "multi::run");

    let volume = super::load_volume(&args.input)?;
    let all = volume.labels();
    let labels: Vec<Label> = if args.labels.is_empty() {
        all.clone()
    } else {
        args.labels
            .iter()
            .map(|&v| Label::from_value(v).with_context(|| format!("Invalid label: {v}")))
            .collect::<Result<_>>()?
    };
    if labels.is_empty() {
        bail!("{} has no labels", args.input.display());
    }

    let mut colors = ColorResolver::new();
    colors.populate(&all);
    if let Some(path) = &args.values {
        let table = roimesh_io::values::read(path)
            .with_context(|| format!("Failed to load: {}", path.display()))?;
        if !colors.set_values(table) {
            bail!("No valid ROI values found in {}", path.display());
        }
        colors.set_colormap(&args.colormap)?;
        colors.set_use_colormap(true)?;
        colors.auto_range();
        debug!(colormap = %args.colormap, range = ?colors.range(), "colormap coloring");
    }

    let params = args.surface.params(MASK_THRESHOLD);
    params.validate()?;
    let extractor: LabelMeshExtractor = LabelMeshExtractor::default();
    let extracted: Vec<Option<LabelMesh>> = labels
        .par_iter()
        .map(|&label| -> Result<Option<LabelMesh>> {
            let mesh = extractor.extract_label(&volume, label, &params)?;
            Ok(mesh.map(|m| LabelMesh {
                label,
                mesh: Arc::new(m),
            }))
        })
        .collect::<Result<_>>()?;
    let meshes: Vec<LabelMesh> = extracted.into_iter().flatten().collect();

    if meshes.is_empty() {
        return Err(super::no_surface(&args.input, MASK_THRESHOLD));
    }
    info!(requested = labels.len(), extracted = meshes.len(), "labels extracted");
    if verbose > 0 {
        println!("Extracted {} of {} labels", meshes.len(), labels.len());
    }

    let title = format!("roimesh - {}", args.input.display());
    let mut shot = Shot::new(title, &args.output, &args.size)?;
    let drawn: Vec<Label> = meshes.iter().map(|m| m.label).collect();
    shot.colors = colors.resolve(&drawn).into_iter().collect();
    shot.meshes = meshes;
    shot.present(args.output.screenshot.as_ref())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use roimesh_io::nifti::{self, DataType};

    use crate::{Cli, Commands};

    #[test]
    fn colormap_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("demo.nii.gz");
        nifti::write(&input, &super::super::demo::demo_volume(24).unwrap(), DataType::I16).unwrap();
        let values = dir.path().join("roi.csv");
        std::fs::write(&values, "label,value\n1,0.2\n2,0.8\n").unwrap();
        let out = dir.path().join("multi.png");

        let cli = Cli::try_parse_from([
            "roimesh",
            "multi",
            "-i",
            input.to_str().unwrap(),
            "--labels",
            "1,2,9",
            "--values",
            values.to_str().unwrap(),
            "--colormap",
            "magma",
            "--size",
            "60x40",
            "--screenshot",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Multi(args) = cli.command else {
            panic!("expected multi");
        };
        super::run(args, 1).unwrap();

        let png = roimesh_io::png::read(&out).unwrap();
        assert_eq!((png.width, png.height), (60, 40));
    }
}
