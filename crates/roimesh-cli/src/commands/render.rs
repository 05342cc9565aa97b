//! Render command
//!
//! Single-surface batch mode: either the mask of one label surfaced at 0.5,
//! or the raw volume surfaced at `--threshold`.

use std::sync::Arc;

use anyhow::Result;
use roimesh_core::Label;
use roimesh_mesh::{LabelMesh, LabelMeshExtractor};
use roimesh_session::MASK_THRESHOLD;
use tracing::{info, trace};

use super::Shot;
use crate::RenderArgs;

pub fn run(args: RenderArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), label = ?args.label, threshold = args.threshold, "render::run");

    let volume = super::load_volume(&args.input)?;
    let color = super::parse_color(&args.color, "mesh")?;
    let title = format!("roimesh - {}", args.input.display());
    let mut shot = Shot::new(title, &args.output, &args.size)?;

    let extractor: LabelMeshExtractor = LabelMeshExtractor::default();
    let (label, iso, mesh) = match args.label {
        Some(value) => {
            let params = args.surface.params(MASK_THRESHOLD);
            // Zero and non-finite values match no region: same outcome as an empty mask.
            match Label::from_value(value) {
                Some(label) => (label, MASK_THRESHOLD, extractor.extract_label(&volume, label, &params)?),
                None => (Label(1.0), MASK_THRESHOLD, None),
            }
        }
        None => {
            let params = args.surface.params(args.threshold);
            (Label(1.0), args.threshold, extractor.extract_isosurface(&volume, &params)?)
        }
    };

    let Some(mesh) = mesh else {
        return Err(super::no_surface(&args.input, iso));
    };
    info!(
        points = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "surface extracted"
    );
    if verbose > 0 {
        println!(
            "Extracted {} points, {} triangles from {}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            args.input.display()
        );
    }

    shot.meshes.push(LabelMesh {
        label,
        mesh: Arc::new(mesh),
    });
    shot.colors.insert(label, color);
    shot.present(args.output.screenshot.as_ref())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use roimesh_io::nifti::{self, DataType};

    use crate::{Cli, Commands};

    fn render_args(argv: &[&str]) -> crate::RenderArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Render(args) => args,
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn label_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("demo.nii.gz");
        nifti::write(&input, &super::super::demo::demo_volume(24).unwrap(), DataType::U8).unwrap();
        let out = dir.path().join("l5.png");

        let args = render_args(&[
            "roimesh",
            "render",
            "-i",
            input.to_str().unwrap(),
            "--label",
            "5",
            "--size",
            "64x48",
            "--view",
            "left",
            "--screenshot",
            out.to_str().unwrap(),
        ]);
        super::run(args, 0).unwrap();

        let png = roimesh_io::png::read(&out).unwrap();
        assert_eq!((png.width, png.height), (64, 48));
    }

    #[test]
    fn absent_label_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("demo.nii");
        nifti::write(&input, &super::super::demo::demo_volume(16).unwrap(), DataType::U8).unwrap();
        let out = dir.path().join("none.png");

        let args = render_args(&[
            "roimesh",
            "render",
            "-i",
            input.to_str().unwrap(),
            "--label",
            "9",
            "--screenshot",
            out.to_str().unwrap(),
        ]);
        let err = super::run(args, 0).unwrap_err().to_string();
        assert!(err.starts_with("No surface extracted from"), "{err}");
        assert!(err.contains("at threshold 0.5."));
        assert!(!out.exists());
    }
}
