//! Integration tests for roimesh crates.
//!
//! End-to-end checks across loading, extraction, coloring, rendering and the
//! session. Every test writes its own synthetic volumes to a temp dir;
//! [`fixtures`] holds the builders they share.

pub mod fixtures {
    //! Synthetic volumes and files.

    use std::path::{Path, PathBuf};

    use roimesh_core::{Result, Vec3, Volume};
    use roimesh_io::IoResult;
    use roimesh_io::nifti::{self, DataType};

    /// 16³ grid at 1 mm with three 4-voxel blocks labeled 1, 2 and 5.
    pub fn three_blocks() -> Result<Volume> {
        blocks(Vec3::ONE, Vec3::ZERO)
    }

    /// [`three_blocks`] with explicit geometry.
    pub fn blocks(spacing: Vec3, origin: Vec3) -> Result<Volume> {
        let inside = |v: usize, lo: usize| (lo..lo + 4).contains(&v);
        Volume::from_fn([16, 16, 16], spacing, origin, |x, y, z| {
            if inside(x, 2) && inside(y, 2) && inside(z, 2) {
                1.0
            } else if inside(x, 9) && inside(y, 2) && inside(z, 2) {
                2.0
            } else if inside(x, 6) && inside(y, 9) && inside(z, 8) {
                5.0
            } else {
                0.0
            }
        })
    }

    /// `n`³ zero grid with one voxel at `at` set to `label`.
    pub fn single_voxel(n: usize, at: [usize; 3], label: f32) -> Result<Volume> {
        Volume::from_fn([n, n, n], Vec3::ONE, Vec3::ZERO, |x, y, z| {
            if [x, y, z] == at { label } else { 0.0 }
        })
    }

    /// Writes `volume` as `dir/name` in `datatype`.
    pub fn write_volume(dir: &Path, name: &str, volume: &Volume, datatype: DataType) -> IoResult<PathBuf> {
        let path = dir.join(name);
        nifti::write(&path, volume, datatype)?;
        Ok(path)
    }

    /// Writes a text file.
    pub fn write_text(dir: &Path, name: &str, text: &str) -> std::io::Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, text)?;
        Ok(path)
    }
}
