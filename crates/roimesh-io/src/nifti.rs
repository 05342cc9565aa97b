//! NIfTI-1 volume support.
//!
//! Reads single-file `.nii` volumes, their gzip-compressed `.nii.gz` form and
//! the two-file `.hdr`/`.img` layout. Only the first 3D frame is decoded.
//!
//! # Format
//!
//! ```text
//! offset  size  field
//!      0     4  sizeof_hdr (348; also the byte-order probe)
//!     40    16  dim[8]
//!     70     2  datatype
//!     76    32  pixdim[8]
//!    108     4  vox_offset
//!    112     8  scl_slope, scl_inter
//!    252     4  qform_code, sform_code
//!    256    24  quatern_b/c/d, qoffset_x/y/z
//!    280    48  srow_x, srow_y, srow_z
//!    344     4  magic ("n+1\0" single file, "ni1\0" pair)
//! ```
//!
//! Samples are stored X-fastest, the same order [`Volume`] uses.
//!
//! # Example
//!
//! ```rust,ignore
//! use roimesh_io::nifti;
//!
//! let nii = nifti::read("atlas.nii.gz")?;
//! println!("{:?} {}", nii.header.dims(), nii.header.datatype.name());
//! ```

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use roimesh_core::{Vec3, Volume};
use tracing::{debug, trace, warn};

use crate::{IoError, IoResult};

/// Size of a NIfTI-1 header in bytes.
pub const HEADER_SIZE: usize = 348;

/// Data offset used when writing single-file volumes (header + empty extension flag).
const WRITE_VOX_OFFSET: usize = 352;

const NIFTI2_HEADER_SIZE: i32 = 540;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const MAGIC_SINGLE: [u8; 4] = *b"n+1\0";
const MAGIC_PAIR: [u8; 4] = *b"ni1\0";

/// Sample encodings understood by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `DT_UINT8` (2).
    U8,
    /// `DT_INT8` (256).
    I8,
    /// `DT_INT16` (4).
    I16,
    /// `DT_UINT16` (512).
    U16,
    /// `DT_INT32` (8).
    I32,
    /// `DT_UINT32` (768).
    U32,
    /// `DT_INT64` (1024).
    I64,
    /// `DT_UINT64` (1280).
    U64,
    /// `DT_FLOAT32` (16).
    F32,
    /// `DT_FLOAT64` (64).
    F64,
}

impl DataType {
    /// Every supported encoding.
    pub const ALL: [Self; 10] = [
        Self::U8,
        Self::I8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// Maps a header `datatype` code.
    pub fn from_code(code: i16) -> Option<Self> {
        Some(match code {
            2 => Self::U8,
            256 => Self::I8,
            4 => Self::I16,
            512 => Self::U16,
            8 => Self::I32,
            768 => Self::U32,
            1024 => Self::I64,
            1280 => Self::U64,
            16 => Self::F32,
            64 => Self::F64,
            _ => return None,
        })
    }

    /// Header `datatype` code.
    pub fn code(self) -> i16 {
        match self {
            Self::U8 => 2,
            Self::I8 => 256,
            Self::I16 => 4,
            Self::U16 => 512,
            Self::I32 => 8,
            Self::U32 => 768,
            Self::I64 => 1024,
            Self::U64 => 1280,
            Self::F32 => 16,
            Self::F64 => 64,
        }
    }

    /// Bytes per sample.
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Conventional lower-case name (`uint8`, `float32`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::U16 => "uint16",
            Self::I32 => "int32",
            Self::U32 => "uint32",
            Self::I64 => "int64",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }

    /// Parses a [`name`](Self::name) or its short form (`u8`, `i16`, `f32`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.name() == lower || t.short_name() == lower)
    }

    fn short_name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

/// Decoded NIfTI-1 header fields relevant to volume geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// `dim[0]` is the rank, `dim[1..=7]` the extents.
    pub dim: [i16; 8],
    /// Sample encoding.
    pub datatype: DataType,
    /// `pixdim[1..=3]` are voxel sizes; `pixdim[0]` is the qform handedness.
    pub pixdim: [f32; 8],
    /// Byte offset of the sample data.
    pub vox_offset: f32,
    /// Intensity scale.
    pub scl_slope: f32,
    /// Intensity offset.
    pub scl_inter: f32,
    /// Quaternion transform code.
    pub qform_code: i16,
    /// Affine transform code.
    pub sform_code: i16,
    /// `quatern_b`, `quatern_c`, `quatern_d`.
    pub quatern: [f32; 3],
    /// `qoffset_x`, `qoffset_y`, `qoffset_z`.
    pub qoffset: [f32; 3],
    /// `srow_x`, `srow_y`, `srow_z`.
    pub srow: [[f32; 4]; 3],
    /// Free-text description.
    pub descrip: String,
    /// Magic bytes.
    pub magic: [u8; 4],
    /// Whether the file was big-endian.
    pub big_endian: bool,
}

impl NiftiHeader {
    /// Header describing a single-file volume with the geometry of `volume`.
    pub fn for_volume(volume: &Volume, datatype: DataType) -> Self {
        let [nx, ny, nz] = volume.dims();
        let s = volume.spacing();
        let o = volume.origin();
        let dim_of = |n: usize| i16::try_from(n).unwrap_or(i16::MAX);
        Self {
            dim: [3, dim_of(nx), dim_of(ny), dim_of(nz), 1, 1, 1, 1],
            datatype,
            pixdim: [1.0, s.x, s.y, s.z, 0.0, 0.0, 0.0, 0.0],
            vox_offset: WRITE_VOX_OFFSET as f32,
            scl_slope: 1.0,
            scl_inter: 0.0,
            qform_code: 1,
            sform_code: 1,
            quatern: [0.0; 3],
            qoffset: [o.x, o.y, o.z],
            srow: [
                [s.x, 0.0, 0.0, o.x],
                [0.0, s.y, 0.0, o.y],
                [0.0, 0.0, s.z, o.z],
            ],
            descrip: String::from("roimesh"),
            magic: MAGIC_SINGLE,
            big_endian: false,
        }
    }

    /// Parses the first [`HEADER_SIZE`] bytes of `buf`, detecting byte order.
    pub fn parse(buf: &[u8]) -> IoResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(IoError::InvalidFile(format!(
                "file too small for a NIfTI header: {} bytes",
                buf.len()
            )));
        }
        let le = LittleEndian::read_i32(&buf[0..4]);
        let be = BigEndian::read_i32(&buf[0..4]);
        if le == HEADER_SIZE as i32 {
            Self::parse_with::<LittleEndian>(buf, false)
        } else if be == HEADER_SIZE as i32 {
            Self::parse_with::<BigEndian>(buf, true)
        } else if le == NIFTI2_HEADER_SIZE || be == NIFTI2_HEADER_SIZE {
            Err(IoError::UnsupportedFormat("NIfTI-2 volumes are not supported".into()))
        } else {
            Err(IoError::InvalidFile(format!("bad sizeof_hdr: {le}")))
        }
    }

    fn parse_with<B: ByteOrder>(buf: &[u8], big_endian: bool) -> IoResult<Self> {
        let i16_at = |o: usize| B::read_i16(&buf[o..o + 2]);
        let f32_at = |o: usize| B::read_f32(&buf[o..o + 4]);

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[344..348]);
        if magic != MAGIC_SINGLE && magic != MAGIC_PAIR {
            return Err(IoError::InvalidFile(format!("bad magic: {magic:?}")));
        }

        let mut dim = [0i16; 8];
        for (i, d) in dim.iter_mut().enumerate() {
            *d = i16_at(40 + 2 * i);
        }
        if !(1..=7).contains(&dim[0]) {
            return Err(IoError::InvalidFile(format!("bad dim[0]: {}", dim[0])));
        }
        let rank = dim[0] as usize;
        if let Some(bad) = dim[1..=rank].iter().find(|&&d| d <= 0) {
            return Err(IoError::InvalidFile(format!("bad dimension extent: {bad}")));
        }

        let code = i16_at(70);
        let datatype = DataType::from_code(code)
            .ok_or_else(|| IoError::UnsupportedFormat(format!("NIfTI datatype {code}")))?;

        let mut pixdim = [0f32; 8];
        for (i, p) in pixdim.iter_mut().enumerate() {
            *p = f32_at(76 + 4 * i);
        }

        let mut srow = [[0f32; 4]; 3];
        for (r, row) in srow.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = f32_at(280 + 16 * r + 4 * c);
            }
        }

        let descrip = String::from_utf8_lossy(&buf[148..228])
            .trim_end_matches('\0')
            .trim()
            .to_string();

        Ok(Self {
            dim,
            datatype,
            pixdim,
            vox_offset: f32_at(108),
            scl_slope: f32_at(112),
            scl_inter: f32_at(116),
            qform_code: i16_at(252),
            sform_code: i16_at(254),
            quatern: [f32_at(256), f32_at(260), f32_at(264)],
            qoffset: [f32_at(268), f32_at(272), f32_at(276)],
            srow,
            descrip,
            magic,
            big_endian,
        })
    }

    /// Serializes the header into 348 bytes with byte order `B`.
    pub fn encode<B: ByteOrder>(&self) -> IoResult<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.write_i32::<B>(HEADER_SIZE as i32)?;
        out.extend_from_slice(&[0u8; 36]); // data_type, db_name, extents, session_error, regular, dim_info
        for d in self.dim {
            out.write_i16::<B>(d)?;
        }
        out.extend_from_slice(&[0u8; 14]); // intent_p1..3, intent_code
        out.write_i16::<B>(self.datatype.code())?;
        out.write_i16::<B>((self.datatype.size() * 8) as i16)?;
        out.write_i16::<B>(0)?; // slice_start
        for p in self.pixdim {
            out.write_f32::<B>(p)?;
        }
        out.write_f32::<B>(self.vox_offset)?;
        out.write_f32::<B>(self.scl_slope)?;
        out.write_f32::<B>(self.scl_inter)?;
        out.write_i16::<B>(0)?; // slice_end
        out.write_u8(0)?; // slice_code
        out.write_u8(2)?; // xyzt_units: millimetres
        out.extend_from_slice(&[0u8; 24]); // cal_max, cal_min, slice_duration, toffset, glmax, glmin
        let mut descrip = [0u8; 80];
        let text = self.descrip.as_bytes();
        let n = text.len().min(79);
        descrip[..n].copy_from_slice(&text[..n]);
        out.extend_from_slice(&descrip);
        out.extend_from_slice(&[0u8; 24]); // aux_file
        out.write_i16::<B>(self.qform_code)?;
        out.write_i16::<B>(self.sform_code)?;
        for q in self.quatern.iter().chain(self.qoffset.iter()) {
            out.write_f32::<B>(*q)?;
        }
        for row in &self.srow {
            for v in row {
                out.write_f32::<B>(*v)?;
            }
        }
        out.extend_from_slice(&[0u8; 16]); // intent_name
        out.extend_from_slice(&self.magic);
        debug_assert_eq!(out.len(), HEADER_SIZE);
        Ok(out)
    }

    /// Rank of the stored array (`dim[0]`).
    pub fn rank(&self) -> usize {
        self.dim[0] as usize
    }

    /// Extent of axis `axis` (1-based), 1 for axes beyond the rank.
    fn extent(&self, axis: usize) -> usize {
        if axis <= self.rank() {
            self.dim[axis].max(1) as usize
        } else {
            1
        }
    }

    /// Spatial dimensions `[nx, ny, nz]`.
    pub fn dims(&self) -> [usize; 3] {
        [self.extent(1), self.extent(2), self.extent(3)]
    }

    /// Number of 3D frames (product of extents beyond the third axis).
    pub fn frames(&self) -> usize {
        (4..=7).map(|a| self.extent(a)).product()
    }

    /// Voxel size. Signs are dropped and zero sizes become 1.
    pub fn spacing(&self) -> Vec3 {
        let fix = |v: f32| {
            let a = v.abs();
            if a > 0.0 && a.is_finite() { a } else { 1.0 }
        };
        Vec3::new(fix(self.pixdim[1]), fix(self.pixdim[2]), fix(self.pixdim[3]))
    }

    /// World position of voxel `(0, 0, 0)`.
    ///
    /// Taken from the sform when present, then the qform. Without either, the
    /// grid is centred the way the Analyze convention does it, with X flipped.
    pub fn origin(&self) -> Vec3 {
        if self.sform_code > 0 {
            Vec3::new(self.srow[0][3], self.srow[1][3], self.srow[2][3])
        } else if self.qform_code > 0 {
            Vec3::from_array(self.qoffset)
        } else {
            let [nx, ny, nz] = self.dims();
            let s = self.spacing();
            Vec3::new(
                (nx as f32 - 1.0) * 0.5 * s.x,
                -(ny as f32 - 1.0) * 0.5 * s.y,
                -(nz as f32 - 1.0) * 0.5 * s.z,
            )
        }
    }

    /// `(slope, intercept)` when samples need rescaling.
    pub fn scaling(&self) -> Option<(f32, f32)> {
        let slope = self.scl_slope;
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }
        let inter = if self.scl_inter.is_finite() { self.scl_inter } else { 0.0 };
        if slope == 1.0 && inter == 0.0 {
            None
        } else {
            Some((slope, inter))
        }
    }

    /// Whether header and data share one file.
    pub fn is_single_file(&self) -> bool {
        self.magic == MAGIC_SINGLE
    }
}

/// A decoded volume with its header.
#[derive(Debug, Clone)]
pub struct Nifti {
    /// Parsed header.
    pub header: NiftiHeader,
    /// First 3D frame, scaled.
    pub volume: Volume,
}

/// Reads a NIfTI-1 file.
///
/// `.hdr` and `.img` paths are resolved to their companion file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Nifti> {
    let path = path.as_ref();
    let (base, _) = split_gz(path);
    let lower = base.to_ascii_lowercase();

    let (header, data, offset) = if lower.ends_with(".img") {
        let hdr_path = companion(&base, "hdr")?;
        let header = NiftiHeader::parse(&read_bytes(&hdr_path)?)?;
        let offset = header.vox_offset.max(0.0) as usize;
        (header, read_bytes(path)?, offset)
    } else {
        let bytes = read_bytes(path)?;
        let header = NiftiHeader::parse(&bytes)?;
        if header.is_single_file() {
            let offset = (header.vox_offset as usize).max(HEADER_SIZE);
            (header, bytes, offset)
        } else {
            let img_path = companion(&base, "img")?;
            let offset = header.vox_offset.max(0.0) as usize;
            (header, read_bytes(&img_path)?, offset)
        }
    };

    trace!(
        path = %path.display(),
        dims = ?header.dims(),
        datatype = header.datatype.name(),
        big_endian = header.big_endian,
        "NIfTI header"
    );
    if header.frames() > 1 {
        warn!(frames = header.frames(), "multi-frame volume; reading the first frame only");
    }

    let [nx, ny, nz] = header.dims();
    let count = nx * ny * nz;
    let needed = count * header.datatype.size();
    let end = offset.checked_add(needed).unwrap_or(usize::MAX);
    if data.len() < end {
        return Err(IoError::InvalidFile(format!(
            "truncated voxel data: need {} bytes at offset {}, have {}",
            needed,
            offset,
            data.len().saturating_sub(offset)
        )));
    }
    let raw = &data[offset..end];
    let mut samples = if header.big_endian {
        decode_samples::<BigEndian>(raw, header.datatype)
    } else {
        decode_samples::<LittleEndian>(raw, header.datatype)
    };
    if let Some((slope, inter)) = header.scaling() {
        for v in &mut samples {
            *v = *v * slope + inter;
        }
    }

    let volume = Volume::new(header.dims(), header.spacing(), header.origin(), samples)?;
    debug!(
        path = %path.display(),
        dims = ?volume.dims(),
        spacing = ?volume.spacing(),
        origin = ?volume.origin(),
        "loaded volume"
    );
    Ok(Nifti { header, volume })
}

/// Reads only the volume of a NIfTI-1 file.
pub fn read_volume<P: AsRef<Path>>(path: P) -> IoResult<Volume> {
    read(path).map(|n| n.volume)
}

/// Writes `volume` as a single-file NIfTI-1 volume.
///
/// A path ending in `.gz` is gzip-compressed. Integer encodings round and
/// saturate the samples.
pub fn write<P: AsRef<Path>>(path: P, volume: &Volume, datatype: DataType) -> IoResult<()> {
    let path = path.as_ref();
    let header = NiftiHeader::for_volume(volume, datatype);
    let mut bytes = header.encode::<LittleEndian>()?;
    bytes.extend_from_slice(&[0u8; WRITE_VOX_OFFSET - HEADER_SIZE]);
    encode_samples::<LittleEndian>(&mut bytes, volume.data(), datatype)?;

    let file = BufWriter::new(File::create(path)?);
    let (_, gz) = split_gz(path);
    if gz {
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(&bytes)?;
        enc.finish()?.flush()?;
    } else {
        let mut file = file;
        file.write_all(&bytes)?;
        file.flush()?;
    }
    debug!(path = %path.display(), datatype = datatype.name(), "wrote volume");
    Ok(())
}

/// Reads a whole file, transparently inflating gzip content.
fn read_bytes(path: &Path) -> IoResult<Vec<u8>> {
    let mut raw = Vec::new();
    File::open(path)?.read_to_end(&mut raw)?;
    if raw.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::with_capacity(raw.len() * 4);
        MultiGzDecoder::new(raw.as_slice())
            .read_to_end(&mut out)
            .map_err(|e| IoError::DecodeError(format!("gzip: {e}")))?;
        Ok(out)
    } else {
        Ok(raw)
    }
}

/// Path text without a trailing `.gz`, and whether it had one.
fn split_gz(path: &Path) -> (String, bool) {
    let text = path.to_string_lossy().into_owned();
    if text.to_ascii_lowercase().ends_with(".gz") {
        (text[..text.len() - 3].to_string(), true)
    } else {
        (text, false)
    }
}

/// Finds the other half of a `.hdr`/`.img` pair, compressed or not.
///
/// `base` is the path without `.gz`; its extension is swapped for `ext`.
fn companion(base: &str, ext: &str) -> IoResult<PathBuf> {
    let plain = Path::new(base).with_extension(ext);
    let mut gz = plain.clone().into_os_string();
    gz.push(".gz");
    [plain.clone(), PathBuf::from(gz)]
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| IoError::InvalidFile(format!("missing companion file {}", plain.display())))
}

fn decode_samples<B: ByteOrder>(raw: &[u8], datatype: DataType) -> Vec<f32> {
    let size = datatype.size();
    raw.chunks_exact(size)
        .map(|c| match datatype {
            DataType::U8 => f32::from(c[0]),
            DataType::I8 => f32::from(c[0] as i8),
            DataType::I16 => f32::from(B::read_i16(c)),
            DataType::U16 => f32::from(B::read_u16(c)),
            DataType::I32 => B::read_i32(c) as f32,
            DataType::U32 => B::read_u32(c) as f32,
            DataType::I64 => B::read_i64(c) as f32,
            DataType::U64 => B::read_u64(c) as f32,
            DataType::F32 => B::read_f32(c),
            DataType::F64 => B::read_f64(c) as f32,
        })
        .collect()
}

fn encode_samples<B: ByteOrder>(out: &mut Vec<u8>, samples: &[f32], datatype: DataType) -> IoResult<()> {
    out.reserve(samples.len() * datatype.size());
    for &v in samples {
        let r = v.round();
        match datatype {
            DataType::U8 => out.write_u8(r as u8)?,
            DataType::I8 => out.write_i8(r as i8)?,
            DataType::I16 => out.write_i16::<B>(r as i16)?,
            DataType::U16 => out.write_u16::<B>(r as u16)?,
            DataType::I32 => out.write_i32::<B>(r as i32)?,
            DataType::U32 => out.write_u32::<B>(r as u32)?,
            DataType::I64 => out.write_i64::<B>(r as i64)?,
            DataType::U64 => out.write_u64::<B>(r as u64)?,
            DataType::F32 => out.write_f32::<B>(v)?,
            DataType::F64 => out.write_f64::<B>(f64::from(v))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roimesh_core::Label;

    fn sample_volume() -> Volume {
        Volume::from_fn([4, 3, 2], Vec3::new(1.5, 2.0, 2.5), Vec3::new(-10.0, 5.0, 1.0), |x, y, z| {
            if x == 1 && y == 1 {
                (z + 1) as f32
            } else if x == 3 {
                7.0
            } else {
                0.0
            }
        })
        .unwrap()
    }

    #[test]
    fn datatype_names() {
        assert_eq!(DataType::from_name("uint8"), Some(DataType::U8));
        assert_eq!(DataType::from_name("I16"), Some(DataType::I16));
        assert_eq!(DataType::from_name(" f64 "), Some(DataType::F64));
        assert_eq!(DataType::from_name("rgb24"), None);
        for t in DataType::ALL {
            assert_eq!(DataType::from_code(t.code()), Some(t));
        }
    }

    #[test]
    fn roundtrip_nii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.nii");
        let vol = sample_volume();
        write(&path, &vol, DataType::I16).unwrap();

        let nii = read(&path).unwrap();
        assert_eq!(nii.header.datatype, DataType::I16);
        assert!(!nii.header.big_endian);
        assert_eq!(nii.volume, vol);
        assert_eq!(nii.volume.labels(), vec![Label(1.0), Label(2.0), Label(7.0)]);
    }

    #[test]
    fn roundtrip_nii_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.nii.gz");
        let vol = Volume::from_fn([3, 3, 3], Vec3::ONE, Vec3::ZERO, |x, y, z| (x + y * z) as f32 * 0.25).unwrap();
        write(&path, &vol, DataType::F32).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &GZIP_MAGIC);
        assert_eq!(read_volume(&path).unwrap(), vol);
    }

    fn big_endian_file(header: &NiftiHeader, samples: &[i16]) -> Vec<u8> {
        let mut bytes = header.encode::<BigEndian>().unwrap();
        bytes.extend_from_slice(&[0u8; 4]);
        for &s in samples {
            bytes.write_i16::<BigEndian>(s).unwrap();
        }
        bytes
    }

    #[test]
    fn reads_big_endian_with_scaling() {
        let vol = Volume::zeros([2, 2, 1], Vec3::ONE, Vec3::ZERO).unwrap();
        let mut header = NiftiHeader::for_volume(&vol, DataType::I16);
        header.scl_slope = 2.0;
        header.scl_inter = 1.0;
        let bytes = big_endian_file(&header, &[0, 1, 2, 3]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("be.nii");
        std::fs::write(&path, bytes).unwrap();

        let nii = read(&path).unwrap();
        assert!(nii.header.big_endian);
        assert_eq!(nii.volume.data(), &[1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn origin_sources() {
        let vol = sample_volume();
        let mut header = NiftiHeader::for_volume(&vol, DataType::F32);
        assert_eq!(header.origin(), Vec3::new(-10.0, 5.0, 1.0));

        header.sform_code = 0;
        header.qoffset = [1.0, 2.0, 3.0];
        assert_eq!(header.origin(), Vec3::new(1.0, 2.0, 3.0));

        header.qform_code = 0;
        let o = header.origin();
        assert_relative_eq!(o.x, 3.0 * 0.5 * 1.5);
        assert_relative_eq!(o.y, -2.0 * 0.5 * 2.0);
        assert_relative_eq!(o.z, -0.5 * 2.5);
    }

    #[test]
    fn spacing_drops_sign_and_zero() {
        let vol = sample_volume();
        let mut header = NiftiHeader::for_volume(&vol, DataType::F32);
        header.pixdim[1] = -2.0;
        header.pixdim[3] = 0.0;
        assert_eq!(header.spacing(), Vec3::new(2.0, 2.0, 1.0));
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.nii");

        std::fs::write(&path, b"not a volume").unwrap();
        assert!(matches!(read(&path), Err(IoError::InvalidFile(_))));

        let vol = sample_volume();
        let mut header = NiftiHeader::for_volume(&vol, DataType::F32);
        header.magic = *b"abcd";
        std::fs::write(&path, header.encode::<LittleEndian>().unwrap()).unwrap();
        assert!(matches!(read(&path), Err(IoError::InvalidFile(_))));

        assert!(matches!(read(dir.path().join("missing.nii")), Err(IoError::Io(_))));
    }

    #[test]
    fn rejects_truncated_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.nii");
        let vol = sample_volume();
        write(&path, &vol, DataType::F32).unwrap();
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 4);
        std::fs::write(&path, bytes).unwrap();

        let err = read(&path).unwrap_err();
        assert!(err.to_string().contains("truncated"), "{err}");
    }

    #[test]
    fn unsupported_datatype() {
        let vol = sample_volume();
        let mut bytes = NiftiHeader::for_volume(&vol, DataType::F32)
            .encode::<LittleEndian>()
            .unwrap();
        LittleEndian::write_i16(&mut bytes[70..72], 32); // complex64
        assert!(matches!(NiftiHeader::parse(&bytes), Err(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn reads_hdr_img_pair() {
        let dir = tempfile::tempdir().unwrap();
        let vol = Volume::from_fn([2, 2, 2], Vec3::ONE, Vec3::ZERO, |x, _, _| x as f32).unwrap();
        let mut header = NiftiHeader::for_volume(&vol, DataType::U8);
        header.magic = *b"ni1\0";
        header.vox_offset = 0.0;
        std::fs::write(dir.path().join("pair.hdr"), header.encode::<LittleEndian>().unwrap()).unwrap();
        std::fs::write(dir.path().join("pair.img"), [0u8, 1, 0, 1, 0, 1, 0, 1]).unwrap();

        let from_hdr = read_volume(dir.path().join("pair.hdr")).unwrap();
        let from_img = read_volume(dir.path().join("pair.img")).unwrap();
        assert_eq!(from_hdr, vol);
        assert_eq!(from_img, vol);
    }

    #[test]
    fn pair_header_with_multibyte_name() {
        let dir = tempfile::tempdir().unwrap();
        let vol = Volume::zeros([2, 1, 1], Vec3::ONE, Vec3::ZERO).unwrap();
        let mut header = NiftiHeader::for_volume(&vol, DataType::U8);
        header.magic = *b"ni1\0";
        header.vox_offset = 0.0;
        let bytes = header.encode::<LittleEndian>().unwrap();

        let odd = dir.path().join("ñ.hd");
        std::fs::write(&odd, &bytes).unwrap();
        assert!(matches!(read(&odd), Err(IoError::InvalidFile(_))));

        std::fs::write(dir.path().join("ñé.hdr"), &bytes).unwrap();
        std::fs::write(dir.path().join("ñé.img"), [7u8, 9]).unwrap();
        let got = read_volume(dir.path().join("ñé.hdr")).unwrap();
        assert_eq!(got.data(), &[7.0, 9.0]);
    }

    #[test]
    fn extra_frames_read_first() {
        let vol = Volume::zeros([2, 1, 1], Vec3::ONE, Vec3::ZERO).unwrap();
        let mut header = NiftiHeader::for_volume(&vol, DataType::U8);
        header.dim[0] = 4;
        header.dim[4] = 2;
        let mut bytes = header.encode::<LittleEndian>().unwrap();
        bytes.extend_from_slice(&[0u8; 4]);
        bytes.extend_from_slice(&[5, 6, 9, 9]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("4d.nii");
        std::fs::write(&path, bytes).unwrap();

        let nii = read(&path).unwrap();
        assert_eq!(nii.header.frames(), 2);
        assert_eq!(nii.volume.data(), &[5.0, 6.0]);
    }
}
