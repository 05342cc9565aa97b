//! PNG screenshots.
//!
//! Writes and reads 8-bit RGB or RGBA images. Screenshots are written as RGB.
//!
//! # Example
//!
//! ```rust,ignore
//! use roimesh_io::png;
//!
//! png::write("shot.png", 640, 480, 3, &pixels)?;
//! let img = png::read("shot.png")?;
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::{IoError, IoResult};

/// A decoded 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// 3 (RGB) or 4 (RGBA).
    pub channels: u8,
    /// Row-major interleaved samples.
    pub data: Vec<u8>,
}

impl PngImage {
    /// RGB triple at `(x, y)`.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Writes interleaved 8-bit samples to a PNG file.
pub fn write<P: AsRef<Path>>(path: P, width: u32, height: u32, channels: u8, data: &[u8]) -> IoResult<()> {
    let color_type = match channels {
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {n}"))),
    };
    let expected = width as usize * height as usize * channels as usize;
    if data.len() != expected {
        return Err(IoError::EncodeError(format!(
            "buffer holds {} bytes, {}x{}x{} needs {}",
            data.len(),
            width,
            height,
            channels,
            expected
        )));
    }

    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());
    encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .write_image_data(data)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    Ok(())
}

/// Reads an 8-bit RGB or RGBA PNG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PngImage> {
    let file = File::open(path.as_ref())?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    let channels = match (info.color_type, info.bit_depth) {
        (png::ColorType::Rgb, png::BitDepth::Eight) => 3,
        (png::ColorType::Rgba, png::BitDepth::Eight) => 4,
        (ct, bd) => {
            return Err(IoError::UnsupportedFormat(format!("PNG {ct:?} {bd:?}")));
        }
    };
    buf.truncate(info.buffer_size());
    Ok(PngImage {
        width: info.width,
        height: info.height,
        channels,
        data: buf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_rgb() {
        let (width, height) = (8u32, 4u32);
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 30) as u8, (y * 60) as u8, 128]);
            }
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        write(&path, width, height, 3, &data).unwrap();

        let img = read(&path).unwrap();
        assert_eq!((img.width, img.height, img.channels), (8, 4, 3));
        assert_eq!(img.data, data);
        assert_eq!(img.rgb(2, 1), [60, 60, 128]);
    }

    #[test]
    fn rejects_wrong_buffer_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        assert!(matches!(write(&path, 2, 2, 3, &[0u8; 11]), Err(IoError::EncodeError(_))));
        assert!(matches!(write(&path, 2, 2, 1, &[0u8; 4]), Err(IoError::EncodeError(_))));
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("shot.png");
        assert!(matches!(write(&path, 1, 1, 3, &[0, 0, 0]), Err(IoError::Io(_))));
    }
}
