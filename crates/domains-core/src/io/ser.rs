use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{DomainsError, Result};
use crate::frame::{Calibration, ImageStack};

pub const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub instrument: String,
}

impl SerHeader {
    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 {
            1
        } else {
            2
        }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame.
    pub fn frame_byte_size(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(self.bytes_per_pixel_plane() * self.planes_per_pixel()))
            .ok_or(DomainsError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
    }
}

/// Memory-mapped SER video reader. Each file is one time series.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and lives no longer than the reader.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(DomainsError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(DomainsError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let expected_data_size = header
            .frame_byte_size()?
            .checked_mul(header.frame_count as usize)
            .and_then(|data| data.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| {
                DomainsError::InvalidSer(format!(
                    "{} frames of {}x{} do not fit in memory",
                    header.frame_count, header.width, header.height
                ))
            })?;
        if mmap.len() < expected_data_size {
            return Err(DomainsError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected_data_size,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Read a single frame in native intensity units.
    ///
    /// RGB/BGR data is reduced to its green plane.
    pub fn read_frame(&self, index: usize) -> Result<Array2<f32>> {
        let count = self.frame_count();
        if index >= count {
            return Err(DomainsError::InvalidSer(format!(
                "Frame index {index} out of range (total: {count})"
            )));
        }
        let frame_size = self.header.frame_byte_size()?;
        let offset = SER_HEADER_SIZE + index * frame_size;
        let raw = &self.mmap[offset..offset + frame_size];

        let planes = self.header.planes_per_pixel();
        let plane_index = if planes == 1 { 0 } else { 1 };
        Ok(decode_plane(
            raw,
            self.header.height as usize,
            self.header.width as usize,
            self.header.bytes_per_pixel_plane(),
            planes,
            plane_index,
            self.header.little_endian,
        ))
    }

    /// Decode every frame into an [`ImageStack`].
    pub fn read_stack(&self, title: &str, calibration: Calibration) -> Result<ImageStack> {
        let frames = (0..self.frame_count())
            .map(|i| self.read_frame(i))
            .collect::<Result<Vec<_>>>()?;
        let bit_depth = if self.header.pixel_depth <= 8 { 8 } else { 16 };
        Ok(ImageStack::new(title, frames, bit_depth, calibration))
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let instrument = read_fixed_string(&buf[82..122]);

    if width == 0 || height == 0 {
        return Err(DomainsError::InvalidDimensions { width, height });
    }
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(DomainsError::InvalidSer(format!(
            "Unsupported pixel depth {pixel_depth}"
        )));
    }

    // Most writers store 0 here for little-endian data despite the format
    // description; only an explicit 1 selects big-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        instrument,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn decode_plane(
    raw: &[u8],
    height: usize,
    width: usize,
    bytes_per_sample: usize,
    planes: usize,
    plane_index: usize,
    little_endian: bool,
) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(row, col)| {
        let idx = ((row * width + col) * planes + plane_index) * bytes_per_sample;
        if bytes_per_sample == 1 {
            raw[idx] as f32
        } else {
            let pair = [raw[idx], raw[idx + 1]];
            if little_endian {
                u16::from_le_bytes(pair) as f32
            } else {
                u16::from_be_bytes(pair) as f32
            }
        }
    })
}
