#![allow(dead_code)]

use domains_core::frame::{Calibration, ImageStack};
use domains_core::io::ser::SER_HEADER_SIZE;
use ndarray::Array2;

/// Build a SER file header for mono frames.
///
/// `little_endian_flag` is written verbatim; only 1 selects big-endian.
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
    little_endian_flag: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian
    buf.extend_from_slice(&little_endian_flag.to_le_bytes());
    // Width
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    // Height
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    // PixelDepth
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    // FrameCount
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer (40 bytes)
    buf.extend_from_slice(&[0u8; 40]);
    // Instrument (40 bytes)
    let mut instrument = [0u8; 40];
    instrument[..8].copy_from_slice(b"Confocal");
    buf.extend_from_slice(&instrument);
    // Telescope (40 bytes)
    buf.extend_from_slice(&[0u8; 40]);
    // DateTime (8 bytes)
    buf.extend_from_slice(&0u64.to_le_bytes());
    // DateTimeUTC (8 bytes)
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Complete mono 8-bit SER file with the given frame data.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header_full(width, height, 8, frames.len(), 0, 0);
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Write `data` to `dir/name` and return the path.
pub fn write_file(dir: &std::path::Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write test file");
    path
}

/// 4x4 frame with background 10, the whole of row 0 at 200 (a 4 px blob)
/// and pixel (3, 3) at 200 (a 1 px blob).
pub fn two_blob_frame() -> Array2<f32> {
    let mut f = Array2::from_elem((4, 4), 10.0f32);
    for col in 0..4 {
        f[[0, col]] = 200.0;
    }
    f[[3, 3]] = 200.0;
    f
}

/// Same frame as [`two_blob_frame`] in SER byte layout.
pub fn two_blob_bytes() -> Vec<u8> {
    two_blob_frame().iter().map(|&v| v as u8).collect()
}

/// Stack of `n` identical copies of `frame`.
pub fn repeat_stack(title: &str, frame: &Array2<f32>, n: usize, calibration: Calibration) -> ImageStack {
    ImageStack::new(title, vec![frame.clone(); n], 8, calibration)
}

/// The three-frame, two-blob stack used by the end-to-end tests.
pub fn two_blob_stack(title: &str) -> ImageStack {
    repeat_stack(title, &two_blob_frame(), 3, Calibration::default())
}

/// Stack whose frames are all one constant value.
pub fn flat_stack(title: &str) -> ImageStack {
    repeat_stack(title, &Array2::from_elem((4, 4), 42.0f32), 3, Calibration::default())
}
