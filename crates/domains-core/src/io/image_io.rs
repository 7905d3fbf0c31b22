use std::path::Path;

use image::{GrayImage, ImageFormat};
use ndarray::Array2;

use crate::error::{DomainsError, Result};
use crate::frame::ByteFrame;

/// Save an 8-bit frame as grayscale TIFF.
pub fn save_tiff(frame: &ByteFrame, path: &Path) -> Result<()> {
    let h = frame.height();
    let w = frame.width();

    let pixels: Vec<u8> = frame.data.iter().copied().collect();
    let img = GrayImage::from_raw(w as u32, h as u32, pixels).ok_or(
        DomainsError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        },
    )?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Load any supported raster as 8-bit grayscale, shape = (height, width).
pub fn load_gray8(path: &Path) -> Result<Array2<u8>> {
    let gray = image::open(path)?.to_luma8();
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_vec((h as usize, w as usize), gray.into_raw()).map_err(|_| {
        DomainsError::InvalidDimensions {
            width: w,
            height: h,
        }
    })?;
    Ok(data)
}
