use std::path::PathBuf;

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::error::{DomainsError, Result};
use crate::frame::ByteFrame;
use crate::io::image_io::load_gray8;

/// Source of the fixed correction mask used to suppress known
/// illumination artifacts.
pub trait MaskAsset: Send + Sync {
    fn load(&self) -> Result<Array2<u8>>;
}

/// Correction mask stored as a raster image file.
#[derive(Clone, Debug)]
pub struct FileMask(pub PathBuf);

impl MaskAsset for FileMask {
    fn load(&self) -> Result<Array2<u8>> {
        if !self.0.is_file() {
            return Err(DomainsError::AssetMissing(format!(
                "{} not found",
                self.0.display()
            )));
        }
        load_gray8(&self.0)
            .map_err(|e| DomainsError::AssetMissing(format!("{}: {e}", self.0.display())))
    }
}

/// Correction mask held in memory.
#[derive(Clone, Debug)]
pub struct StaticMask(pub Array2<u8>);

impl MaskAsset for StaticMask {
    fn load(&self) -> Result<Array2<u8>> {
        Ok(self.0.clone())
    }
}

/// No correction mask configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMask;

impl MaskAsset for NoMask {
    fn load(&self) -> Result<Array2<u8>> {
        Err(DomainsError::AssetMissing(
            "no correction mask configured".into(),
        ))
    }
}

/// Saturating pixel-wise sum `clamp(segmentation + mask, 0, 255)`.
///
/// The result keeps the segmentation's title and calibration.
pub fn add_saturating(segmentation: &ByteFrame, mask: &Array2<u8>) -> Result<ByteFrame> {
    let (h, w) = segmentation.data.dim();
    if mask.dim() != (h, w) {
        return Err(DomainsError::MaskSizeMismatch {
            width: w,
            height: h,
            found_width: mask.ncols(),
            found_height: mask.nrows(),
        });
    }

    let data = Zip::from(&segmentation.data)
        .and(mask)
        .map_collect(|&s, &m| s.saturating_add(m));

    Ok(ByteFrame::new(
        data,
        segmentation.calibration.clone(),
        segmentation.title.clone(),
    ))
}

/// Load the correction mask and merge it into the segmentation. The mask
/// is dropped as soon as the merge is done.
pub fn correct_aberration(segmentation: &ByteFrame, asset: &dyn MaskAsset) -> Result<ByteFrame> {
    let mask = asset.load()?;
    let corrected = add_saturating(segmentation, &mask)?;
    debug!(
        title = %segmentation.title,
        before = segmentation.count_nonzero(),
        after = corrected.count_nonzero(),
        "Aberration correction applied"
    );
    Ok(corrected)
}
