use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::detection::{Domain, Outline};
use crate::error::{DomainsError, Result};

/// Image the domain outlines are sampled against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoiReference {
    /// The 8-bit autoscaled average (the image saved as `-stack.tif`).
    #[default]
    Normalized,
    /// The floating-point average in the source's native units.
    Projected,
}

/// Intensity statistics inside one outline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RoiStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub pixel_count: usize,
}

/// Mean, min and max of `reference` over the pixels whose centres fall
/// inside `outline`.
pub fn roi_statistics(reference: &Array2<f32>, outline: &Outline) -> Result<RoiStats> {
    let (h, w) = reference.dim();
    let mut sum = 0.0_f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut count = 0usize;

    for (row, col) in outline.interior_pixels() {
        if row >= h || col >= w {
            return Err(DomainsError::Analysis(format!(
                "outline pixel ({row}, {col}) outside {w}x{h} reference"
            )));
        }
        let v = reference[[row, col]] as f64;
        sum += v;
        min = min.min(v);
        max = max.max(v);
        count += 1;
    }

    if count == 0 {
        return Err(DomainsError::Analysis("outline encloses no pixels".into()));
    }

    Ok(RoiStats {
        mean: sum / count as f64,
        min,
        max,
        pixel_count: count,
    })
}

/// Statistics for every domain, in the same order as `domains`.
pub fn measure_rois(reference: &Array2<f32>, domains: &[Domain]) -> Result<Vec<RoiStats>> {
    domains
        .iter()
        .map(|domain| roi_statistics(reference, &domain.outline))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_roi() {
        let reference = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f32);
        let outline = Outline {
            vertices: vec![(1, 1), (3, 1), (3, 3), (1, 3)],
        };
        let stats = roi_statistics(&reference, &outline).unwrap();
        assert_eq!(stats.pixel_count, 4);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 10.0);
        assert!((stats.mean - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_outline_outside_reference() {
        let reference = Array2::<f32>::zeros((2, 2));
        let outline = Outline {
            vertices: vec![(3, 3), (4, 3), (4, 4), (3, 4)],
        };
        assert!(matches!(
            roi_statistics(&reference, &outline),
            Err(DomainsError::Analysis(_))
        ));
    }
}
