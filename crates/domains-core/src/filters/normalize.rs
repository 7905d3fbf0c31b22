use ndarray::Array2;

use crate::consts::{EPSILON, GRAY8_MAX};
use crate::frame::{ByteFrame, Frame};

/// Minimum and maximum pixel values, or `None` for an empty frame.
pub fn min_max(data: &Array2<f32>) -> Option<(f32, f32)> {
    if data.is_empty() {
        return None;
    }
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in data.iter() {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Some((lo, hi))
}

/// Linear autoscale: maps the frame's own [min, max] onto [0, 255].
///
/// A flat frame maps to all zeros. Calibration and title are copied from
/// the input frame.
pub fn to_gray8(frame: &Frame) -> ByteFrame {
    let data = match min_max(&frame.data) {
        Some((lo, hi)) if ((hi - lo) as f64) > EPSILON => {
            let scale = GRAY8_MAX as f32 / (hi - lo);
            frame
                .data
                .mapv(|v| ((v - lo) * scale).round().clamp(0.0, GRAY8_MAX as f32) as u8)
        }
        _ => Array2::<u8>::zeros(frame.data.dim()),
    };

    ByteFrame::new(data, frame.calibration.clone(), frame.title.clone())
}
