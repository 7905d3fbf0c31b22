use ndarray::Array2;
use tracing::debug;

use crate::error::{DomainsError, Result};
use crate::frame::{Frame, ImageStack};

/// Collapse a time series into one frame holding the per-pixel mean.
///
/// The stack's calibration and title are carried over unchanged.
pub fn average_projection(stack: &ImageStack) -> Result<Frame> {
    let n = stack.frame_count();
    if n < 2 {
        return Err(DomainsError::InsufficientFrames { frames: n });
    }

    let (h, w) = stack.dim();
    let mut sum = Array2::<f32>::zeros((h, w));

    for frame in &stack.frames {
        if frame.dim() != (h, w) {
            return Err(DomainsError::InvalidDimensions {
                width: frame.ncols() as u32,
                height: frame.nrows() as u32,
            });
        }
        sum += frame;
    }

    sum /= n as f32;
    debug!(title = %stack.title, frames = n, "Average projection complete");

    Ok(Frame::new(sum, stack.bit_depth, stack.calibration.clone()).with_title(&stack.title))
}
