use ndarray::Array2;

use crate::consts::{BACKGROUND, FOREGROUND, HISTOGRAM_BINS};
use crate::frame::ByteFrame;

/// Intensity histogram of an 8-bit frame.
pub fn histogram(frame: &ByteFrame) -> Vec<u64> {
    let mut bins = vec![0u64; HISTOGRAM_BINS];
    for &v in frame.data.iter() {
        bins[v as usize] += 1;
    }
    bins
}

/// Triangle (Zack) threshold selection.
///
/// A line is drawn from the histogram peak to the far end of the longer
/// tail; the bin with the largest distance below that line is the last
/// background level. Returns the foreground level `T`: pixels `>= T` are
/// foreground. `T` may equal `histogram.len()`, meaning no foreground.
pub fn triangle_threshold(histogram: &[u64]) -> u16 {
    let n = histogram.len();
    let Some(first) = histogram.iter().position(|&c| c > 0) else {
        return 0;
    };
    let last = histogram.iter().rposition(|&c| c > 0).unwrap_or(first);

    // The line runs to the empty bin just past each end of the data.
    let mut low = first.saturating_sub(1);
    let high = if last + 1 < n { last + 1 } else { last };

    let mut peak = 0usize;
    let mut peak_count = 0u64;
    for (i, &c) in histogram.iter().enumerate() {
        if c > peak_count {
            peak = i;
            peak_count = c;
        }
    }

    // Always walk the longer tail on the low side.
    let mut data: Vec<f64> = histogram.iter().map(|&c| c as f64).collect();
    let inverted = peak - low < high - peak;
    if inverted {
        data.reverse();
        low = n - 1 - high;
        peak = n - 1 - peak;
    }

    let split = if low == peak {
        low as i64
    } else {
        let mut nx = data[peak];
        let mut ny = low as f64 - peak as f64;
        let norm = (nx * nx + ny * ny).sqrt();
        nx /= norm;
        ny /= norm;
        let d = nx * low as f64 + ny * data[low];

        let mut split = low;
        let mut split_distance = 0.0;
        for (i, &count) in data.iter().enumerate().take(peak + 1).skip(low + 1) {
            let distance = nx * i as f64 + ny * count - d;
            if distance > split_distance {
                split = i;
                split_distance = distance;
            }
        }
        split as i64 - 1
    };

    let last_background = if inverted {
        (n - 1) as i64 - split
    } else {
        split
    };
    (last_background + 1).clamp(0, n as i64) as u16
}

/// Binarize: pixels `>= level` become foreground (255), the rest 0.
pub fn apply_threshold(frame: &ByteFrame, level: u16) -> ByteFrame {
    let data: Array2<u8> = frame.data.mapv(|v| {
        if v as u16 >= level {
            FOREGROUND
        } else {
            BACKGROUND
        }
    });
    ByteFrame::new(data, frame.calibration.clone(), frame.title.clone())
}

/// Triangle auto-threshold of an 8-bit frame. Returns the binary mask and
/// the foreground level used.
pub fn auto_threshold(frame: &ByteFrame) -> (ByteFrame, u16) {
    let level = triangle_threshold(&histogram(frame));
    (apply_threshold(frame, level), level)
}
