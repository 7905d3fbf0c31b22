use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::ByteFrame;

/// 3x3 median filter. Pixels outside the image take the value of the
/// nearest edge pixel.
///
/// Parallelizes at the row level for images >= 256x256.
pub fn median_3x3(frame: &ByteFrame) -> ByteFrame {
    let (h, w) = frame.data.dim();
    if h == 0 || w == 0 {
        return frame.clone();
    }

    let src = &frame.data;
    let data = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<u8>> = (0..h)
            .into_par_iter()
            .map(|row| (0..w).map(|col| median_at(src, row, col)).collect())
            .collect();

        let mut result = Array2::<u8>::zeros((h, w));
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
        result
    } else {
        Array2::from_shape_fn((h, w), |(row, col)| median_at(src, row, col))
    };

    ByteFrame::new(data, frame.calibration.clone(), frame.title.clone())
}

fn median_at(src: &Array2<u8>, row: usize, col: usize) -> u8 {
    let (h, w) = src.dim();
    let mut window = [0u8; 9];
    let mut i = 0;
    for dr in -1..=1_isize {
        let r = (row as isize + dr).clamp(0, h as isize - 1) as usize;
        for dc in -1..=1_isize {
            let c = (col as isize + dc).clamp(0, w as isize - 1) as usize;
            window[i] = src[[r, c]];
            i += 1;
        }
    }
    *window.select_nth_unstable(4).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Calibration;

    fn frame(data: Array2<u8>) -> ByteFrame {
        ByteFrame::new(data, Calibration::default(), "t")
    }

    #[test]
    fn test_isolated_pixel_removed() {
        let mut data = Array2::<u8>::zeros((5, 5));
        data[[2, 2]] = 255;
        let out = median_3x3(&frame(data));
        assert_eq!(out.count_nonzero(), 0);
    }

    #[test]
    fn test_solid_block_interior_kept() {
        let mut data = Array2::<u8>::zeros((7, 7));
        for r in 1..6 {
            for c in 1..6 {
                data[[r, c]] = 255;
            }
        }
        let out = median_3x3(&frame(data));
        assert_eq!(out.data[[3, 3]], 255);
        // Convex corners of a square lose to the background majority.
        assert_eq!(out.data[[1, 1]], 0);
        assert_eq!(out.data[[1, 3]], 255);
    }

    #[test]
    fn test_edge_replication_keeps_full_row() {
        let mut data = Array2::<u8>::zeros((4, 4));
        for c in 0..4 {
            data[[0, c]] = 255;
        }
        let out = median_3x3(&frame(data));
        for c in 0..4 {
            assert_eq!(out.data[[0, c]], 255);
            assert_eq!(out.data[[1, c]], 0);
        }
    }
}
