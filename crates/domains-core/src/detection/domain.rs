use ndarray::Array2;
use tracing::debug;

use crate::consts::{BACKGROUND, GRAY8_MAX};
use crate::frame::ByteFrame;

use super::components::connected_components;
use super::config::DomainFilter;
use super::measure::{measure_shape, ShapeMeasurements};
use super::outline::Outline;

/// One region that passed the area and circularity filter.
#[derive(Clone, Debug)]
pub struct Domain {
    /// 1-based position in detection order.
    pub index: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
    /// Outer boundary, reused as the ROI for intensity sampling.
    pub outline: Outline,
    pub shape: ShapeMeasurements,
    /// Percentage of pixels inside the outline that are foreground.
    pub area_fraction: f64,
}

/// Output of [`detect_domains`].
#[derive(Clone, Debug)]
pub struct Detection {
    /// Retained regions in scan order of their first pixel.
    pub domains: Vec<Domain>,
    /// White image with the boundary pixels of every retained region in black.
    pub outlines: ByteFrame,
    /// Number of connected regions before filtering.
    pub candidates: usize,
}

impl Detection {
    /// Drop every retained domain and blank the outline raster, leaving
    /// the result of a detection that found nothing.
    pub fn discard_domains(&mut self) {
        self.domains.clear();
        self.outlines.data.fill(GRAY8_MAX);
    }
}

/// Label the non-zero pixels of `mask` (8-connected), measure every region
/// and keep those within the filter bounds.
///
/// An empty mask yields an empty detection, not an error.
pub fn detect_domains(mask: &ByteFrame, filter: &DomainFilter) -> Detection {
    let (h, w) = mask.data.dim();
    let calibration = &mask.calibration;
    let foreground = mask.data.mapv(|v| v != BACKGROUND);
    let labeling = connected_components(&foreground);
    let labels = &labeling.labels;

    let mut region_pixels: Vec<Vec<(usize, usize)>> =
        vec![Vec::new(); labeling.components.len()];
    for ((row, col), &label) in labels.indexed_iter() {
        if label > 0 {
            region_pixels[label as usize - 1].push((row, col));
        }
    }

    let (min_px, max_px) = filter.pixel_bounds(calibration);
    let mut outlines = Array2::<u8>::from_elem((h, w), GRAY8_MAX);
    let mut domains = Vec::new();

    for component in &labeling.components {
        let area = component.area as f64;
        if area < min_px || area > max_px {
            continue;
        }

        let pixels = &region_pixels[component.label as usize - 1];
        let outline = Outline::trace(labels, component.label, component.start);
        let shape = measure_shape(pixels, &outline, calibration);
        if !filter.accepts(shape.pixel_area, shape.circularity, calibration) {
            continue;
        }

        let interior = outline.interior_pixels();
        let covered = interior
            .iter()
            .filter(|&&(row, col)| row < h && col < w && foreground[[row, col]])
            .count();
        let area_fraction = if interior.is_empty() {
            0.0
        } else {
            100.0 * covered as f64 / interior.len() as f64
        };

        draw_boundary(&mut outlines, labels, component.label, pixels);

        domains.push(Domain {
            index: domains.len() + 1,
            bbox: component.bbox,
            outline,
            shape,
            area_fraction,
        });
    }

    debug!(
        title = %mask.title,
        candidates = labeling.components.len(),
        retained = domains.len(),
        min_area_px = min_px,
        max_area_px = max_px,
        "Domain detection complete"
    );

    Detection {
        domains,
        outlines: ByteFrame::new(outlines, calibration.clone(), mask.title.clone()),
        candidates: labeling.components.len(),
    }
}

/// Blacken region pixels that touch a 4-neighbour outside the region.
fn draw_boundary(canvas: &mut Array2<u8>, labels: &Array2<u32>, label: u32, pixels: &[(usize, usize)]) {
    let (h, w) = labels.dim();
    for &(row, col) in pixels {
        let on_edge = row == 0
            || col == 0
            || row + 1 == h
            || col + 1 == w
            || labels[[row - 1, col]] != label
            || labels[[row + 1, col]] != label
            || labels[[row, col - 1]] != label
            || labels[[row, col + 1]] != label;
        if on_edge {
            canvas[[row, col]] = BACKGROUND;
        }
    }
}
