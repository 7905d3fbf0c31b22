use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_AREA, DEFAULT_MAX_CIRC, DEFAULT_MIN_AREA, DEFAULT_MIN_CIRC};
use crate::frame::Calibration;

/// Acceptance bounds for detected regions. Areas are in calibrated units
/// and converted to pixels with the image calibration at the point of use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainFilter {
    pub min_area: f64,
    pub max_area: f64,
    pub min_circ: f64,
    pub max_circ: f64,
}

impl DomainFilter {
    /// Area bounds in pixels for the given calibration.
    pub fn pixel_bounds(&self, calibration: &Calibration) -> (f64, f64) {
        (
            calibration.to_pixels(self.min_area),
            calibration.to_pixels(self.max_area),
        )
    }

    /// Whether a region of `pixel_area` pixels and the given circularity
    /// passes. Both ranges are inclusive.
    pub fn accepts(&self, pixel_area: usize, circularity: f64, calibration: &Calibration) -> bool {
        let (min_px, max_px) = self.pixel_bounds(calibration);
        let area = pixel_area as f64;
        area >= min_px
            && area <= max_px
            && circularity >= self.min_circ
            && circularity <= self.max_circ
    }
}

impl Default for DomainFilter {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
            min_circ: DEFAULT_MIN_CIRC,
            max_circ: DEFAULT_MAX_CIRC,
        }
    }
}
