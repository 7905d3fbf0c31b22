/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of histogram bins for 8-bit thresholding.
pub const HISTOGRAM_BINS: usize = 256;

/// Largest value of an 8-bit pixel.
pub const GRAY8_MAX: u8 = 255;

/// Pixel value written for foreground in binary masks.
pub const FOREGROUND: u8 = 255;

/// Pixel value written for background in binary masks.
pub const BACKGROUND: u8 = 0;

/// Default lower bound on domain area, in calibrated units.
pub const DEFAULT_MIN_AREA: f64 = 0.0;

/// Default upper bound on domain area, in calibrated units.
pub const DEFAULT_MAX_AREA: f64 = 1000.0;

/// Default lower bound on domain circularity.
pub const DEFAULT_MIN_CIRC: f64 = 0.01;

/// Default upper bound on domain circularity.
pub const DEFAULT_MAX_CIRC: f64 = 1.0;

/// Default metadata column list (comma separated).
pub const DEFAULT_EXPERIMENT_COLUMNS: &str = "experiment";

/// Subdirectory of the working directory that receives all outputs.
pub const PROCESSED_DIR: &str = "processed";

/// Version of the title tokenization contract implemented by
/// [`crate::metadata`]. Bump whenever the rules change.
pub const TITLE_CONVENTION_VERSION: u32 = 1;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-10;
