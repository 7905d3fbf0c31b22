use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Physical size of one pixel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub pixel_width: f64,
    pub pixel_height: f64,
    /// Length unit of `pixel_width` / `pixel_height` (e.g. "micron").
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    "pixel".to_string()
}

impl Calibration {
    pub fn new(pixel_width: f64, pixel_height: f64, unit: impl Into<String>) -> Self {
        Self {
            pixel_width,
            pixel_height,
            unit: unit.into(),
        }
    }

    /// Physical area covered by one pixel.
    pub fn pixel_area(&self) -> f64 {
        self.pixel_width * self.pixel_height
    }

    /// Convert a physical area to a pixel count.
    pub fn to_pixels(&self, area: f64) -> f64 {
        area / self.pixel_area()
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            pixel_height: 1.0,
            unit: default_unit(),
        }
    }
}

/// A single floating-point intensity frame in the source's native units
/// (0..255 for 8-bit data, 0..65535 for 16-bit data).
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Bit depth of the data this frame was derived from (8 or 16)
    pub bit_depth: u8,
    pub calibration: Calibration,
    pub title: String,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8, calibration: Calibration) -> Self {
        Self {
            data,
            bit_depth,
            calibration,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// An 8-bit frame: normalized intensities, binary masks and outline drawings.
#[derive(Clone, Debug, PartialEq)]
pub struct ByteFrame {
    pub data: Array2<u8>,
    pub calibration: Calibration,
    pub title: String,
}

impl ByteFrame {
    pub fn new(data: Array2<u8>, calibration: Calibration, title: impl Into<String>) -> Self {
        Self {
            data,
            calibration,
            title: title.into(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Number of non-zero pixels.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// A decoded time series of frames sharing size and calibration.
#[derive(Clone, Debug)]
pub struct ImageStack {
    /// Display title as reported by the importer. Output names and
    /// experiment metadata are derived from it.
    pub title: String,
    /// Name of the container the stack was decoded from, without extension.
    pub source_name: Option<String>,
    pub frames: Vec<Array2<f32>>,
    pub bit_depth: u8,
    pub calibration: Calibration,
}

impl ImageStack {
    pub fn new(
        title: impl Into<String>,
        frames: Vec<Array2<f32>>,
        bit_depth: u8,
        calibration: Calibration,
    ) -> Self {
        Self {
            title: title.into(),
            source_name: None,
            frames,
            bit_depth,
            calibration,
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Whether the stack takes part in domain analysis.
    pub fn is_time_series(&self) -> bool {
        self.frames.len() > 1
    }

    /// (height, width) of the frames, or (0, 0) for an empty stack.
    pub fn dim(&self) -> (usize, usize) {
        self.frames.first().map(|f| f.dim()).unwrap_or((0, 0))
    }
}
