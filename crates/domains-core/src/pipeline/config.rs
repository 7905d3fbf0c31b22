use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_EXPERIMENT_COLUMNS, DEFAULT_MAX_AREA, DEFAULT_MAX_CIRC, DEFAULT_MIN_AREA,
    DEFAULT_MIN_CIRC,
};
use crate::detection::DomainFilter;
use crate::error::{DomainsError, Result};
use crate::frame::Calibration;
use crate::metadata::{column_names, TitleConvention};
use crate::roi::RoiReference;

/// Settings for one batch run. Built once and shared read-only by every
/// stack in the batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run segmentation and domain analysis. When false only the averaged
    /// image is exported.
    pub process_domains: bool,
    /// Merge the correction mask into the segmentation before detection.
    pub aberration_correction: bool,
    /// Area bounds in calibrated units.
    pub min_area: f64,
    pub max_area: f64,
    pub min_circ: f64,
    pub max_circ: f64,
    /// Comma-separated metadata column names.
    pub experiment: String,
    /// Extra diagnostic logging; does not change results.
    pub verbose: bool,
    pub correction_mask: Option<PathBuf>,
    pub title: TitleConvention,
    pub roi_reference: RoiReference,
    /// Process stacks on the rayon pool instead of one at a time.
    pub parallel: bool,
    /// Replaces the calibration reported by the importer.
    pub calibration_override: Option<Calibration>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            process_domains: true,
            aberration_correction: false,
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
            min_circ: DEFAULT_MIN_CIRC,
            max_circ: DEFAULT_MAX_CIRC,
            experiment: DEFAULT_EXPERIMENT_COLUMNS.to_string(),
            verbose: false,
            correction_mask: None,
            title: TitleConvention::default(),
            roi_reference: RoiReference::default(),
            parallel: false,
            calibration_override: None,
        }
    }
}

impl AnalysisConfig {
    /// Metadata column names parsed from `experiment`.
    pub fn column_names(&self) -> Vec<String> {
        column_names(&self.experiment)
    }

    /// Log filter for the CLI subscriber: `debug` when verbose, else `warn`.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }

    pub fn domain_filter(&self) -> DomainFilter {
        DomainFilter {
            min_area: self.min_area,
            max_area: self.max_area,
            min_circ: self.min_circ,
            max_circ: self.max_circ,
        }
    }

    /// Reject bounds that could never retain a domain.
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("min_area", self.min_area),
            ("max_area", self.max_area),
            ("min_circ", self.min_circ),
            ("max_circ", self.max_circ),
        ];
        for (name, value) in bounds {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainsError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.min_area > self.max_area {
            return Err(DomainsError::Config(format!(
                "min_area ({}) exceeds max_area ({})",
                self.min_area, self.max_area
            )));
        }
        if self.min_circ > self.max_circ {
            return Err(DomainsError::Config(format!(
                "min_circ ({}) exceeds max_circ ({})",
                self.min_circ, self.max_circ
            )));
        }
        if let Some(cal) = &self.calibration_override {
            if !(cal.pixel_width > 0.0 && cal.pixel_height > 0.0) {
                return Err(DomainsError::Config(format!(
                    "pixel size must be positive, got {}x{}",
                    cal.pixel_width, cal.pixel_height
                )));
            }
        }
        if self.column_names().is_empty() {
            return Err(DomainsError::Config(
                "experiment must name at least one column".into(),
            ));
        }
        Ok(())
    }
}
