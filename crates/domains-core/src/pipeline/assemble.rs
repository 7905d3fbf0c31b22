use crate::detection::{Domain, ShapeMeasurements};
use crate::error::{DomainsError, Result};
use crate::metadata::ExperimentMetadata;
use crate::roi::RoiStats;

/// One line of the results table.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    /// 1-based domain index.
    pub domain: usize,
    pub shape: ShapeMeasurements,
    pub area_fraction: f64,
    pub roi: RoiStats,
    /// Same for every row of a stack.
    pub metadata: ExperimentMetadata,
}

/// Join domains with their ROI statistics and the stack's metadata.
///
/// `stats[i]` must belong to `domains[i]`; rows keep detection order.
pub fn assemble_rows(
    domains: &[Domain],
    stats: &[RoiStats],
    metadata: &ExperimentMetadata,
) -> Result<Vec<ResultRow>> {
    if domains.len() != stats.len() {
        return Err(DomainsError::Analysis(format!(
            "{} domains but {} ROI measurements",
            domains.len(),
            stats.len()
        )));
    }

    Ok(domains
        .iter()
        .zip(stats)
        .map(|(domain, roi)| ResultRow {
            domain: domain.index,
            shape: domain.shape.clone(),
            area_fraction: domain.area_fraction,
            roi: *roi,
            metadata: metadata.clone(),
        })
        .collect())
}
