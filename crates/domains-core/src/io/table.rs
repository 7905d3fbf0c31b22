use std::path::Path;

use crate::error::{DomainsError, Result};
use crate::pipeline::ResultRow;

/// Measurement columns, in output order. Metadata columns follow.
pub const MEASUREMENT_COLUMNS: [&str; 19] = [
    "Domain", "Area", "PixelArea", "%Area", "Perim.", "X", "Y", "Feret", "FeretX", "FeretY",
    "FeretAngle", "MinFeret", "Circ.", "AR", "Round", "Solidity", "ROIMean", "ROIMin", "ROIMax",
];

/// Full header line for a table with the given metadata columns.
pub fn header(metadata_columns: &[String]) -> Vec<String> {
    MEASUREMENT_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(metadata_columns.iter().cloned())
        .collect()
}

/// Render one row as CSV fields, matching [`header`].
pub fn format_row(row: &ResultRow) -> Vec<String> {
    let s = &row.shape;
    let num = |v: f64| format!("{v:.3}");
    let mut fields = vec![
        row.domain.to_string(),
        num(s.area),
        s.pixel_area.to_string(),
        num(row.area_fraction),
        num(s.perimeter),
        num(s.centroid_x),
        num(s.centroid_y),
        num(s.feret),
        s.feret_x.to_string(),
        s.feret_y.to_string(),
        num(s.feret_angle),
        num(s.min_feret),
        num(s.circularity),
        num(s.aspect_ratio),
        num(s.roundness),
        num(s.solidity),
        num(row.roi.mean),
        num(row.roi.min),
        num(row.roi.max),
    ];
    fields.extend(row.metadata.values().map(str::to_string));
    fields
}

/// Write the results table. An empty row set still gets its header.
pub fn write_results(path: &Path, metadata_columns: &[String], rows: &[ResultRow]) -> Result<()> {
    let export = |e: csv::Error| DomainsError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut wtr = csv::Writer::from_path(path).map_err(export)?;
    wtr.write_record(header(metadata_columns)).map_err(export)?;
    for row in rows {
        wtr.write_record(format_row(row)).map_err(export)?;
    }
    wtr.flush().map_err(|e| DomainsError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}
