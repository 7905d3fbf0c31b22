use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::consts::PROCESSED_DIR;
use crate::correction::{correct_aberration, MaskAsset};
use crate::detection::threshold::auto_threshold;
use crate::detection::{detect_domains, Domain};
use crate::error::{DomainsError, Result};
use crate::filters::median::median_3x3;
use crate::filters::normalize::to_gray8;
use crate::frame::{ByteFrame, Frame, ImageStack};
use crate::io::image_io::save_tiff;
use crate::io::source::{StackEntry, StackSource};
use crate::io::table::write_results;
use crate::metadata::{derive_stem, parse_title, MetadataMismatch};
use crate::projection::average_projection;
use crate::roi::{measure_rois, RoiReference};

use super::assemble::{assemble_rows, ResultRow};
use super::config::AnalysisConfig;
use super::types::{BatchReport, PipelineStage, ProgressReporter, StackOutcome};

/// Segmentation and detection products of one stack.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Triangle level; pixels at or above it were foreground.
    pub level: u16,
    /// Thresholded and median-filtered mask, before correction.
    pub threshold: ByteFrame,
    /// Mask the domains were detected in.
    pub mask: ByteFrame,
    pub outlines: ByteFrame,
    /// Connected regions before filtering.
    pub candidates: usize,
    pub domains: Vec<Domain>,
}

/// Everything computed for one stack, held in memory until exported.
#[derive(Clone, Debug)]
pub struct StackAnalysis {
    pub title: String,
    pub stem: String,
    /// Average of all frames in native units.
    pub projected: Frame,
    /// 8-bit autoscaled average.
    pub reference: ByteFrame,
    /// `None` when domain processing is disabled.
    pub segmentation: Option<Segmentation>,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub mismatch: Option<MetadataMismatch>,
}

impl StackAnalysis {
    pub fn domain_count(&self) -> usize {
        self.rows.len()
    }
}

/// Run projection, segmentation, detection and measurement for one stack.
/// Nothing is written to disk.
pub fn analyze_stack(
    stack: &ImageStack,
    config: &AnalysisConfig,
    asset: &dyn MaskAsset,
) -> Result<StackAnalysis> {
    let stem = derive_stem(&stack.title, &config.title)?;

    let mut projected = average_projection(stack)?;
    if let Some(calibration) = &config.calibration_override {
        projected.calibration = calibration.clone();
    }
    let reference = to_gray8(&projected);
    let columns = config.column_names();

    if !config.process_domains {
        return Ok(StackAnalysis {
            title: stack.title.clone(),
            stem,
            projected,
            reference,
            segmentation: None,
            columns,
            rows: Vec::new(),
            mismatch: None,
        });
    }

    let (binary, level) = auto_threshold(&reference);
    let threshold = median_3x3(&binary);
    let mask = if config.aberration_correction {
        correct_aberration(&threshold, asset)?
    } else {
        threshold.clone()
    };
    debug!(
        title = %stack.title,
        level,
        foreground = mask.count_nonzero(),
        "Segmentation complete"
    );

    let filter = config.domain_filter();
    let mut detection = detect_domains(&mask, &filter);
    if config.verbose {
        let (min_px, max_px) = filter.pixel_bounds(&mask.calibration);
        info!(
            title = %stack.title,
            min_area = filter.min_area,
            max_area = filter.max_area,
            min_area_px = min_px,
            max_area_px = max_px,
            candidates = detection.candidates,
            retained = detection.domains.len(),
            "Domain filter applied"
        );
    }

    let parsed = parse_title(
        &stack.title,
        &columns,
        &config.title,
        stack.source_name.as_deref(),
    )?;
    if let Some(mismatch) = &parsed.mismatch {
        warn!(title = %stack.title, %mismatch, "Metadata does not match experiment columns");
    }

    let sample = match config.roi_reference {
        RoiReference::Normalized => reference.data.mapv(f32::from),
        RoiReference::Projected => projected.data.clone(),
    };

    let rows = match measure_rois(&sample, &detection.domains)
        .and_then(|stats| assemble_rows(&detection.domains, &stats, &parsed.metadata))
    {
        Ok(rows) => rows,
        Err(DomainsError::Analysis(reason)) => {
            warn!(title = %stack.title, %reason, "Domain measurement failed, reporting no domains");
            detection.discard_domains();
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    Ok(StackAnalysis {
        title: stack.title.clone(),
        stem,
        projected,
        reference,
        segmentation: Some(Segmentation {
            level,
            threshold,
            mask,
            outlines: detection.outlines,
            candidates: detection.candidates,
            domains: detection.domains,
        }),
        columns,
        rows,
        mismatch: parsed.mismatch,
    })
}

/// Write the artifacts of one analysis into `processed_dir`, returning the
/// paths written.
///
/// Always writes `{stem}-stack.tif`; with segmentation also
/// `-threshold.tif`, `-mask.tif`, `-outlines.tif` and `-dat.csv`.
pub fn export_analysis(analysis: &StackAnalysis, processed_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(processed_dir).map_err(|e| DomainsError::Export {
        path: processed_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let path_for = |suffix: &str| processed_dir.join(format!("{}-{suffix}", analysis.stem));
    let mut outputs = Vec::new();

    let mut tiff = |frame: &ByteFrame, suffix: &str| -> Result<()> {
        let path = path_for(suffix);
        save_tiff(frame, &path).map_err(|e| DomainsError::Export {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        outputs.push(path);
        Ok(())
    };

    tiff(&analysis.reference, "stack.tif")?;
    if let Some(seg) = &analysis.segmentation {
        tiff(&seg.threshold, "threshold.tif")?;
        tiff(&seg.mask, "mask.tif")?;
        tiff(&seg.outlines, "outlines.tif")?;

        let csv_path = path_for("dat.csv");
        write_results(&csv_path, &analysis.columns, &analysis.rows)?;
        outputs.push(csv_path);
    }

    Ok(outputs)
}

/// Import every stack from `source` and process them one by one, writing
/// outputs under `work_dir/processed`.
///
/// Only configuration and import failures abort the batch; everything that
/// goes wrong with a single stack is recorded in its [`StackOutcome`].
pub fn run_batch(
    source: &dyn StackSource,
    config: &AnalysisConfig,
    asset: &dyn MaskAsset,
    work_dir: &Path,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<BatchReport> {
    config.validate()?;

    reporter.begin_stage(PipelineStage::Importing, None);
    let entries = source.load_entries()?;
    reporter.finish_stage();
    info!(stacks = entries.len(), "Import complete");

    let claims = claim_stems(&entries, config);
    let processed_dir = work_dir.join(PROCESSED_DIR);
    let total = entries.len();
    let done = AtomicUsize::new(0);
    reporter.begin_stage(PipelineStage::Analyzing, Some(total));

    let process = |((title, stack), claim): (StackEntry, Option<String>)| {
        let outcome = match (stack, claim) {
            (Err(error), _) => StackOutcome::Failed { title, error },
            (Ok(stack), Some(holder)) => {
                warn!(title = %stack.title, %holder, "Output stem already taken");
                StackOutcome::Failed {
                    title,
                    error: DomainsError::AmbiguousTitle {
                        title: stack.title,
                        reason: format!("output stem is already used by \"{holder}\""),
                    },
                }
            }
            (Ok(stack), None) => process_stack(&stack, config, asset, &processed_dir),
        };
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
        outcome
    };

    let work: Vec<(StackEntry, Option<String>)> = entries.into_iter().zip(claims).collect();
    let outcomes: Vec<StackOutcome> = if config.parallel {
        work.into_par_iter().map(process).collect()
    } else {
        work.into_iter().map(process).collect()
    };
    reporter.finish_stage();

    let report = BatchReport { stacks: outcomes };
    info!(
        processed = report.processed(),
        skipped = report.skipped(),
        failed = report.failed(),
        domains = report.total_domains(),
        "Batch complete"
    );
    Ok(report)
}

/// For each entry, the title of an earlier stack whose output stem it
/// would overwrite. Only stacks that will be analyzed claim a stem.
fn claim_stems(entries: &[StackEntry], config: &AnalysisConfig) -> Vec<Option<String>> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    entries
        .iter()
        .map(|(title, stack)| {
            let stack = stack.as_ref().ok().filter(|stack| stack.is_time_series())?;
            let stem = derive_stem(&stack.title, &config.title).ok()?;
            match owners.entry(stem) {
                Entry::Occupied(owner) => Some(owner.get().to_string()),
                Entry::Vacant(slot) => {
                    slot.insert(title);
                    None
                }
            }
        })
        .collect()
}

fn process_stack(
    stack: &ImageStack,
    config: &AnalysisConfig,
    asset: &dyn MaskAsset,
    processed_dir: &Path,
) -> StackOutcome {
    if !stack.is_time_series() {
        debug!(title = %stack.title, frames = stack.frame_count(), "Skipping single-frame stack");
        return StackOutcome::Skipped {
            title: stack.title.clone(),
            frames: stack.frame_count(),
        };
    }

    let result = analyze_stack(stack, config, asset)
        .and_then(|analysis| export_analysis(&analysis, processed_dir).map(|out| (analysis, out)));

    match result {
        Ok((analysis, outputs)) => {
            info!(
                title = %stack.title,
                stem = %analysis.stem,
                domains = analysis.domain_count(),
                "Stack processed"
            );
            StackOutcome::Processed {
                title: analysis.title,
                stem: analysis.stem,
                domains: analysis.rows.len(),
                outputs,
            }
        }
        Err(error) => {
            warn!(title = %stack.title, %error, "Stack failed");
            StackOutcome::Failed {
                title: stack.title.clone(),
                error,
            }
        }
    }
}
