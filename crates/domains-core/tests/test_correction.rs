mod common;

use std::sync::Arc;

use domains_core::correction::{add_saturating, correct_aberration, FileMask, MaskAsset, NoMask, StaticMask};
use domains_core::error::{DomainsError, Result};
use domains_core::frame::{ByteFrame, Calibration, ImageStack};
use domains_core::io::image_io::save_tiff;
use domains_core::pipeline::{analyze_stack, run_batch, AnalysisConfig, NoOpReporter, StackOutcome};
use ndarray::{array, Array2};

use common::two_blob_stack;

#[test]
fn test_saturating_sum_on_2x2() {
    let seg = ByteFrame::new(
        array![[0u8, 255], [200, 10]],
        Calibration::new(0.2, 0.2, "micron"),
        "cellA",
    );
    let mask = array![[0u8, 10], [100, 5]];

    let out = add_saturating(&seg, &mask).unwrap();
    assert_eq!(out.data, array![[0u8, 255], [255, 15]]);
    assert_eq!(out.title, "cellA");
    assert_eq!(out.calibration, seg.calibration);
}

#[test]
fn test_size_mismatch_is_reported() {
    let seg = ByteFrame::new(Array2::zeros((2, 2)), Calibration::default(), "x");
    let err = add_saturating(&seg, &Array2::zeros((3, 2))).unwrap_err();
    assert!(matches!(
        err,
        DomainsError::MaskSizeMismatch { width: 2, height: 2, found_width: 2, found_height: 3 }
    ));
}

#[test]
fn test_missing_file_mask() {
    let dir = tempfile::tempdir().unwrap();
    let asset = FileMask(dir.path().join("Aberration.tif"));
    assert!(matches!(asset.load(), Err(DomainsError::AssetMissing(_))));
    assert!(matches!(NoMask.load(), Err(DomainsError::AssetMissing(_))));
}

#[test]
fn test_file_mask_round_trips_through_tiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.tif");
    let data = array![[0u8, 1, 2], [253, 254, 255]];
    save_tiff(&ByteFrame::new(data.clone(), Calibration::default(), "m"), &path).unwrap();

    assert_eq!(FileMask(path).load().unwrap(), data);
}

#[test]
fn test_correct_aberration_with_static_mask() {
    let seg = ByteFrame::new(array![[255u8, 0], [0, 0]], Calibration::default(), "s");
    let asset = StaticMask(array![[0u8, 0], [0, 255]]);
    let out = correct_aberration(&seg, &asset).unwrap();
    assert_eq!(out.count_nonzero(), 2);
}

#[test]
fn test_full_mask_merges_everything_into_one_region() {
    let config = AnalysisConfig {
        aberration_correction: true,
        min_area: 0.0,
        max_area: 100.0,
        ..Default::default()
    };
    let asset = StaticMask(Array2::from_elem((4, 4), 255u8));
    let analysis = analyze_stack(&two_blob_stack("s.lif - cellA"), &config, &asset).unwrap();

    let seg = analysis.segmentation.unwrap();
    assert_eq!(seg.threshold.count_nonzero(), 4);
    assert_eq!(seg.mask.count_nonzero(), 16);
    assert_eq!(seg.domains.len(), 1);
    assert_eq!(seg.domains[0].shape.pixel_area, 16);
}

#[test]
fn test_missing_asset_fails_only_its_stacks() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        aberration_correction: true,
        ..Default::default()
    };
    let stacks = vec![two_blob_stack("s.lif - a"), two_blob_stack("s.lif - b")];
    let source = move || -> Result<Vec<ImageStack>> { Ok(stacks.clone()) };
    let asset = FileMask(dir.path().join("nowhere.tif"));

    let report = run_batch(&source, &config, &asset, dir.path(), Arc::new(NoOpReporter)).unwrap();
    assert_eq!(report.failed(), 2);
    for outcome in &report.stacks {
        assert!(matches!(
            outcome,
            StackOutcome::Failed { error: DomainsError::AssetMissing(_), .. }
        ));
    }
}
