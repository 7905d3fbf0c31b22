mod common;

use std::path::Path;
use std::sync::Arc;

use approx::assert_relative_eq;
use domains_core::correction::NoMask;
use domains_core::error::{DomainsError, Result};
use domains_core::frame::{Calibration, ImageStack};
use domains_core::pipeline::{
    analyze_stack, export_analysis, run_batch, AnalysisConfig, NoOpReporter, StackOutcome,
};
use domains_core::roi::RoiReference;
use ndarray::Array2;

use common::{flat_stack, repeat_stack, two_blob_stack};

fn two_blob_config() -> AnalysisConfig {
    AnalysisConfig {
        min_area: 2.0,
        max_area: 10.0,
        experiment: "cellLine,label".into(),
        ..Default::default()
    }
}

fn batch(stacks: Vec<ImageStack>, config: &AnalysisConfig, dir: &Path) -> Result<domains_core::pipeline::BatchReport> {
    let source = move || -> Result<Vec<ImageStack>> { Ok(stacks.clone()) };
    run_batch(&source, config, &NoMask, dir, Arc::new(NoOpReporter))
}

#[test]
fn test_end_to_end_keeps_only_large_blob() {
    let stack = two_blob_stack("session.lif - cellA_di8");
    let analysis = analyze_stack(&stack, &two_blob_config(), &NoMask).unwrap();

    assert_eq!(analysis.stem, "cellA_di8");
    assert_eq!(analysis.rows.len(), 1);

    let seg = analysis.segmentation.as_ref().unwrap();
    assert_eq!(seg.domains.len(), analysis.rows.len());
    assert_eq!(seg.mask.count_nonzero(), 4);

    let row = &analysis.rows[0];
    assert_eq!(row.domain, 1);
    assert_eq!(row.shape.pixel_area, 4);
    assert_relative_eq!(row.shape.area, 4.0);
    assert_relative_eq!(row.area_fraction, 100.0);
    assert_relative_eq!(row.roi.mean, 255.0);
    assert_relative_eq!(row.roi.min, 255.0);
    assert_relative_eq!(row.roi.max, 255.0);
    assert_eq!(row.metadata.get("cellLine"), Some("cellA"));
    assert_eq!(row.metadata.get("label"), Some("di8"));
    assert!(analysis.mismatch.is_none());
}

#[test]
fn test_projected_roi_reference_uses_native_units() {
    let config = AnalysisConfig {
        roi_reference: RoiReference::Projected,
        ..two_blob_config()
    };
    let stack = two_blob_stack("session.lif - cellA_di8");
    let analysis = analyze_stack(&stack, &config, &NoMask).unwrap();
    assert_relative_eq!(analysis.rows[0].roi.mean, 200.0);
}

#[test]
fn test_batch_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let report = batch(
        vec![two_blob_stack("session.lif - cellA_di8")],
        &two_blob_config(),
        dir.path(),
    )
    .unwrap();

    assert_eq!(report.processed(), 1);
    assert_eq!(report.total_domains(), 1);

    let processed = dir.path().join("processed");
    for suffix in ["stack.tif", "threshold.tif", "mask.tif", "outlines.tif", "dat.csv"] {
        assert!(
            processed.join(format!("cellA_di8-{suffix}")).is_file(),
            "missing {suffix}"
        );
    }

    let csv = std::fs::read_to_string(processed.join("cellA_di8-dat.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("ROIMax,cellLine,label"));
    assert!(lines[1].starts_with("1,4.000,4,100.000,"));
    assert!(lines[1].ends_with(",cellA,di8"));
}

#[test]
fn test_rerun_produces_identical_csv() {
    let config = two_blob_config();
    let stack = two_blob_stack("session.lif - cellA_di8");
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();

    for dir in [a.path(), b.path()] {
        let analysis = analyze_stack(&stack, &config, &NoMask).unwrap();
        export_analysis(&analysis, dir).unwrap();
    }

    let first = std::fs::read(a.path().join("cellA_di8-dat.csv")).unwrap();
    let second = std::fs::read(b.path().join("cellA_di8-dat.csv")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_zero_foreground_gives_header_only_csv() {
    let dir = tempfile::tempdir().unwrap();
    let report = batch(vec![flat_stack("session.lif - flat")], &two_blob_config(), dir.path()).unwrap();

    match &report.stacks[0] {
        StackOutcome::Processed { domains, .. } => assert_eq!(*domains, 0),
        other => panic!("unexpected outcome {other:?}"),
    }
    let csv = std::fs::read_to_string(dir.path().join("processed/flat-dat.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn test_process_domains_off_writes_only_average() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        process_domains: false,
        ..two_blob_config()
    };
    let report = batch(vec![two_blob_stack("session.lif - cellA_di8")], &config, dir.path()).unwrap();

    match &report.stacks[0] {
        StackOutcome::Processed { outputs, .. } => assert_eq!(outputs.len(), 1),
        other => panic!("unexpected outcome {other:?}"),
    }
    let processed = dir.path().join("processed");
    assert!(processed.join("cellA_di8-stack.tif").is_file());
    assert!(!processed.join("cellA_di8-dat.csv").exists());
}

#[test]
fn test_batch_continues_past_bad_stacks() {
    let dir = tempfile::tempdir().unwrap();
    let single = repeat_stack(
        "session.lif - single",
        &Array2::zeros((4, 4)),
        1,
        Calibration::default(),
    );
    let stacks = vec![
        two_blob_stack("plain"),
        single,
        two_blob_stack("session.lif - cellB_di8"),
    ];
    let report = batch(stacks, &two_blob_config(), dir.path()).unwrap();

    assert_eq!(report.stacks.len(), 3);
    assert!(matches!(
        &report.stacks[0],
        StackOutcome::Failed { error: DomainsError::AmbiguousTitle { .. }, .. }
    ));
    assert!(matches!(&report.stacks[1], StackOutcome::Skipped { frames: 1, .. }));
    assert!(matches!(&report.stacks[2], StackOutcome::Processed { domains: 1, .. }));
    assert_eq!(report.stacks[2].title(), "session.lif - cellB_di8");
}

#[test]
fn test_parallel_batch_keeps_decode_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        parallel: true,
        ..two_blob_config()
    };
    let titles: Vec<String> = (0..6).map(|i| format!("s.lif - cell{i}_di8")).collect();
    let stacks = titles.iter().map(|t| two_blob_stack(t)).collect();
    let report = batch(stacks, &config, dir.path()).unwrap();

    let got: Vec<&str> = report.stacks.iter().map(|s| s.title()).collect();
    assert_eq!(got, titles.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(report.total_domains(), 6);
}

#[test]
fn test_import_failure_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    let source = || -> Result<Vec<ImageStack>> { Err(DomainsError::Import("unreadable".into())) };
    let result = run_batch(&source, &AnalysisConfig::default(), &NoMask, dir.path(), Arc::new(NoOpReporter));
    assert!(matches!(result, Err(DomainsError::Import(_))));
    assert!(!dir.path().join("processed").exists());
}

#[test]
fn test_invalid_config_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        min_circ: 0.9,
        max_circ: 0.1,
        ..Default::default()
    };
    assert!(matches!(
        batch(vec![two_blob_stack("a - b")], &config, dir.path()),
        Err(DomainsError::Config(_))
    ));
}

/// Squares of several sizes, a long bar and a few specks on a 40x40 field.
fn mixed_blob_stack() -> ImageStack {
    let mut f = Array2::from_elem((40, 40), 10.0f32);
    let mut fill = |r0: usize, c0: usize, h: usize, w: usize| {
        for r in r0..r0 + h {
            for c in c0..c0 + w {
                f[[r, c]] = 200.0;
            }
        }
    };
    fill(2, 2, 3, 3);
    fill(2, 10, 4, 4);
    fill(2, 20, 5, 5);
    fill(12, 2, 6, 6);
    fill(12, 12, 3, 12);
    fill(25, 25, 8, 8);
    fill(36, 2, 1, 1);
    fill(36, 10, 2, 2);
    repeat_stack(
        "scan.lif - mixed",
        &f,
        3,
        Calibration::new(0.5, 0.5, "micron"),
    )
}

#[test]
fn test_retained_domains_respect_bounds() {
    let config = AnalysisConfig {
        min_area: 2.0,
        max_area: 6.0,
        min_circ: 0.5,
        max_circ: 1.0,
        ..Default::default()
    };
    let analysis = analyze_stack(&mixed_blob_stack(), &config, &NoMask).unwrap();
    let seg = analysis.segmentation.as_ref().unwrap();

    assert!(!seg.domains.is_empty());
    assert!(seg.domains.len() < seg.candidates);
    assert_eq!(analysis.rows.len(), seg.domains.len());
    for row in &analysis.rows {
        assert!(row.shape.area >= config.min_area && row.shape.area <= config.max_area);
        assert!(row.shape.circularity >= config.min_circ && row.shape.circularity <= config.max_circ);
    }
    for (i, row) in analysis.rows.iter().enumerate() {
        assert_eq!(row.domain, i + 1);
    }
}

#[test]
fn test_calibration_override_scales_areas() {
    let config = AnalysisConfig {
        calibration_override: Some(Calibration::new(0.5, 0.5, "micron")),
        min_area: 0.5,
        max_area: 2.0,
        ..Default::default()
    };
    let analysis = analyze_stack(&two_blob_stack("s.lif - c_d"), &config, &NoMask).unwrap();
    assert_eq!(analysis.projected.calibration.unit, "micron");
    assert_eq!(analysis.rows.len(), 1);
    assert_relative_eq!(analysis.rows[0].shape.area, 1.0);
}

#[test]
fn test_colliding_stems_fail_the_later_stack() {
    // Both titles reduce to the stem "04".
    for parallel in [false, true] {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            parallel,
            ..two_blob_config()
        };
        let stacks = vec![
            two_blob_stack("2021-04-a.ser - 2021-04-a"),
            flat_stack("2021-04-b.ser - 2021-04-b"),
        ];
        let report = batch(stacks, &config, dir.path()).unwrap();

        assert!(matches!(
            &report.stacks[0],
            StackOutcome::Processed { stem, domains: 1, .. } if stem == "04"
        ));
        assert!(matches!(
            &report.stacks[1],
            StackOutcome::Failed { error: DomainsError::AmbiguousTitle { .. }, .. }
        ));

        let csv = std::fs::read_to_string(dir.path().join("processed/04-dat.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }
}
