use domains_core::frame::Calibration;
use domains_core::metadata::{SegmentIndex, StemSegments};
use domains_core::pipeline::{AnalysisConfig, PipelineStage};
use domains_core::roi::RoiReference;

#[test]
fn test_default_config_round_trips_through_toml() {
    let config = AnalysisConfig {
        calibration_override: Some(Calibration::new(0.1, 0.1, "micron")),
        correction_mask: Some("masks/Aberration.tif".into()),
        ..Default::default()
    };
    let text = toml::to_string_pretty(&config).unwrap();
    let back: AnalysisConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: AnalysisConfig = toml::from_str(
        r#"
        min_area = 0.5
        experiment = "cellLine,label"
        roi_reference = "Projected"

        [title]
        metadata_segment = { Index = 2 }
        stem_segments = "SecondAndThird"
        "#,
    )
    .unwrap();

    assert_eq!(config.min_area, 0.5);
    assert_eq!(config.max_area, 1000.0);
    assert!(config.process_domains);
    assert!(!config.aberration_correction);
    assert_eq!(config.roi_reference, RoiReference::Projected);
    assert_eq!(config.title.metadata_segment, SegmentIndex::Index(2));
    assert_eq!(config.title.stem_segments, StemSegments::SecondAndThird);
    assert_eq!(config.title.segment_delimiter, '-');
    assert_eq!(config.column_names(), vec!["cellLine", "label"]);
}

#[test]
fn test_domain_filter_follows_config() {
    let config = AnalysisConfig {
        min_area: 1.0,
        max_area: 5.0,
        min_circ: 0.2,
        max_circ: 0.9,
        ..Default::default()
    };
    let filter = config.domain_filter();
    assert_eq!(filter.min_area, 1.0);
    assert_eq!(filter.max_circ, 0.9);
}

#[test]
fn test_negative_bound_rejected() {
    let config = AnalysisConfig {
        min_area: -1.0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_stage_display() {
    assert_eq!(PipelineStage::Importing.to_string(), "Importing stacks");
    assert_eq!(PipelineStage::Analyzing.to_string(), "Analyzing stacks");
}
