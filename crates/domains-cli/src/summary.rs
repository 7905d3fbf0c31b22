use std::path::Path;

use console::Style;
use domains_core::metadata::SegmentIndex;
use domains_core::pipeline::{AnalysisConfig, BatchReport, StackOutcome};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    ok: Style,
    disabled: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ok: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            error: Style::new().red().bold(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_config_summary(config: &AnalysisConfig, inputs: usize, work_dir: &Path) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Domain Analysis"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("Inputs"), s.value.apply_to(inputs));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Work dir"),
        s.path.apply_to(work_dir.display())
    );
    if let Some(ref cal) = config.calibration_override {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Pixel size"),
            s.value
                .apply_to(format!("{} x {} {}", cal.pixel_width, cal.pixel_height, cal.unit))
        );
    }
    println!();

    if !config.process_domains {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Domains"),
            s.disabled.apply_to("disabled, averaging only")
        );
        println!();
        return;
    }

    println!("  {}", s.header.apply_to("Filter"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Area"),
        s.value.apply_to(format!("{} .. {}", config.min_area, config.max_area))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Circularity"),
        s.value.apply_to(format!("{} .. {}", config.min_circ, config.max_circ))
    );
    println!();

    println!("  {}", s.header.apply_to("Output"));
    let correction = match (config.aberration_correction, &config.correction_mask) {
        (false, _) => s.disabled.apply_to("off".to_string()),
        (true, Some(path)) => s.ok.apply_to(path.display().to_string()),
        (true, None) => s.error.apply_to("no mask configured".to_string()),
    };
    println!("    {:<12}{}", s.label.apply_to("Correction"), correction);
    println!(
        "    {:<12}{}",
        s.label.apply_to("ROI image"),
        s.value.apply_to(format!("{:?}", config.roi_reference))
    );
    let segment = match config.title.metadata_segment {
        SegmentIndex::Last => "last".to_string(),
        SegmentIndex::Index(i) => i.to_string(),
    };
    println!(
        "    {:<12}{}",
        s.label.apply_to("Columns"),
        s.value
            .apply_to(format!("{} (segment {})", config.column_names().join(", "), segment))
    );
    println!();
}

pub fn print_batch_report(report: &BatchReport) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Results"));
    for outcome in &report.stacks {
        match outcome {
            StackOutcome::Processed { stem, domains, .. } => println!(
                "    {} {:<24}{}",
                s.ok.apply_to("\u{2713}"),
                stem,
                s.value.apply_to(format!("{domains} domain(s)"))
            ),
            StackOutcome::Skipped { title, frames } => println!(
                "    {} {:<24}{}",
                s.disabled.apply_to("-"),
                title,
                s.disabled.apply_to(format!("skipped ({frames} frame)"))
            ),
            StackOutcome::Failed { title, error } => println!(
                "    {} {:<24}{}",
                s.error.apply_to("\u{2717}"),
                title,
                s.error.apply_to(error)
            ),
        }
    }
    println!();
    println!(
        "  {:<14}{} processed, {} skipped, {} failed, {} domain(s)",
        s.label.apply_to("Total"),
        s.ok.apply_to(report.processed()),
        report.skipped(),
        s.error.apply_to(report.failed()),
        s.value.apply_to(report.total_domains())
    );
    println!();
}
