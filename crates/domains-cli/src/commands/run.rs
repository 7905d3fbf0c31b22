use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use domains_core::correction::{FileMask, MaskAsset, NoMask};
use domains_core::frame::Calibration;
use domains_core::io::source::SerSource;
use domains_core::pipeline::{run_batch, AnalysisConfig};
use domains_core::roi::RoiReference;
use tracing::debug;

use crate::progress::BarReporter;
use crate::summary::{print_batch_report, print_config_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum RoiReferenceArg {
    /// 8-bit autoscaled average
    Normalized,
    /// Average in the source's native units
    Projected,
}

impl From<RoiReferenceArg> for RoiReference {
    fn from(arg: RoiReferenceArg) -> Self {
        match arg {
            RoiReferenceArg::Normalized => RoiReference::Normalized,
            RoiReferenceArg::Projected => RoiReference::Projected,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// SER files, or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Analysis config file (TOML); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Smallest domain area, in calibrated units
    #[arg(long)]
    pub min_area: Option<f64>,

    /// Largest domain area, in calibrated units
    #[arg(long)]
    pub max_area: Option<f64>,

    /// Lowest accepted circularity
    #[arg(long)]
    pub min_circ: Option<f64>,

    /// Highest accepted circularity
    #[arg(long)]
    pub max_circ: Option<f64>,

    /// Only export the averaged image
    #[arg(long)]
    pub no_domains: bool,

    /// Correction mask image; enables aberration correction
    #[arg(long)]
    pub aberration_mask: Option<PathBuf>,

    /// Comma-separated metadata column names
    #[arg(long)]
    pub experiment: Option<String>,

    /// Pixel width in calibrated units
    #[arg(long)]
    pub pixel_width: Option<f64>,

    /// Pixel height in calibrated units (defaults to the width)
    #[arg(long)]
    pub pixel_height: Option<f64>,

    /// Calibration length unit
    #[arg(long, default_value = "micron")]
    pub unit: String,

    /// Image the ROI statistics are sampled from
    #[arg(long, value_enum)]
    pub roi_reference: Option<RoiReferenceArg>,

    /// Process stacks in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Directory that receives the `processed/` output folder
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,
}

pub fn run(args: &RunArgs, verbose: bool) -> Result<()> {
    let mut config: AnalysisConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid analysis config")?
    } else {
        AnalysisConfig::default()
    };
    apply_overrides(&mut config, args, verbose);
    crate::init_tracing(config.log_filter());
    config.validate()?;
    debug!(?config, "Analysis config");

    let calibration = config.calibration_override.clone().unwrap_or_default();
    let source = SerSource::expand(&args.inputs, calibration)?;

    let asset: Box<dyn MaskAsset> = match config.correction_mask {
        Some(ref path) => Box::new(FileMask(path.clone())),
        None => Box::new(NoMask),
    };

    print_config_summary(&config, source.paths.len(), &args.work_dir);

    let reporter = Arc::new(BarReporter::new()?);
    let report = run_batch(
        &source,
        &config,
        asset.as_ref(),
        &args.work_dir,
        reporter.clone(),
    )?;
    reporter.finish();

    print_batch_report(&report);
    Ok(())
}

fn apply_overrides(config: &mut AnalysisConfig, args: &RunArgs, verbose: bool) {
    if let Some(v) = args.min_area {
        config.min_area = v;
    }
    if let Some(v) = args.max_area {
        config.max_area = v;
    }
    if let Some(v) = args.min_circ {
        config.min_circ = v;
    }
    if let Some(v) = args.max_circ {
        config.max_circ = v;
    }
    if args.no_domains {
        config.process_domains = false;
    }
    if let Some(ref path) = args.aberration_mask {
        config.aberration_correction = true;
        config.correction_mask = Some(path.clone());
    }
    if let Some(ref cols) = args.experiment {
        config.experiment = cols.clone();
    }
    if let Some(width) = args.pixel_width {
        let height = args.pixel_height.unwrap_or(width);
        config.calibration_override = Some(Calibration::new(width, height, args.unit.clone()));
    }
    if let Some(reference) = args.roi_reference {
        config.roi_reference = reference.into();
    }
    if args.parallel {
        config.parallel = true;
    }
    config.verbose |= verbose;
}
