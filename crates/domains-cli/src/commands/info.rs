use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use domains_core::io::source::{SerSource, StackSource};
use domains_core::metadata::{column_names, derive_stem, parse_title, TitleConvention};
use domains_core::pipeline::AnalysisConfig;

#[derive(Args)]
pub struct InfoArgs {
    /// SER files, or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Analysis config file (TOML) supplying the title convention
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Comma-separated metadata column names
    #[arg(long)]
    pub experiment: Option<String>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config: AnalysisConfig = match args.config {
        Some(ref path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&contents).context("Invalid analysis config")?
        }
        None => AnalysisConfig::default(),
    };
    let experiment = args.experiment.as_deref().unwrap_or(&config.experiment);
    let columns = column_names(experiment);
    let convention: &TitleConvention = &config.title;

    let source = SerSource::expand(&args.inputs, Default::default())?;
    let stacks = source.load_stacks()?;

    for stack in &stacks {
        let (h, w) = stack.dim();
        println!("Title:       {}", stack.title);
        println!("Frames:      {}", stack.frame_count());
        println!("Dimensions:  {}x{}", w, h);
        println!("Bit depth:   {}", stack.bit_depth);

        match derive_stem(&stack.title, convention) {
            Ok(stem) => println!("Stem:        {}", stem),
            Err(e) => println!("Stem:        <{}>", e),
        }
        match parse_title(&stack.title, &columns, convention, stack.source_name.as_deref()) {
            Ok(parsed) => {
                for (name, value) in &parsed.metadata.fields {
                    println!("  {:<11}{}", name, value);
                }
                if let Some(mismatch) = parsed.mismatch {
                    println!("  warning:   {}", mismatch);
                }
            }
            Err(e) => println!("Metadata:    <{}>", e),
        }
        if !stack.is_time_series() {
            println!("             single frame, skipped by `run`");
        }
        println!();
    }

    Ok(())
}
