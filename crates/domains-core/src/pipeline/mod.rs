pub mod config;
mod assemble;
mod orchestrator;
mod types;

pub use assemble::{assemble_rows, ResultRow};
pub use config::AnalysisConfig;
pub use orchestrator::{analyze_stack, export_analysis, run_batch, Segmentation, StackAnalysis};
pub use types::{BatchReport, NoOpReporter, PipelineStage, ProgressReporter, StackOutcome};
