use std::path::PathBuf;

use crate::error::DomainsError;

/// Batch processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Importing,
    Analyzing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Importing => write!(f, "Importing stacks"),
            Self::Analyzing => write!(f, "Analyzing stacks"),
        }
    }
}

/// Thread-safe progress reporting for a batch.
///
/// Implementors can use this to drive progress bars or logging. All methods
/// have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of stacks in
    /// this stage, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` stacks of the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// What happened to one stack of a batch.
#[derive(Debug)]
pub enum StackOutcome {
    Processed {
        title: String,
        stem: String,
        domains: usize,
        outputs: Vec<PathBuf>,
    },
    /// Single-frame stacks take no part in the analysis.
    Skipped { title: String, frames: usize },
    Failed { title: String, error: DomainsError },
}

impl StackOutcome {
    pub fn title(&self) -> &str {
        match self {
            Self::Processed { title, .. } | Self::Skipped { title, .. } | Self::Failed { title, .. } => {
                title
            }
        }
    }
}

/// Per-stack outcomes of [`run_batch`](super::run_batch), in decode order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub stacks: Vec<StackOutcome>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, StackOutcome::Processed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, StackOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, StackOutcome::Failed { .. }))
    }

    /// Domains found across all processed stacks.
    pub fn total_domains(&self) -> usize {
        self.stacks
            .iter()
            .map(|s| match s {
                StackOutcome::Processed { domains, .. } => *domains,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&StackOutcome) -> bool) -> usize {
        self.stacks.iter().filter(|s| pred(s)).count()
    }
}
