use domains_core::pipeline::{PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives an indicatif bar from batch progress events.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:20} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if self.bar.length() == Some(0) {
            self.bar.tick();
        }
    }
}
