//! Progress reporting over the catalog of table pairs

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a reconciliation run
#[derive(Debug)]
pub struct ProgressReporter {
    pairs_pb: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create a progress reporter for a run over `total_pairs` pairs
    pub fn new_for_run(total_pairs: u64) -> Self {
        Self {
            pairs_pb: Some(create_progress_bar(total_pairs, "Reconciling pairs")),
        }
    }

    /// Create a reporter that emits nothing (machine-readable output)
    pub fn new_minimal() -> Self {
        Self { pairs_pb: None }
    }

    /// Announce the pair about to be compared
    pub fn start_pair(&self, label: &str) {
        if let Some(pb) = &self.pairs_pb {
            pb.set_message(label.to_string());
        }
    }

    /// Record completion of one pair
    pub fn pair_done(&self) {
        if let Some(pb) = &self.pairs_pb {
            pb.inc(1);
        }
    }

    /// Suspend the bar while `f` prints to stdout
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.pairs_pb {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }

    /// Finish and clear the bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.pairs_pb.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.pairs_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
