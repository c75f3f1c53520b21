//! Summary aggregation over a stream of comparison results

use crate::compare::ComparisonResult;
use serde::Serialize;

/// Run totals and label lists, folded by a single owner from the stream of
/// comparison results; nothing else mutates it
#[derive(Debug, Clone, Default, Serialize)]
pub struct SummaryReport {
    pub matched_count: usize,
    pub mismatched_count: usize,
    pub missing_count: usize,
    pub errored_count: usize,
    pub skipped_empty_count: usize,
    pub matched: Vec<String>,
    pub mismatched: Vec<String>,
    pub missing: Vec<String>,
    pub errored: Vec<String>,
}

impl SummaryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result into the totals
    pub fn absorb(&mut self, result: &ComparisonResult) {
        match result {
            ComparisonResult::Matched { pair } => {
                self.matched_count += 1;
                self.matched.push(pair.clone());
            }
            ComparisonResult::Mismatched { pair, .. } => {
                self.mismatched_count += 1;
                self.mismatched.push(pair.clone());
            }
            ComparisonResult::Missing { table } => {
                self.missing_count += 1;
                self.missing.push(table.clone());
            }
            ComparisonResult::Errored { pair, .. } => {
                self.errored_count += 1;
                self.errored.push(pair.clone());
            }
        }
    }

    /// A pair skipped because one side was empty receives no verdict but is
    /// still visible in the summary
    pub fn record_skipped_empty(&mut self) {
        self.skipped_empty_count += 1;
    }
}
