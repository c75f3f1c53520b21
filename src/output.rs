//! Output formatting utilities

use crate::catalog::TablePairRequest;
use crate::compare::{ComparisonResult, DiffRecord, MismatchReason};
use crate::error::Result;
use crate::report::SummaryReport;

/// Pretty printer for tabrecon output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Per-pair progress line
    pub fn print_pair_header(request: &TablePairRequest) {
        println!();
        println!(
            "🔍 Comparing: {} (json) vs {} (delta)",
            request.source_table, request.target_table
        );
    }

    /// Print one comparison result
    pub fn print_result(result: &ComparisonResult) {
        match result {
            ComparisonResult::Matched { pair } => {
                println!("✅ Matched: {}", pair);
            }
            ComparisonResult::Mismatched { pair, reason, diffs } => {
                match reason {
                    MismatchReason::RowCount {
                        source_rows,
                        target_rows,
                    } => {
                        println!(
                            "❌ Row count mismatch: {} ({} vs {} rows)",
                            pair, source_rows, target_rows
                        );
                    }
                    MismatchReason::NoSharedColumns => {
                        println!("❌ Mismatched: {} (no shared columns)", pair);
                    }
                    MismatchReason::CellValues => {
                        println!("❌ Value mismatch: {}", pair);
                        Self::print_diff_records(diffs);
                    }
                }
            }
            ComparisonResult::Missing { table } => {
                println!("❓ Missing: {}", table);
            }
            ComparisonResult::Errored { pair, message } => {
                println!("⚠️  Errored: {} ({})", pair, message);
            }
        }
    }

    /// Skip notice for a pair where one side was empty
    pub fn print_skipped_empty(request: &TablePairRequest) {
        println!(
            "⏭️  Skipping: {} or {} is empty",
            request.source_table, request.target_table
        );
    }

    /// Tabular rendering of diff records
    pub fn print_diff_records(diffs: &[DiffRecord]) {
        if diffs.is_empty() {
            return;
        }

        const HEADERS: [&str; 5] = [
            "Column",
            "Source Value",
            "Target Value",
            "Source Table",
            "Target Table",
        ];
        let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
        for diff in diffs {
            let cells = diff_cells(diff);
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let header_line: Vec<String> = HEADERS
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
            .collect();
        println!("   {}", header_line.join("  "));

        for diff in diffs {
            let cells = diff_cells(diff);
            let line: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
                .collect();
            println!("   {}", line.join("  "));
        }
    }

    /// Final summary block
    pub fn print_summary(summary: &SummaryReport) {
        println!();
        println!("**Comparison Summary**");
        println!("├─ Total Matching Tables: {}", summary.matched_count);
        println!("├─ Total Mismatched Tables: {}", summary.mismatched_count);
        println!("├─ Total Missing Tables: {}", summary.missing_count);
        println!("├─ Total Errored Pairs: {}", summary.errored_count);
        println!("└─ Skipped (empty side): {}", summary.skipped_empty_count);
        println!();
        println!("Matching Tables: {}", joined_or_none(&summary.matched));
        println!("Mismatched Tables: {}", joined_or_none(&summary.mismatched));
        println!("Missing Tables: {}", joined_or_none(&summary.missing));
        println!("Errored Pairs: {}", joined_or_none(&summary.errored));
    }
}

fn diff_cells(diff: &DiffRecord) -> [&str; 5] {
    [
        &diff.column,
        &diff.source_value,
        &diff.target_value,
        &diff.source_table,
        &diff.target_table,
    ]
}

/// Comma-join a label list, or the literal token `None` when empty
fn joined_or_none(labels: &[String]) -> String {
    if labels.is_empty() {
        "None".to_string()
    } else {
        labels.join(", ")
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format the run summary as JSON
    pub fn format_summary(summary: &SummaryReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(summary)?)
    }
}
