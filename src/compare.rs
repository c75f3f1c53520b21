//! The comparison engine: column alignment, deterministic ordering,
//! bounded sampling, and cell-level diffing of a table pair

use crate::catalog::TablePairRequest;
use crate::loader::{CellValue, ColumnType, LoadOutcome, Row, SampleSource, SampleSpec, SortKey, TableData};
use indexmap::IndexMap;
use serde::Serialize;

/// One mismatching cell between the two sides of a pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    pub column: String,
    pub source_value: String,
    pub target_value: String,
    pub source_table: String,
    pub target_table: String,
}

/// Why a pair was classified as mismatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MismatchReason {
    /// Row counts differ; no value comparison was attempted
    RowCount { source_rows: u64, target_rows: u64 },
    /// The column intersection of the two sides is empty
    NoSharedColumns,
    /// Sampled rows differ on at least one cell
    CellValues,
}

/// Terminal classification for one side or the whole pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ComparisonResult {
    Matched {
        pair: String,
    },
    Mismatched {
        pair: String,
        reason: MismatchReason,
        diffs: Vec<DiffRecord>,
    },
    Missing {
        table: String,
    },
    Errored {
        pair: String,
        message: String,
    },
}

impl ComparisonResult {
    /// The label the summary aggregates under
    pub fn label(&self) -> &str {
        match self {
            Self::Matched { pair } => pair,
            Self::Mismatched { pair, .. } => pair,
            Self::Missing { table } => table,
            Self::Errored { pair, .. } => pair,
        }
    }
}

/// Compares two load outcomes into zero, one, or two results
pub struct ComparisonEngine<'a, S: SampleSource> {
    rows: &'a S,
}

impl<'a, S: SampleSource> ComparisonEngine<'a, S> {
    pub fn new(rows: &'a S) -> Self {
        Self { rows }
    }

    /// Compare a pair of load outcomes.
    ///
    /// Emits `Missing` per absent side; a zero-row side on either end yields
    /// no verdict at all (an empty table is ambiguous, not a result); a row
    /// count difference short-circuits before any value comparison; otherwise
    /// both sides are projected onto their shared columns, ordered by the
    /// resolved key columns, sampled up to the request's limit, and diffed
    /// cell by cell.
    pub fn compare(
        &self,
        request: &TablePairRequest,
        source: &LoadOutcome,
        target: &LoadOutcome,
    ) -> Vec<ComparisonResult> {
        let pair = request.pair_label();

        let (src, tgt) = match (source, target) {
            (LoadOutcome::Present(src), LoadOutcome::Present(tgt)) => (src, tgt),
            _ => {
                let mut missing = Vec::new();
                if let LoadOutcome::Absent { table, reason } = source {
                    log::info!("Source table '{}' missing: {}", table, reason);
                    missing.push(ComparisonResult::Missing {
                        table: table.clone(),
                    });
                }
                if let LoadOutcome::Absent { table, reason } = target {
                    log::info!("Target table '{}' missing: {}", table, reason);
                    missing.push(ComparisonResult::Missing {
                        table: table.clone(),
                    });
                }
                return missing;
            }
        };

        // An empty table gives no verdict; the pair is skipped entirely
        if src.row_count == 0 || tgt.row_count == 0 {
            log::info!(
                "Skipping '{}': empty table on at least one side (source={}, target={})",
                pair,
                src.row_count,
                tgt.row_count
            );
            return Vec::new();
        }

        if src.row_count != tgt.row_count {
            log::info!(
                "Row count mismatch for '{}': {} vs {}",
                pair,
                src.row_count,
                tgt.row_count
            );
            return vec![ComparisonResult::Mismatched {
                pair,
                reason: MismatchReason::RowCount {
                    source_rows: src.row_count,
                    target_rows: tgt.row_count,
                },
                diffs: Vec::new(),
            }];
        }

        let aligned = aligned_columns(&src.columns, &tgt.columns);
        if aligned.is_empty() {
            log::warn!("No shared columns between sides of '{}'", pair);
            return vec![ComparisonResult::Mismatched {
                pair,
                reason: MismatchReason::NoSharedColumns,
                diffs: Vec::new(),
            }];
        }

        let mut keys = resolve_key_columns(&request.key_columns, &aligned);
        if keys.is_empty() {
            // Degraded mode: pairing becomes positional, so fall back to the
            // aligned column order as an implicit sort key to keep the
            // output deterministic
            log::warn!(
                "No usable key columns for '{}'; ordering by all shared columns",
                pair
            );
            keys = aligned.clone();
        }

        let source_spec = SampleSpec {
            columns: aligned.clone(),
            sort_keys: ordering_keys(&keys, &src.schema, &tgt.schema),
            limit: request.sample_limit,
        };
        let target_spec = SampleSpec {
            columns: aligned.clone(),
            sort_keys: keys
                .iter()
                .map(|k| SortKey {
                    column: k.clone(),
                    cast_to: None,
                })
                .collect(),
            limit: request.sample_limit,
        };

        let source_rows = match self.rows.fetch_sample(&src.handle, &source_spec) {
            Ok(rows) => rows,
            Err(e) => return vec![sample_error(pair, src, &e)],
        };
        let target_rows = match self.rows.fetch_sample(&tgt.handle, &target_spec) {
            Ok(rows) => rows,
            Err(e) => return vec![sample_error(pair, tgt, &e)],
        };

        let diffs = diff_rows(&aligned, &source_rows, &target_rows, &src.table, &tgt.table);
        if diffs.is_empty() {
            vec![ComparisonResult::Matched { pair }]
        } else {
            vec![ComparisonResult::Mismatched {
                pair,
                reason: MismatchReason::CellValues,
                diffs,
            }]
        }
    }
}

fn sample_error(pair: String, side: &TableData, e: &crate::error::TabreconError) -> ComparisonResult {
    let message = format!("sample read failed for '{}': {}", side.table, e);
    log::warn!("Comparison of '{}' aborted: {}", pair, message);
    ComparisonResult::Errored { pair, message }
}

/// Ordered intersection of the two column lists, preserving source order
pub fn aligned_columns(source: &[String], target: &[String]) -> Vec<String> {
    source
        .iter()
        .filter(|c| target.contains(c))
        .cloned()
        .collect()
}

/// Filter requested key columns to those present in the aligned set,
/// preserving caller order and trimming whitespace
pub fn resolve_key_columns(requested: &[String], aligned: &[String]) -> Vec<String> {
    requested
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| aligned.iter().any(|c| c == k))
        .collect()
}

/// Sort keys for the source side: each key column is cast to the target
/// schema's declared type when the sides disagree, so both sides order the
/// same logical key identically. Ordering only; value comparison is
/// untouched.
fn ordering_keys(
    keys: &[String],
    source_schema: &IndexMap<String, ColumnType>,
    target_schema: &IndexMap<String, ColumnType>,
) -> Vec<SortKey> {
    keys.iter()
        .map(|k| {
            let cast_to = match (source_schema.get(k), target_schema.get(k)) {
                (Some(src_ty), Some(tgt_ty)) if src_ty != tgt_ty => Some(*tgt_ty),
                _ => None,
            };
            SortKey {
                column: k.clone(),
                cast_to,
            }
        })
        .collect()
}

/// Canonical string form used for value equality: the rendered value with
/// leading and trailing whitespace trimmed. This is the single place value
/// coercion happens; both sides go through it before comparison.
pub fn canonical_form(value: &CellValue) -> String {
    value.render().trim().to_string()
}

/// Whether a value is a null-equivalent representation: an actual null, a
/// floating-point NaN, or the literal "NaN" marker
pub fn is_null_equivalent(value: &CellValue) -> bool {
    match value {
        CellValue::Null => true,
        CellValue::Float(f) => f.is_nan(),
        CellValue::Text(s) => s.trim() == "NaN",
        _ => false,
    }
}

/// Cell equality: null paired with a null-equivalent counts as equal,
/// otherwise trimmed string representations are compared
pub fn cells_equal(a: &CellValue, b: &CellValue) -> bool {
    if (a.is_null() && is_null_equivalent(b)) || (b.is_null() && is_null_equivalent(a)) {
        return true;
    }
    canonical_form(a) == canonical_form(b)
}

/// Pairwise diff of two sampled row sequences; position encodes key order
pub fn diff_rows(
    columns: &[String],
    source_rows: &[Row],
    target_rows: &[Row],
    source_table: &str,
    target_table: &str,
) -> Vec<DiffRecord> {
    let mut diffs = Vec::new();
    for (source_row, target_row) in source_rows.iter().zip(target_rows.iter()) {
        for (idx, (src_val, tgt_val)) in source_row.iter().zip(target_row.iter()).enumerate() {
            if cells_equal(src_val, tgt_val) {
                continue;
            }
            diffs.push(DiffRecord {
                column: columns[idx].clone(),
                source_value: canonical_form(src_val),
                target_value: canonical_form(tgt_val),
                source_table: source_table.to_string(),
                target_table: target_table.to_string(),
            });
        }
    }
    diffs
}
