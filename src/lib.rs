//! # tabrecon
//!
//! A catalog-driven reconciliation tool that validates raw JSON landing data
//! against derived Delta tables after an ingestion step. For every table pair
//! in a catalog it checks row counts, compares a bounded ordered sample of
//! rows value-for-value on shared columns, and reports tables missing from
//! either side.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod compare;
pub mod duckdb_config;
pub mod error;
pub mod loader;
pub mod output;
pub mod progress;
pub mod report;

pub use compare::{ComparisonEngine, ComparisonResult};
pub use error::{Result, TabreconError};
pub use loader::{LoadOutcome, TableLoader};
pub use report::SummaryReport;

/// Default number of ordered rows sampled per side for value comparison
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;
