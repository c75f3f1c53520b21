//! Command-line interface for tabrecon

use crate::DEFAULT_SAMPLE_LIMIT;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Reconcile raw JSON landing data against derived Delta tables")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile every table pair listed in a catalog
    Run {
        /// Catalog CSV with source_table_name, raw_table_name, key columns
        catalog: PathBuf,

        /// Path prefix for source JSON tables (e.g. s3://landing/json/)
        #[arg(long)]
        source_prefix: String,

        /// Path prefix for target Delta tables (e.g. s3://warehouse/raw/)
        #[arg(long)]
        target_prefix: String,

        /// Rows sampled per side for value comparison (must be > 0)
        #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT, value_parser = validate_sample_limit)]
        sample_limit: usize,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Reconcile a single ad-hoc table pair
    Pair {
        /// Source table name under the source prefix
        source_table: String,

        /// Target table name under the target prefix
        target_table: String,

        /// Comma-separated key columns for deterministic ordering
        #[arg(long)]
        key: String,

        /// Path prefix for the source JSON table
        #[arg(long)]
        source_prefix: String,

        /// Path prefix for the target Delta table
        #[arg(long)]
        target_prefix: String,

        /// Rows sampled per side for value comparison (must be > 0)
        #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT, value_parser = validate_sample_limit)]
        sample_limit: usize,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate that the sample limit is greater than 0
fn validate_sample_limit(s: &str) -> Result<usize, String> {
    let limit: usize = s
        .parse()
        .map_err(|_| format!("Invalid sample limit: '{}'. Must be a positive integer.", s))?;

    if limit == 0 {
        return Err("Sample limit must be greater than 0".to_string());
    }

    Ok(limit)
}
