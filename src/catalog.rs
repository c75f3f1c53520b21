//! Catalog reading: each catalog row becomes one table pair request

use crate::error::{Result, TabreconError};
use crate::loader::quote_literal;
use duckdb::Connection;
use std::path::Path;

/// Catalog columns every row must carry
const REQUIRED_COLUMNS: [&str; 3] = ["source_table_name", "raw_table_name", "key"];

/// One unit of comparison from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePairRequest {
    pub source_table: String,
    pub target_table: String,
    pub key_columns: Vec<String>,
    pub sample_limit: usize,
}

impl TablePairRequest {
    pub fn pair_label(&self) -> String {
        format!("{} <-> {}", self.source_table, self.target_table)
    }
}

/// Split a comma-separated key list, trimming whitespace and dropping
/// empty entries
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| k.to_string())
        .collect()
}

/// Reads the catalog CSV through DuckDB
pub struct CatalogReader {
    connection: Connection,
}

impl CatalogReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            connection: Connection::open_in_memory()?,
        })
    }

    /// Read every catalog row into a pair request, in catalog order
    pub fn read(&self, path: &Path, sample_limit: usize) -> Result<Vec<TablePairRequest>> {
        if !path.exists() {
            return Err(TabreconError::invalid_input(format!(
                "Catalog not found: {}",
                path.display()
            )));
        }

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW catalog_view AS \
             SELECT * FROM read_csv_auto('{}', header=true)",
            quote_literal(&path.to_string_lossy())
        );
        self.connection.execute(&create_view_sql, []).map_err(|e| {
            TabreconError::catalog(format!(
                "Failed to read catalog '{}': {}",
                path.display(),
                e
            ))
        })?;

        self.validate_columns(path)?;

        let mut stmt = self.connection.prepare(
            "SELECT CAST(source_table_name AS VARCHAR), \
                    CAST(raw_table_name AS VARCHAR), \
                    CAST(key AS VARCHAR) \
             FROM catalog_view",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let source: String = row.get(0)?;
                let target: String = row.get(1)?;
                let key: Option<String> = row.get(2)?;
                Ok((source, target, key.unwrap_or_default()))
            })
            .map_err(|e| TabreconError::catalog(format!("Failed to query catalog rows: {}", e)))?;

        let mut requests = Vec::new();
        for row in rows {
            let (source_table, target_table, key) = row
                .map_err(|e| TabreconError::catalog(format!("Failed to read catalog row: {}", e)))?;
            requests.push(TablePairRequest {
                source_table,
                target_table,
                key_columns: parse_key_list(&key),
                sample_limit,
            });
        }

        Ok(requests)
    }

    fn validate_columns(&self, path: &Path) -> Result<()> {
        let mut stmt = self.connection.prepare("DESCRIBE catalog_view")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| TabreconError::catalog(format!("Failed to describe catalog: {}", e)))?;

        let mut present = Vec::new();
        for row in rows {
            present.push(row.map_err(|e| {
                TabreconError::catalog(format!("Failed to read catalog schema: {}", e))
            })?);
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !present.iter().any(|p| p == *c))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(TabreconError::catalog(format!(
                "Catalog '{}' is missing required columns: {}",
                path.display(),
                missing.join(", ")
            )));
        }

        Ok(())
    }
}
