//! Table loading over DuckDB: JSON object stores and Delta tables

use crate::duckdb_config;
use crate::error::{Result, TabreconError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection;
use indexmap::IndexMap;
use serde::Serialize;
use std::cell::Cell;
use std::fmt;

/// Storage format discriminator for a table reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageKind {
    /// Schema-inferred row-delimited JSON under an object-storage prefix
    ObjectStoreJson,
    /// Delta table (transactional tabular format)
    Delta,
}

impl StorageKind {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "json" | "json-object-store" => Ok(Self::ObjectStoreJson),
            "delta" | "transactional-table-format" => Ok(Self::Delta),
            _ => Err(format!("Invalid storage kind: {}. Use 'json' or 'delta'", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectStoreJson => "json",
            Self::Delta => "delta",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical per-column type tag, inferred at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Decimal,
    Text,
    Date,
    Timestamp,
    Other,
}

impl ColumnType {
    /// Map a DuckDB `DESCRIBE` type string onto a logical tag
    pub fn from_sql_type(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        if upper.starts_with("DECIMAL") || upper.starts_with("NUMERIC") {
            return Self::Decimal;
        }
        if upper.starts_with("TIMESTAMP") || upper.starts_with("DATETIME") {
            return Self::Timestamp;
        }
        match upper.as_str() {
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "TINYINT" | "SMALLINT" | "INTEGER" | "INT" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" => Self::Integer,
            "FLOAT" | "REAL" | "DOUBLE" => Self::Float,
            "VARCHAR" | "TEXT" | "STRING" | "JSON" => Self::Text,
            "DATE" => Self::Date,
            _ => Self::Other,
        }
    }

    /// SQL type name used when a key column is cast for ordering
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Integer => "BIGINT",
            Self::Float => "DOUBLE",
            Self::Decimal => "DOUBLE",
            Self::Text => "VARCHAR",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::Other => "VARCHAR",
        }
    }
}

/// A cell value materialized from either storage side
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Untrimmed string form of the value; nulls render empty
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Decimal(d) => d.clone(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.to_string(),
            Self::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        }
    }
}

/// One materialized row, aligned to the projection that produced it
pub type Row = Vec<CellValue>;

/// Opaque reference to a loadable table location
#[derive(Debug, Clone)]
pub struct TableReference {
    pub name: String,
    pub location: String,
}

impl TableReference {
    /// Address a table as `{prefix}{name}/`
    pub fn under_prefix(prefix: &str, name: &str) -> Self {
        let mut location = format!("{}{}", prefix, name);
        if !location.ends_with('/') {
            location.push('/');
        }
        Self {
            name: name.to_string(),
            location,
        }
    }
}

/// Handle to a registered DuckDB view backing a loaded table
#[derive(Debug, Clone)]
pub struct TableHandle {
    pub view: String,
    pub kind: StorageKind,
}

/// Successful load: authoritative row count, column order, inferred schema
#[derive(Debug, Clone)]
pub struct TableData {
    pub table: String,
    pub row_count: u64,
    pub columns: Vec<String>,
    pub schema: IndexMap<String, ColumnType>,
    pub handle: TableHandle,
}

/// Outcome of a table load; absence is a routine result, never fatal
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Present(TableData),
    Absent { table: String, reason: String },
}

/// Sort key for deterministic sample ordering; `cast_to` applies for
/// ordering only, never for value comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub cast_to: Option<ColumnType>,
}

/// Projection, ordering, and bound for a sample fetch
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub columns: Vec<String>,
    pub sort_keys: Vec<SortKey>,
    pub limit: usize,
}

/// Source of bounded, ordered, projected row samples
pub trait SampleSource {
    fn fetch_sample(&self, handle: &TableHandle, spec: &SampleSpec) -> Result<Vec<Row>>;
}

/// DuckDB-backed table loader
pub struct TableLoader {
    connection: Connection,
    view_seq: Cell<u64>,
}

impl TableLoader {
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        duckdb_config::configure_connection(&connection)?;
        Ok(Self {
            connection,
            view_seq: Cell::new(0),
        })
    }

    /// Load a table and return its outcome. Any read failure (missing
    /// location, malformed data, permission, format mismatch) becomes
    /// `Absent` with the failure reason.
    pub fn load(&self, reference: &TableReference, kind: StorageKind) -> LoadOutcome {
        match self.try_load(reference, kind) {
            Ok(data) => LoadOutcome::Present(data),
            Err(e) => {
                log::debug!("Load failed for '{}': {}", reference.name, e);
                LoadOutcome::Absent {
                    table: reference.name.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_load(&self, reference: &TableReference, kind: StorageKind) -> Result<TableData> {
        self.prepare_extensions(&reference.location, kind)?;

        let view = self.next_view_name();
        let relation = match kind {
            StorageKind::ObjectStoreJson => format!(
                "read_json_auto('{}*.json', union_by_name=true)",
                quote_literal(&reference.location)
            ),
            StorageKind::Delta => format!("delta_scan('{}')", quote_literal(&reference.location)),
        };

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM {}",
            quote_ident(&view),
            relation
        );
        log::debug!("Registering view: {}", create_view_sql);
        self.connection.execute(&create_view_sql, [])?;

        // Authoritative count: full scan, not an estimate
        let row_count: u64 = self
            .connection
            .prepare(&format!("SELECT COUNT(*) FROM {}", quote_ident(&view)))?
            .query_row([], |row| row.get(0))?;

        let (columns, schema) = self.describe_view(&view)?;

        Ok(TableData {
            table: reference.name.clone(),
            row_count,
            columns,
            schema,
            handle: TableHandle { view, kind },
        })
    }

    /// Load DuckDB extensions required by the location and format
    fn prepare_extensions(&self, location: &str, kind: StorageKind) -> Result<()> {
        if location.starts_with("s3://") || location.starts_with("gs://") {
            self.connection
                .execute_batch("INSTALL httpfs; LOAD httpfs;")?;
        }
        if kind == StorageKind::Delta {
            self.connection.execute_batch("INSTALL delta; LOAD delta;")?;
        }
        Ok(())
    }

    fn next_view_name(&self) -> String {
        let n = self.view_seq.get();
        self.view_seq.set(n + 1);
        format!("recon_view_{}", n)
    }

    /// Column order and inferred types from DESCRIBE
    fn describe_view(&self, view: &str) -> Result<(Vec<String>, IndexMap<String, ColumnType>)> {
        let mut stmt = self
            .connection
            .prepare(&format!("DESCRIBE {}", quote_ident(view)))?;

        let rows = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let raw_type: String = row.get(1)?;
                Ok((name, raw_type))
            })
            .map_err(|e| {
                TabreconError::data_processing(format!("Failed to query column info: {}", e))
            })?;

        let mut columns = Vec::new();
        let mut schema = IndexMap::new();
        for row in rows {
            let (name, raw_type) = row.map_err(|e| {
                TabreconError::data_processing(format!("Failed to read column info row: {}", e))
            })?;
            schema.insert(name.clone(), ColumnType::from_sql_type(&raw_type));
            columns.push(name);
        }

        Ok((columns, schema))
    }
}

impl SampleSource for TableLoader {
    fn fetch_sample(&self, handle: &TableHandle, spec: &SampleSpec) -> Result<Vec<Row>> {
        let projection = spec
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(&handle.view));
        if !spec.sort_keys.is_empty() {
            let order = spec
                .sort_keys
                .iter()
                .map(|key| match key.cast_to {
                    Some(ty) => format!("CAST({} AS {}) ASC", quote_ident(&key.column), ty.sql_type()),
                    None => format!("{} ASC", quote_ident(&key.column)),
                })
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {}", order));
        }
        sql.push_str(&format!(" LIMIT {}", spec.limit));
        log::debug!("Fetching sample: {}", sql);

        let column_count = spec.columns.len();
        let mut stmt = self.connection.prepare(&sql).map_err(|e| {
            TabreconError::data_processing(format!("Failed to prepare sample query: {}", e))
        })?;

        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    cells.push(cell_from_ref(row.get_ref(i)?));
                }
                Ok(cells)
            })
            .map_err(|e| {
                TabreconError::data_processing(format!("Failed to fetch sample rows: {}", e))
            })?;

        let mut sample = Vec::new();
        for row in rows {
            sample.push(row.map_err(|e| {
                TabreconError::data_processing(format!("Failed to read sample row: {}", e))
            })?);
        }

        Ok(sample)
    }
}

/// Convert a DuckDB value reference into a cell value
fn cell_from_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Boolean(b) => CellValue::Bool(b),
        ValueRef::TinyInt(i) => CellValue::Int(i as i64),
        ValueRef::SmallInt(i) => CellValue::Int(i as i64),
        ValueRef::Int(i) => CellValue::Int(i as i64),
        ValueRef::BigInt(i) => CellValue::Int(i),
        ValueRef::HugeInt(i) => CellValue::Text(i.to_string()),
        ValueRef::UTinyInt(i) => CellValue::Int(i as i64),
        ValueRef::USmallInt(i) => CellValue::Int(i as i64),
        ValueRef::UInt(i) => CellValue::Int(i as i64),
        ValueRef::UBigInt(i) => CellValue::Text(i.to_string()),
        ValueRef::Float(f) => CellValue::Float(f as f64),
        ValueRef::Double(f) => CellValue::Float(f),
        ValueRef::Decimal(d) => CellValue::Decimal(d.to_string()),
        ValueRef::Text(s) => CellValue::Text(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => CellValue::Text(format!("<blob:{} bytes>", b.len())),
        ValueRef::Date32(days) => date_from_days(days)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(days.to_string())),
        ValueRef::Time64(unit, v) => time_from_unit(unit, v)
            .map(|t| CellValue::Text(t.format("%H:%M:%S%.f").to_string()))
            .unwrap_or_else(|| CellValue::Text(v.to_string())),
        ValueRef::Timestamp(unit, v) => timestamp_from_unit(unit, v)
            .map(CellValue::Timestamp)
            .unwrap_or_else(|| CellValue::Text(v.to_string())),
        _ => CellValue::Text("<unsupported>".to_string()),
    }
}

fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days as i64))
}

fn to_micros(unit: TimeUnit, v: i64) -> i64 {
    match unit {
        TimeUnit::Second => v.saturating_mul(1_000_000),
        TimeUnit::Millisecond => v.saturating_mul(1_000),
        TimeUnit::Microsecond => v,
        TimeUnit::Nanosecond => v / 1_000,
    }
}

fn time_from_unit(unit: TimeUnit, v: i64) -> Option<NaiveTime> {
    let micros = to_micros(unit, v);
    let secs = (micros / 1_000_000) as u32;
    let nanos = ((micros % 1_000_000) * 1_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

fn timestamp_from_unit(unit: TimeUnit, v: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_micros(to_micros(unit, v)).map(|dt| dt.naive_utc())
}

/// Quote an SQL identifier
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape a string literal for embedding in SQL
pub(crate) fn quote_literal(s: &str) -> String {
    s.replace('\'', "''")
}
