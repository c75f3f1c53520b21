//! Common test utilities and helpers

use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tabrecon::catalog::TablePairRequest;
use tabrecon::compare::canonical_form;
use tabrecon::error::{Result, TabreconError};
use tabrecon::loader::{
    CellValue, ColumnType, LoadOutcome, Row, SampleSource, SampleSpec, StorageKind, TableData,
    TableHandle,
};
use tempfile::TempDir;

/// Test fixture managing temporary table directories and catalogs
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Path prefix under which test tables live, with a trailing slash
    pub fn prefix(&self) -> String {
        format!("{}/", self.temp_dir.path().display())
    }

    /// Create a table directory holding one newline-delimited JSON file
    pub fn create_json_table(&self, name: &str, records: &[&str]) -> Result<PathBuf> {
        let dir = self.temp_dir.path().join(name);
        fs::create_dir_all(&dir)?;
        let mut content = records.join("\n");
        content.push('\n');
        fs::write(dir.join("part-0.json"), content)?;
        Ok(dir)
    }

    /// Create a catalog CSV with raw string content
    pub fn create_catalog(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// One in-memory table served by the mock sample source
pub struct MockTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// In-memory sample source for exercising the comparison engine without
/// live storage. Projects, orders (by canonical string form of the sort
/// keys), and bounds rows the way the real loader does, and records every
/// spec it receives.
#[derive(Default)]
pub struct MockSampleSource {
    tables: HashMap<String, MockTable>,
    fail_views: Vec<String>,
    pub fetched: RefCell<Vec<(String, SampleSpec)>>,
}

impl MockSampleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, view: &str, columns: &[&str], rows: Vec<Row>) -> Self {
        self.tables.insert(
            view.to_string(),
            MockTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
        self
    }

    /// Make sample fetches against `view` fail
    pub fn failing(mut self, view: &str) -> Self {
        self.fail_views.push(view.to_string());
        self
    }
}

impl SampleSource for MockSampleSource {
    fn fetch_sample(&self, handle: &TableHandle, spec: &SampleSpec) -> Result<Vec<Row>> {
        self.fetched
            .borrow_mut()
            .push((handle.view.clone(), spec.clone()));

        if self.fail_views.contains(&handle.view) {
            return Err(TabreconError::data_processing(format!(
                "injected sample failure for '{}'",
                handle.view
            )));
        }

        let table = self.tables.get(&handle.view).ok_or_else(|| {
            TabreconError::data_processing(format!("unknown view '{}'", handle.view))
        })?;

        let projection: Vec<usize> = spec
            .columns
            .iter()
            .map(|c| {
                table
                    .columns
                    .iter()
                    .position(|t| t == c)
                    .unwrap_or_else(|| panic!("column '{}' not in mock table", c))
            })
            .collect();

        let mut rows: Vec<Row> = table
            .rows
            .iter()
            .map(|row| projection.iter().map(|&i| row[i].clone()).collect())
            .collect();

        let key_indices: Vec<usize> = spec
            .sort_keys
            .iter()
            .filter_map(|k| spec.columns.iter().position(|c| c == &k.column))
            .collect();
        rows.sort_by(|a, b| {
            let ka: Vec<String> = key_indices.iter().map(|&i| canonical_form(&a[i])).collect();
            let kb: Vec<String> = key_indices.iter().map(|&i| canonical_form(&b[i])).collect();
            ka.cmp(&kb)
        });

        rows.truncate(spec.limit);
        Ok(rows)
    }
}

/// Build a `Present` load outcome backed by a mock view
pub fn present(
    table: &str,
    view: &str,
    row_count: u64,
    columns: &[(&str, ColumnType)],
) -> LoadOutcome {
    let mut schema = IndexMap::new();
    let mut names = Vec::new();
    for (name, ty) in columns {
        schema.insert(name.to_string(), *ty);
        names.push(name.to_string());
    }
    LoadOutcome::Present(TableData {
        table: table.to_string(),
        row_count,
        columns: names,
        schema,
        handle: TableHandle {
            view: view.to_string(),
            kind: StorageKind::ObjectStoreJson,
        },
    })
}

/// Build an `Absent` load outcome
pub fn absent(table: &str, reason: &str) -> LoadOutcome {
    LoadOutcome::Absent {
        table: table.to_string(),
        reason: reason.to_string(),
    }
}

/// Build a pair request
pub fn request(source: &str, target: &str, keys: &[&str], sample_limit: usize) -> TablePairRequest {
    TablePairRequest {
        source_table: source.to_string(),
        target_table: target.to_string(),
        key_columns: keys.iter().map(|k| k.to_string()).collect(),
        sample_limit,
    }
}

/// Shorthand cell constructors for readable test data
pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn int(i: i64) -> CellValue {
    CellValue::Int(i)
}

pub fn null() -> CellValue {
    CellValue::Null
}
