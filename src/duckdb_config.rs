//! DuckDB configuration: library discovery and per-connection tuning

use crate::error::{Result, TabreconError};
use duckdb::Connection;
use std::env;
use std::path::{Path, PathBuf};

/// DuckDB library configuration
pub struct DuckDbConfig {
    pub library_path: Option<PathBuf>,
    pub prefer_bundled: bool,
}

impl DuckDbConfig {
    /// Create a configuration with automatic library discovery
    pub fn new() -> Self {
        let library_path = Self::discover_library_path();
        let prefer_bundled = env::var("DUCKDB_DISABLE_BUNDLED").is_err();

        Self {
            library_path,
            prefer_bundled,
        }
    }

    fn discover_library_path() -> Option<PathBuf> {
        if let Ok(path) = env::var("DUCKDB_LIB_PATH") {
            let path_buf = PathBuf::from(path);
            if path_buf.exists() {
                return Some(path_buf);
            }
        }

        Self::standard_paths()
            .into_iter()
            .find(|p| Self::has_duckdb_library(p))
    }

    fn standard_paths() -> Vec<PathBuf> {
        if cfg!(target_os = "macos") {
            vec![
                PathBuf::from("/opt/homebrew/lib"),
                PathBuf::from("/usr/local/lib"),
                PathBuf::from("/opt/local/lib"),
            ]
        } else if cfg!(target_os = "windows") {
            vec![
                PathBuf::from("C:\\Program Files\\DuckDB\\lib"),
                PathBuf::from("C:\\duckdb\\lib"),
            ]
        } else {
            vec![
                PathBuf::from("/usr/lib"),
                PathBuf::from("/usr/local/lib"),
                PathBuf::from("/usr/lib/x86_64-linux-gnu"),
                PathBuf::from("/usr/lib64"),
            ]
        }
    }

    fn has_duckdb_library(path: &Path) -> bool {
        if !path.exists() {
            return false;
        }

        let library_names: &[&str] = if cfg!(target_os = "windows") {
            &["duckdb.dll", "libduckdb.dll"]
        } else if cfg!(target_os = "macos") {
            &["libduckdb.dylib", "libduckdb.so"]
        } else {
            &["libduckdb.so", "libduckdb.so.1"]
        };

        library_names.iter().any(|name| path.join(name).exists())
    }

    /// Check whether a usable DuckDB library is available
    pub fn validate(&self) -> Result<()> {
        if self.use_bundled() {
            return Ok(());
        }

        if let Some(ref path) = self.library_path {
            if Self::has_duckdb_library(path) {
                return Ok(());
            }
        }

        Err(TabreconError::config(
            "DuckDB library not found. Install DuckDB, set DUCKDB_LIB_PATH, \
             or rebuild with: cargo build --features bundled",
        ))
    }

    pub fn use_bundled(&self) -> bool {
        cfg!(feature = "bundled") && self.prefer_bundled
    }
}

impl Default for DuckDbConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize and validate the DuckDB configuration
pub fn init_duckdb() -> Result<DuckDbConfig> {
    let config = DuckDbConfig::new();
    config.validate()?;

    if config.use_bundled() {
        log::info!("Using bundled DuckDB library");
    } else if let Some(ref path) = config.library_path {
        log::info!("Using DuckDB library from: {}", path.display());
    }

    Ok(config)
}

/// Apply session settings for reconciliation scans. Insertion order is
/// preserved so repeated runs over the same data stay reproducible.
pub fn configure_connection(connection: &Connection) -> Result<()> {
    connection.execute("SET memory_limit='4GB'", [])?;
    connection.execute("SET enable_progress_bar=false", [])?;
    connection.execute("SET preserve_insertion_order=true", [])?;
    Ok(())
}
