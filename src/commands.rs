//! Command implementations for the tabrecon CLI

use crate::catalog::{parse_key_list, CatalogReader, TablePairRequest};
use crate::cli::{Commands, OutputFormat};
use crate::compare::ComparisonEngine;
use crate::error::{Result, TabreconError};
use crate::loader::{StorageKind, TableLoader, TableReference};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::report::SummaryReport;
use std::path::Path;

/// Execute a command
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            catalog,
            source_prefix,
            target_prefix,
            sample_limit,
            format,
        } => run_command(
            &catalog,
            &source_prefix,
            &target_prefix,
            sample_limit,
            &format,
        ),
        Commands::Pair {
            source_table,
            target_table,
            key,
            source_prefix,
            target_prefix,
            sample_limit,
            format,
        } => pair_command(
            &source_table,
            &target_table,
            &key,
            &source_prefix,
            &target_prefix,
            sample_limit,
            &format,
        ),
    }
}

/// Reconcile every pair in the catalog, in catalog order
fn run_command(
    catalog: &Path,
    source_prefix: &str,
    target_prefix: &str,
    sample_limit: usize,
    format: &str,
) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(TabreconError::invalid_input)?;

    let requests = CatalogReader::new()?.read(catalog, sample_limit)?;
    log::info!(
        "Loaded catalog '{}' with {} table pairs",
        catalog.display(),
        requests.len()
    );

    let loader = TableLoader::new()?;
    let engine = ComparisonEngine::new(&loader);
    let mut summary = SummaryReport::new();

    let mut progress = match format {
        OutputFormat::Pretty => ProgressReporter::new_for_run(requests.len() as u64),
        OutputFormat::Json => ProgressReporter::new_minimal(),
    };

    for request in &requests {
        progress.start_pair(&request.pair_label());
        reconcile_pair(
            &loader,
            &engine,
            request,
            source_prefix,
            target_prefix,
            matches!(format, OutputFormat::Pretty),
            &progress,
            &mut summary,
        );
        progress.pair_done();
    }
    progress.finish();

    print_summary(&summary, &format)
}

/// Reconcile a single ad-hoc pair
fn pair_command(
    source_table: &str,
    target_table: &str,
    key: &str,
    source_prefix: &str,
    target_prefix: &str,
    sample_limit: usize,
    format: &str,
) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(TabreconError::invalid_input)?;

    let request = TablePairRequest {
        source_table: source_table.to_string(),
        target_table: target_table.to_string(),
        key_columns: parse_key_list(key),
        sample_limit,
    };

    let loader = TableLoader::new()?;
    let engine = ComparisonEngine::new(&loader);
    let mut summary = SummaryReport::new();
    let progress = ProgressReporter::new_minimal();

    reconcile_pair(
        &loader,
        &engine,
        &request,
        source_prefix,
        target_prefix,
        matches!(format, OutputFormat::Pretty),
        &progress,
        &mut summary,
    );

    print_summary(&summary, &format)
}

/// Load both sides of one pair, compare them, and fold the results into the
/// summary. A pair's failure never aborts the run.
#[allow(clippy::too_many_arguments)]
fn reconcile_pair(
    loader: &TableLoader,
    engine: &ComparisonEngine<'_, TableLoader>,
    request: &TablePairRequest,
    source_prefix: &str,
    target_prefix: &str,
    pretty: bool,
    progress: &ProgressReporter,
    summary: &mut SummaryReport,
) {
    log::info!(
        "Comparing: {} (json) vs {} (delta)",
        request.source_table,
        request.target_table
    );
    if pretty {
        progress.suspend(|| PrettyPrinter::print_pair_header(request));
    }

    let source = loader.load(
        &TableReference::under_prefix(source_prefix, &request.source_table),
        StorageKind::ObjectStoreJson,
    );
    let target = loader.load(
        &TableReference::under_prefix(target_prefix, &request.target_table),
        StorageKind::Delta,
    );

    let results = engine.compare(request, &source, &target);
    if results.is_empty() {
        summary.record_skipped_empty();
        if pretty {
            progress.suspend(|| PrettyPrinter::print_skipped_empty(request));
        }
        return;
    }

    for result in &results {
        if pretty {
            progress.suspend(|| PrettyPrinter::print_result(result));
        }
        summary.absorb(result);
    }
}

fn print_summary(summary: &SummaryReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Pretty => PrettyPrinter::print_summary(summary),
        OutputFormat::Json => println!("{}", JsonFormatter::format_summary(summary)?),
    }
    Ok(())
}
