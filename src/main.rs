//! Main entry point for tabrecon CLI

use clap::Parser;
use tabrecon::cli::Cli;
use tabrecon::commands::execute_command;
use tabrecon::duckdb_config;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging, verbose if requested
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    // Initialize and validate DuckDB configuration
    if let Err(e) = duckdb_config::init_duckdb() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // Execute the command
    if let Err(e) = execute_command(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
