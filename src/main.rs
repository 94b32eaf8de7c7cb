//! Blueprint Swagger - Command-line tool for generating Swagger documentation.
//!
//! Reads a snapshot of a host MVC application (route table, controllers, models and
//! configuration) and writes the Swagger 2.0 document describing its HTTP surface.
//!
//! # Usage
//!
//! ```bash
//! blueprint-swagger [OPTIONS] <SNAPSHOT>
//! ```
//!
//! # Examples
//!
//! Write JSON to the location configured in the snapshot (or stdout):
//! ```bash
//! blueprint-swagger host.json
//! ```
//!
//! Generate YAML into a specific file:
//! ```bash
//! blueprint-swagger host.yaml -f yaml -o swagger/swagger.yaml
//! ```

use anyhow::Result;
use blueprint_swagger::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // The verbose flag decides the log level, so arguments are parsed before logger init
    let parsed = cli::CliArgs::parse();

    let log_level = if parsed.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Blueprint Swagger starting...");

    let args = cli::parse_args_from_parsed(parsed)?;

    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
