//! Route manifest generator - Command-line tool for generating a route manifest module.
//!
//! This binary walks a directory of route handler files, extracts each route's method,
//! auth flags and validation schemas, and writes a single manifest module that a server can
//! import instead of discovering routes at runtime.
//!
//! # Usage
//!
//! ```bash
//! route-manifest [OPTIONS] <ROOT> <PREFIX> [OUTPUT]
//! ```
//!
//! # Examples
//!
//! Generate the manifest next to the routes:
//! ```bash
//! route-manifest ./src/routes . ./src/routes.gen.ts
//! ```
//!
//! Write a partial manifest and a YAML report of what failed:
//! ```bash
//! route-manifest ./src/routes . out.ts --allow-partial --report report.yaml --report-format yaml
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use route_manifest::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse once to read the verbose flag, initialise the logger, then validate.
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Route manifest generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args).await?;

    info!("Route manifest generation completed successfully");

    Ok(())
}
