//! openapi-from-routes - Command-line tool for generating OpenAPI documentation.
//!
//! Reads a route manifest describing an application's routes, handler
//! metadata and models, and writes the corresponding OpenAPI 3 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Print the document as JSON:
//! ```bash
//! openapi-from-routes routes.yaml
//! ```
//!
//! Write YAML with camelCase schemas:
//! ```bash
//! openapi-from-routes routes.yaml -f yaml --convert-casing -o openapi.yaml
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_routes::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-from-routes starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
