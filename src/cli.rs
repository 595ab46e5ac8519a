use crate::manifest::Manifest;
use crate::openapi_builder::build_openapi_schema;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Generate an OpenAPI document from a route manifest
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the route manifest (YAML, or JSON with a .json extension)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// camelCase schema keys regardless of the manifest configuration
    #[arg(long = "convert-casing")]
    pub convert_casing: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.is_file() {
        anyhow::bail!(
            "Manifest file does not exist: {}",
            args.manifest_path.display()
        );
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Loading route manifest...");
    let manifest = Manifest::load(&args.manifest_path)
        .with_context(|| format!("Failed to load manifest: {}", args.manifest_path.display()))?;

    let table = manifest.route_table().context("Invalid route manifest")?;
    info!("Loaded {} routes for {}", table.routes().len(), table.name());

    let mut config = manifest.config.clone();
    if args.convert_casing {
        config.convert_casing = true;
    }

    info!("Building OpenAPI document...");
    let document =
        build_openapi_schema(&table, &config).context("Failed to build OpenAPI document")?;
    info!(
        "Documented {} paths and {} component schemas",
        document.paths.len(),
        document.components.schemas.len()
    );

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
