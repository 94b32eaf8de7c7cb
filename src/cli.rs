use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Blueprint Swagger - Generate a Swagger 2.0 document from a host application snapshot
#[derive(Parser, Debug)]
#[command(name = "blueprint-swagger")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the host snapshot (JSON, or YAML with a .yaml/.yml extension)
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot_path: PathBuf,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (overrides swagger.output; stdout when neither is set)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.snapshot_path.exists() {
        anyhow::bail!(
            "Snapshot path does not exist: {}",
            args.snapshot_path.display()
        );
    }

    if !args.snapshot_path.is_file() {
        anyhow::bail!(
            "Snapshot path is not a file: {}",
            args.snapshot_path.display()
        );
    }

    info!("Snapshot: {}", args.snapshot_path.display());
    info!("Output format: {:?}", args.output_format);

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::host::HostSnapshot;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
    use crate::synthesizer::synthesize_with_summary;

    // Step 1: Load the host snapshot
    info!("Loading host snapshot...");
    let snapshot = HostSnapshot::load(&args.snapshot_path)?;

    if !snapshot.swagger.enabled {
        info!("Swagger generation deactivated");
        return Ok(());
    }
    snapshot.swagger.validate()?;

    // Step 2: Refuse to run before the host finished loading
    snapshot.ensure_ready()?;
    info!(
        "Host ready: {} routes, {} controllers, {} models",
        snapshot.routes.len(),
        snapshot.controllers.len(),
        snapshot.models.len()
    );

    // Step 3: Build the document
    info!("Building Swagger document...");
    let (document, summary) = synthesize_with_summary(&snapshot);

    if summary.paths == 0 {
        log::warn!("No documented paths were generated");
    }

    // Step 4: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    // Step 5: Output to file or stdout
    match args.output_path.as_ref().or(snapshot.swagger.output.as_ref()) {
        Some(output_path) => {
            info!("Writing output to: {}", output_path.display());
            write_to_file(&content, output_path)?;
            info!("Successfully wrote Swagger document to {}", output_path.display());
        }
        None => println!("{}", content),
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes enumerated: {}", summary.routes);
    info!("  - Operations documented: {}", summary.operations);
    info!("  - Paths: {}", summary.paths);
    info!("  - Definitions: {}", summary.definitions);

    Ok(())
}
