use crate::config::{self, GeneratorConfig};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Route manifest generator - Builds one manifest module from convention-based route handler files
#[derive(Parser, Debug)]
#[command(name = "route-manifest")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory containing the route handler files
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Logical prefix that replaces ROOT in route paths (e.g. ".")
    #[arg(value_name = "PREFIX")]
    pub prefix: String,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(value_name = "OUTPUT")]
    pub output_path: Option<PathBuf>,

    /// Extension of route handler files, without the dot
    #[arg(long = "extension", default_value = config::DEFAULT_EXTENSION)]
    pub extension: String,

    /// Segment removed once from the front of every manifest key
    #[arg(long = "api-prefix", default_value = config::DEFAULT_API_PREFIX)]
    pub api_prefix: String,

    /// Name of the exported route-construction function
    #[arg(long = "route-function", default_value = config::DEFAULT_ROUTE_FUNCTION)]
    pub route_function: String,

    /// Deadline for the whole run, in seconds
    #[arg(long = "timeout-secs", default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Maximum number of concurrent read/parse workers per stage (default: CPU count)
    #[arg(short = 'j', long = "jobs")]
    pub jobs: Option<usize>,

    /// Directory name to skip while scanning (repeatable)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    pub ignore_dirs: Vec<String>,

    /// Keep routes in processing order instead of sorting them by key
    #[arg(long = "preserve-order")]
    pub preserve_order: bool,

    /// Write the manifest even if some route files failed
    #[arg(long = "allow-partial")]
    pub allow_partial: bool,

    /// Write a run report (diagnostics per file) to this path
    #[arg(long = "report", value_name = "FILE")]
    pub report_path: Option<PathBuf>,

    /// Run report format (json or yaml)
    #[arg(long = "report-format", value_enum, default_value = "json")]
    pub report_format: ReportFormat,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Run report format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl CliArgs {
    /// Generator settings described by these arguments.
    pub fn to_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(self.root.clone(), self.prefix.clone());
        config.extension = self.extension.clone();
        config.api_prefix = self.api_prefix.clone();
        config.route_function = self.route_function.clone();
        config.timeout = Duration::from_secs(self.timeout_secs);
        if let Some(jobs) = self.jobs {
            config.concurrency = jobs;
        }
        config.ignore_dirs = self.ignore_dirs.clone();
        config.preserve_order = self.preserve_order;
        config
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    args.to_config().validate()?;

    info!("Root: {}", args.root.display());
    info!("Prefix: {:?}", args.prefix);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub async fn run(args: CliArgs) -> Result<()> {
    use crate::pipeline;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file, RunReport};

    let config = args.to_config();
    info!("Starting route manifest generation...");

    let generation = pipeline::run(&config).await?;

    for skipped in generation.skipped() {
        debug!("Skipped {}", skipped);
    }
    for diagnostic in generation.fatal_diagnostics() {
        error!("{}", diagnostic);
    }

    if let Some(report_path) = &args.report_path {
        let report = RunReport::new(&config.root, &config.prefix, &generation);
        let content = match args.report_format {
            ReportFormat::Json => serialize_json(&report)?,
            ReportFormat::Yaml => serialize_yaml(&report)?,
        };
        write_to_file(&content, report_path)?;
        info!("Wrote run report to {}", report_path.display());
    }

    if !generation.is_complete() {
        let failed = generation.fatal_diagnostics().count();
        if !args.allow_partial {
            anyhow::bail!(
                "{} of {} route files could not be processed; no manifest written",
                failed,
                generation.discovered
            );
        }
        warn!(
            "Writing a partial manifest: {} of {} route files are missing",
            failed, generation.discovered
        );
    }

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&generation.document, output_path)?;
        info!("Successfully wrote route manifest to {}", output_path.display());
    } else {
        print!("{}", generation.document);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", generation.discovered);
    info!("  - Routes written: {}", generation.routes);
    info!("  - Files skipped: {}", generation.skipped().count());
    info!("  - Elapsed: {:?}", generation.elapsed);

    Ok(())
}
