use crate::error::Error;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// gin swag generator - Generate swag directives for gin handlers from Go source code
#[derive(Parser, Debug)]
#[command(name = "gin-swag")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Go project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (text, json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Insert the directives into the Go sources
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Go comment blocks
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        return Err(Error::InvalidArgument(format!(
            "Project path does not exist: {}",
            args.project_path.display()
        ))
        .into());
    }

    if !args.project_path.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "Project path is not a directory: {}",
            args.project_path.display()
        ))
        .into());
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if let Some(ref config) = args.config_path {
        info!("Config file: {}", config.display());
    }
    if args.write {
        info!("Write-back enabled");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::analyzer::Analyzer;
    use crate::config::AnalyzerConfig;
    use crate::detector::FrameworkDetector;
    use crate::loader;
    use crate::rewriter::rewrite_sources;
    use crate::serializer::{render_text, serialize_json, serialize_yaml, write_to_file};

    info!("Starting directive generation...");

    // Step 1: Configuration
    let config = match &args.config_path {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    debug!("Configuration: {:?}", config);

    // Step 2: Scan, parse and type check
    let loaded = loader::load(&args.project_path, &config)?;
    info!("Loaded {} Go files", loaded.program.files.len());

    // Step 3: Detect framework
    let detection = FrameworkDetector::detect(&loaded.program, &config.framework_import);
    if detection.is_detected() {
        info!(
            "{} files import {}",
            detection.files.len(),
            &config.framework_import
        );
    } else {
        warn!(
            "No file imports {}; continuing with the configured types",
            &config.framework_import
        );
    }

    // Step 4: Extract and join
    info!("Analyzing handlers and routes...");
    let report = Analyzer::new(&config).analyze(&loaded.program, &loaded.types);

    if report.handler_count() == 0 {
        warn!("No handlers found in the project");
    }

    // Step 5: Serialize to requested format
    info!("Rendering {:?} output...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => serialize_json(&report)?,
        OutputFormat::Yaml => serialize_yaml(&report)?,
    };

    // Step 6: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        print!("{}", content);
    }

    // Step 7: Optional write-back
    let rewritten = if args.write {
        info!("Writing directives into sources...");
        Some(rewrite_sources(&report, &config)?)
    } else {
        None
    };

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files analyzed: {}", loaded.program.files.len());
    info!("  - Handlers found: {}", report.handler_count());
    info!(
        "  - Handlers routed: {}",
        report
            .handlers()
            .filter(|h| h.detail.route.is_some())
            .count()
    );
    if let Some(summary) = rewritten {
        info!(
            "  - Handlers annotated: {} in {} files",
            summary.handlers, summary.files
        );
    }

    Ok(())
}
