//! gin swag generator - Command-line tool for generating swag directives.
//!
//! Analyzes a gin project, pairs every handler with the route it is registered under and
//! prints the `@Summary`/`@Param`/`@Success`/`@Router` comment lines swag expects.
//!
//! # Usage
//!
//! ```bash
//! gin-swag [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Print the directives of every handler:
//! ```bash
//! gin-swag ./my-gin-project
//! ```
//!
//! Write a JSON report:
//! ```bash
//! gin-swag ./my-gin-project -f json -o handlers.json
//! ```
//!
//! Insert the directives above the handlers, with verbose logging:
//! ```bash
//! gin-swag ./my-gin-project --write -v
//! ```

use anyhow::Result;
use clap::Parser;
use gin_swag_from_source::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once for the verbose flag, validate after the logger is up
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("gin swag generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Directive generation completed successfully");

    Ok(())
}
