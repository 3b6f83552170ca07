//! Overlap CLI: compile AOI overlap spreadsheets and render overlay queries.
//!
//! # Commands
//!
//! - `compile`: Turn exported spreadsheet rows into feature entries JSON.
//! - `build`: Attach a spatial query summary to every entry.
//! - `render`: Produce the overlay SQL for enriched entries against an AOI.
//!
//! Without a database session, `build` and `render` fall back to the
//! configured default geometry column and SRID.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use overlap_common::config::AppConfig;
use overlap_error::{ErrorCategory, OverlapError};
use owo_colors::OwoColorize;
use std::path::PathBuf;

mod commands;
mod config;
mod exit_codes;
mod output;

use config::CliConfig;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "overlap")]
#[command(about = "Compile AOI overlap configuration and render overlay queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (human, json, yaml)
    #[arg(long, global = true, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Configuration profile
    #[arg(long, global = true, env = "OVERLAP_PROFILE")]
    profile: Option<String>,

    /// Settings file with spatial defaults and the registry table
    #[arg(long, global = true)]
    settings: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile exported sheets (JSON arrays of rows) into feature entries
    Compile {
        /// Sheets in merge order, common sheet first
        #[arg(required = true)]
        sheets: Vec<PathBuf>,
        /// Description rows to drop under each sheet's header
        #[arg(long, default_value_t = 0)]
        skip_rows: usize,
        /// Write the entries JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Attach spatial query summaries to feature entries
    Build {
        /// Entries JSON (single object or array)
        input: PathBuf,
        /// Write the enriched JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render overlay SQL for enriched entries
    Render {
        /// Enriched entries JSON
        input: PathBuf,
        /// Only render this feature (name or normalized feature class)
        #[arg(long)]
        feature: Option<String>,
        #[command(flatten)]
        aoi: commands::AoiArgs,
    },
}

fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run_cli(&cli) {
        let exit_code = map_error_to_exit_code(&e);
        if cli.output.is_machine_readable() {
            output::print_error(cli.output, &format!("{:#}", e), exit_code).ok();
        } else {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
        std::process::exit(exit_code);
    }

    Ok(())
}

fn load_settings(cli: &Cli, profile: &CliConfig) -> anyhow::Result<AppConfig> {
    let path = cli.settings.as_deref().unwrap_or(&profile.settings_file);
    let mut config = AppConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;
    if let Some(filter) = &profile.log_filter {
        config.logging.filter = filter.clone();
    }
    Ok(config)
}

fn map_error_to_exit_code(e: &anyhow::Error) -> i32 {
    if let Some(err) = e.downcast_ref::<OverlapError>() {
        return match err.code.category() {
            ErrorCategory::Input => exit_codes::INPUT_ERROR,
            ErrorCategory::Metadata => exit_codes::METADATA_ERROR,
            ErrorCategory::Config => exit_codes::CONFIG_ERROR,
            ErrorCategory::Query => exit_codes::QUERY_ERROR,
            _ => exit_codes::GENERAL_ERROR,
        };
    }

    // Fallback for errors raised outside the overlap crates
    let s = format!("{:#}", e).to_lowercase();
    if s.contains("usage") || s.contains("no feature matches") {
        return exit_codes::USAGE_ERROR;
    }
    if s.contains("config") || s.contains("yaml") {
        return exit_codes::CONFIG_ERROR;
    }
    exit_codes::GENERAL_ERROR
}

fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let profile = config::load(cli.profile.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let settings = load_settings(cli, &profile)?;
    overlap_common::telemetry::init_logging(&settings.logging)?;

    tracing::debug!(
        srid = settings.defaults.srid,
        geometry_column = %settings.defaults.geometry_column,
        registry = %settings.registry.table,
        "Loaded settings"
    );

    match &cli.command {
        Commands::Compile {
            sheets,
            skip_rows,
            out,
        } => commands::compile(sheets, *skip_rows, out.as_deref(), cli.output),
        Commands::Build { input, out } => {
            commands::build(input, out.as_deref(), &settings, cli.output)
        }
        Commands::Render {
            input,
            feature,
            aoi,
        } => commands::render(input, aoi, feature.as_deref(), &settings, cli.output),
    }
}
