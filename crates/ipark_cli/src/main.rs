//! iPark CLI
//!
//! Runs bottom sheet scenarios headlessly and prints the sheet events they
//! produce, one JSON object per line, followed by a JSON report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod runner;
mod scenario;

use config::IparkConfig;
use runner::run_scenario;
use scenario::Scenario;

#[derive(Debug, Parser)]
#[command(name = "ipark", about = "Headless tools for the iPark location sheet", version)]
struct Cli {
    /// Configuration file (defaults to ./ipark.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured viewport height
    #[arg(long, global = true)]
    viewport_height: Option<f32>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a JSON scenario against the sheet controller
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Print only the final report
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the resolved sheet configuration as TOML
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;
    let mut config = IparkConfig::resolve(cli.config.as_deref(), &cwd)?;
    if let Some(height) = cli.viewport_height {
        config = config.with_viewport_height(height)?;
    }

    match cli.command {
        Commands::Run { scenario, quiet } => {
            let loaded = Scenario::from_path(&scenario)?;
            tracing::info!(
                scenario = %scenario.display(),
                steps = loaded.steps.len(),
                viewport_height = config.sheet.viewport_height,
                "running scenario"
            );

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let outcome = if quiet {
                run_scenario(&loaded, config.sheet, &mut std::io::sink())?
            } else {
                run_scenario(&loaded, config.sheet, &mut out)?
            };
            outcome.report().write_to_writer(&mut out)?;
            out.flush()?;

            if outcome.is_failed() {
                tracing::error!(
                    step = ?outcome.report().failed_step_index,
                    message = outcome.report().message.as_deref().unwrap_or_default(),
                    "scenario failed"
                );
                return Ok(ExitCode::FAILURE);
            }
            tracing::info!("scenario passed");
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
