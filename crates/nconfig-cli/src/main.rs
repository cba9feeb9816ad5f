//! nconfig CLI
//!
//! Resolves the current machine's environment from the nearest
//! nconfig.environments folder and prints environment details, setting
//! values, connection strings, or a validation report.

mod cli;
mod error;

use clap::Parser;
use colored::Colorize;
use nconfig_core::{FileStore, RefreshController};
use nconfig_fs::NormalizedPath;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let controller = build_controller(&cli)?;

    match cli.command {
        None => cmd_environment(&controller, cli.default.as_deref()),
        Some(Commands::Setting { key }) => cmd_setting(&controller, cli.default.as_deref(), &key),
        Some(Commands::Connection { key }) => {
            cmd_connection(&controller, cli.default.as_deref(), &key)
        }
        Some(Commands::Validate) => cmd_validate(&controller),
        Some(Commands::Candidates) => cmd_candidates(&controller),
    }
}

fn build_controller(cli: &Cli) -> Result<RefreshController> {
    let start = match &cli.start_dir {
        Some(dir) => NormalizedPath::new(dir),
        None => NormalizedPath::new(std::env::current_dir()?),
    };
    let active = FileStore::open(NormalizedPath::new(&cli.active))?;
    Ok(RefreshController::new(start, Box::new(active)))
}

fn initialize(controller: &RefreshController, default: Option<&str>) -> Result<()> {
    match default {
        Some(name) => controller.initialize_with_default(name)?,
        None => controller.initialize()?,
    }
    Ok(())
}

fn cmd_environment(controller: &RefreshController, default: Option<&str>) -> Result<()> {
    initialize(controller, default)?;
    println!("{}", controller.environment()?);
    Ok(())
}

fn cmd_setting(controller: &RefreshController, default: Option<&str>, key: &str) -> Result<()> {
    initialize(controller, default)?;
    match controller.setting(key)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(CliError::user(format!("no setting named \"{key}\""))),
    }
}

fn cmd_connection(controller: &RefreshController, default: Option<&str>, key: &str) -> Result<()> {
    initialize(controller, default)?;
    match controller.connection_string(key)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(CliError::user(format!("no connection string named \"{key}\""))),
    }
}

fn cmd_validate(controller: &RefreshController) -> Result<()> {
    let report = controller.validate()?;
    if report.is_empty() {
        println!("All environment files are in sync");
        return Ok(());
    }

    for (environment, messages) in &report {
        eprintln!(
            "{} has the following misconfigurations:",
            environment.red().bold()
        );
        for message in messages {
            eprintln!("  {message}");
        }
    }
    std::process::exit(1);
}

fn cmd_candidates(controller: &RefreshController) -> Result<()> {
    for candidate in controller.candidate_keys() {
        println!("{candidate}");
    }
    Ok(())
}
