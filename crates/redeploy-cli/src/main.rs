//! Redeploy - rebuild containers and force-sync the working tree
//!
//! Usage:
//!   redeploy rebuild      # Stop containers, remove, prune, then sync
//!   redeploy sync         # Reset the working tree to the remote branch
//!   redeploy config       # Print the effective configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redeploy_core::commands::{RebuildCommand, RebuildReport, SyncCommand, SyncReport};
use redeploy_core::config::{ConfigSource, ConfigStore, RedeployConfig, to_toml};
use redeploy_core::error::PipelineError;
use redeploy_core::pipeline::{PipelineReport, StepOutcome};
use redeploy_core::runner::SystemRunner;
use redeploy_core::step::{FailurePolicy, Step};

#[derive(Parser)]
#[command(name = "redeploy")]
#[command(about = "Rebuild containers and sync the working tree", long_about = None)]
struct Cli {
    /// Path to redeploy.toml (defaults to ./redeploy.toml, then the user config dir)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stop containers, remove the named container, prune images, then sync
    Rebuild {
        /// Print the steps without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Check out, fetch, hard-reset and clean the working tree
    Sync {
        /// Print the steps without running them
        #[arg(long)]
        dry_run: bool,

        /// Skip the post-sync working tree check
        #[arg(long)]
        no_verify: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable lines
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redeploy=info,redeploy_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let code = match err.downcast_ref::<PipelineError>() {
            Some(pipeline_err) => pipeline_err.exit_code(),
            None => 1,
        };
        eprintln!("Error: {:#}", err);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut store = ConfigStore::with_defaults()?;
    if let Some(path) = cli.config {
        store = store.with_explicit_path(path);
    }
    let (config, source) = store.load()?;

    match cli.command {
        Commands::Rebuild { dry_run } => run_rebuild(&config, dry_run, cli.format),
        Commands::Sync { dry_run, no_verify } => {
            run_sync(&config, dry_run, no_verify, cli.format)
        }
        Commands::Config => print_config(&config, &source, cli.format),
    }
}

fn run_rebuild(config: &RedeployConfig, dry_run: bool, format: OutputFormat) -> Result<()> {
    let cmd = RebuildCommand::new(config);
    if dry_run {
        return print_plan(&cmd.plan(), format);
    }

    let mut report = RebuildReport::default();
    let result = cmd.execute_into(&SystemRunner::new(), &mut report);
    // Steps that finished before a failure are still shown.
    print_rebuild_result(&report, format)?;
    result?;
    tracing::info!("Rebuild complete");
    Ok(())
}

fn run_sync(
    config: &RedeployConfig,
    dry_run: bool,
    no_verify: bool,
    format: OutputFormat,
) -> Result<()> {
    let cmd = SyncCommand::new(config).with_verify(config.git.verify && !no_verify);
    if dry_run {
        return print_plan(cmd.plan().steps(), format);
    }

    let mut report = SyncReport::default();
    let result = cmd.execute_into(&SystemRunner::new(), &mut report);
    print_sync_result(&report, format)?;
    result?;
    tracing::info!("Sync complete");
    Ok(())
}

fn print_plan(steps: &[Step], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for (index, step) in steps.iter().enumerate() {
                let note = match step.policy {
                    FailurePolicy::FailFast => "",
                    FailurePolicy::Tolerate => "  (failure tolerated)",
                };
                println!("{:>2}. {:<18} {}{}", index + 1, step.name, step.invocation, note);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(steps)?);
        }
    }
    Ok(())
}

fn print_steps(report: &PipelineReport) {
    for record in &report.steps {
        match &record.outcome {
            StepOutcome::Succeeded => println!("✓ {:<18} {}", record.name, record.command),
            StepOutcome::Tolerated { reason } => {
                println!("• {:<18} {}", record.name, record.command);
                println!("  ⚠ {}", reason);
            }
        }
    }
}

fn print_sync_summary(report: &SyncReport) {
    if let Some(verification) = &report.verification {
        println!(
            "  Working tree matches {} at {}",
            verification.tracking_ref, verification.head_commit
        );
    }
}

fn print_rebuild_result(report: &RebuildReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print_steps(&report.containers);
            print_steps(&report.sync.pipeline);
            print_sync_summary(&report.sync);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn print_sync_result(report: &SyncReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print_steps(&report.pipeline);
            print_sync_summary(report);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn print_config(config: &RedeployConfig, source: &ConfigSource, format: OutputFormat) -> Result<()> {
    let origin = source
        .path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    match format {
        OutputFormat::Table => {
            println!("# Loaded from {}", origin);
            print!("{}", to_toml(config)?);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "source": origin,
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
