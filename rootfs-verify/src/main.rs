//! rootfs-verify - Main entry point
//!
//! Verifies a root filesystem tree against its mtree manifest.

use anyhow::Context;
use clap::Parser;
use rootfs_verify::report::{Outcome, Reporter};
use rootfs_verify::scheduler::BatchScheduler;
use rootfs_verify::utils::errors::EXIT_INFRASTRUCTURE;
use rootfs_verify::{utils, Config, VerifyError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Manifest to verify against (overrides config)
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Discrepancy log location (overrides config)
    #[arg(long, value_name = "FILE")]
    log_path: Option<PathBuf>,

    /// Manifest lines per batch (overrides config)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Number of parallel workers (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Resolve manifest paths below this directory
    #[arg(short, long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Do not compare symlink targets
    #[arg(long)]
    no_link_targets: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(outcome) => {
            eprintln!("{}", outcome);
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => match e.downcast_ref::<VerifyError>() {
            Some(err) => {
                eprintln!("Error: {}", err);
                ExitCode::from(err.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(EXIT_INFRASTRUCTURE)
            }
        },
    }
}

fn run(args: Args) -> anyhow::Result<Outcome> {
    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)
            .with_context(|| format!("failed to load config {}", config_path.display()))?
    } else {
        Config::default()
    };
    apply_overrides(&mut config, args);

    // Initialize logging
    utils::logger::init(&config.log.level)?;

    config.validate()?;
    config.check_paths()?;

    tracing::info!(
        "Starting rootfs-verify v{} (manifest: {})",
        env!("CARGO_PKG_VERSION"),
        config.manifest.path.display()
    );

    let scheduler = BatchScheduler::new(config.scheduler_options()?, config.validate_options());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(VerifyError::Io)?;

    let summary = runtime.block_on(scheduler.verify_file(&config.manifest.path))?;

    let outcome = Reporter::new(&config.report.log_path).report(&summary.discrepancies)?;
    Ok(outcome)
}

fn apply_overrides(config: &mut Config, args: Args) {
    if let Some(manifest) = args.manifest {
        config.manifest.path = manifest;
    }
    if let Some(log_path) = args.log_path {
        config.report.log_path = log_path;
    }
    if let Some(batch_size) = args.batch_size {
        config.performance.batch_size = batch_size;
    }
    if let Some(workers) = args.workers {
        config.performance.workers = workers;
    }
    if let Some(root) = args.root {
        config.verify.root = Some(root);
    }
    if args.no_link_targets {
        config.verify.check_link_targets = false;
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }
}
