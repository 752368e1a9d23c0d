//! Scripted driver for the fixed-region byte queues.
//!
//! Runs a queue script (see [`script`]) against a fresh queue manager and
//! prints dequeued bytes to stdout. Any queue fault is fatal: the harness
//! prints the manager's diagnostic and exits with status 1.

mod config;
mod logging;
mod metrics;
mod script;

use crate::config::Config;
use crate::script::{REFERENCE, RunError, Runner, Script};

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "queue-harness")]
#[command(about = "Run a byte queue script against the fixed storage region")]
struct Args {
    /// Path to configuration file
    config: Option<PathBuf>,

    /// Script file to run (overrides the configuration)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print pool and operation statistics to stderr after the run
    #[arg(long)]
    stats: bool,
}

fn main() {
    let args = Args::parse();

    let config = match args.config.as_deref().map(Config::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.logging);

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_source(args, config)?;
    let script = Script::parse(&source)?;
    info!(commands = script.steps().len(), "running script");

    let mut runner = Runner::new(std::io::stdout().lock());
    let result = runner.run(&script);
    let stats = runner.manager().pool_stats();
    drop(runner);

    if args.stats || config.scenario.stats {
        eprintln!(
            "pool: in_use={} free_listed={} touched={}/{}",
            stats.in_use, stats.free_listed, stats.touched, stats.total
        );
        eprintln!("ops: {}", metrics::summary());
    }

    match result {
        Ok(()) => Ok(()),
        Err(RunError::Queue { line, source }) => {
            info!(line, "script stopped on queue fault");
            queue_core::exit_on(source)
        }
        Err(e) => Err(e.into()),
    }
}

fn load_source(args: &Args, config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(path) = args.script.as_ref().or(config.scenario.script.as_ref()) {
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read script {}: {e}", path.display()))?;
        return Ok(source);
    }

    if !config.scenario.commands.is_empty() {
        return Ok(config.scenario.commands.join("\n"));
    }

    Ok(REFERENCE.to_string())
}
