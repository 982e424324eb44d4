use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;

use dine::config::{
    DEFAULT_DAWDLE_MS, DEFAULT_PHILOSOPHERS, MAX_CYCLES, MAX_PHILOSOPHERS, MIN_PHILOSOPHERS,
};
use dine::signal::StatusWatcher;
use dine::{SimConfig, Simulation, Summary, TableReporter};

#[derive(Parser)]
#[command(name = "dine", version)]
#[command(about = "Dining philosophers with parity-ordered fork pickup")]
struct Cli {
    /// Eat/think cycles per philosopher
    #[arg(
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=MAX_CYCLES as i64)
    )]
    cycles: u32,

    /// Number of philosophers (and forks) around the table
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_PHILOSOPHERS as u8,
        value_parser = clap::value_parser!(u8).range(MIN_PHILOSOPHERS as i64..=MAX_PHILOSOPHERS as i64)
    )]
    philosophers: u8,

    /// Upper bound in milliseconds of each random eating/thinking pause
    #[arg(long, env = "DINE_DAWDLE_MS", default_value_t = DEFAULT_DAWDLE_MS)]
    dawdle_ms: u64,

    /// Seed for the pause durations
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<Summary> {
    let config = SimConfig {
        philosophers: cli.philosophers as usize,
        cycles: cli.cycles,
        max_dawdle: Duration::from_millis(cli.dawdle_ms),
        seed: cli.seed,
    };
    // 表を作る前にハンドラを入れておく。間に合わない SIGUSR1 で落ちないように
    let watcher = StatusWatcher::spawn().context("failed to install SIGUSR1 handler")?;

    let reporter = TableReporter::new(io::stdout(), config.philosophers);
    let sim = match Simulation::new(config, Box::new(reporter)) {
        Ok(sim) => sim,
        Err(err) => {
            watcher.stop();
            return Err(err).context("failed to set up the table");
        }
    };
    watcher.attach(sim.store());
    let summary = sim.run();
    watcher.stop();

    summary.context("simulation failed")
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // 使い方の誤りは 1、--help / --version は 0
            if !err.use_stderr() {
                let _ = err.print();
                return ExitCode::SUCCESS;
            }
            let rendered = err.render().to_string();
            eprint!("{rendered}");
            // 範囲外の値などは clap が Usage 行を出さないので補う
            if !rendered.contains("Usage:") {
                eprintln!("\n{}", Cli::command().render_usage());
            }
            return ExitCode::from(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}
