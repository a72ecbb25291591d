use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fishery::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start a new run.
    Create {
        /// Number of episodes files to simulate.
        #[arg(long, default_value_t = 1)]
        n_files: usize,
    },

    /// Continue a run from its checkpoint.
    Resume {
        #[arg(long)]
        run_idx: usize,

        /// Number of episodes files to simulate.
        #[arg(long, default_value_t = 1)]
        n_files: usize,
    },

    /// Summarize the episodes of one run (all runs by default).
    Analyze {
        #[arg(long)]
        run_idx: Option<usize>,
    },

    /// Remove every run.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Create { n_files } => mgr.create_run(n_files)?,
        Command::Resume { run_idx, n_files } => mgr.resume_run(run_idx, n_files)?,
        Command::Analyze { run_idx } => mgr.analyze_sim(run_idx)?,
        Command::Clean => mgr.clean_sim()?,
    }

    Ok(())
}
