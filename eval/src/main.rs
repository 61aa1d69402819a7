mod cli;
mod config;
mod outcome;
mod report;
mod results;
mod run;
mod suite;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "eval", version, about = "Question-suite harness for the solver")]
struct Cli {
    /// Solver config file used by `run`.
    #[arg(long, global = true, default_value = "solver.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    List,
    Run { suite_id: String },
    Report { suite_id: String },
    Clean { suite_id: String },
}

fn main() -> Result<()> {
    solver::logging::init();
    let cli = Cli::parse();
    let repo_root = std::env::current_dir()?;
    match cli.command {
        Command::List => cli::list_suites(&repo_root),
        Command::Run { suite_id } => cli::run_suite_by_id(&repo_root, &cli.config, &suite_id),
        Command::Report { suite_id } => cli::report_suite(&repo_root, &suite_id),
        Command::Clean { suite_id } => cli::clean_suite(&repo_root, &suite_id),
    }
}
