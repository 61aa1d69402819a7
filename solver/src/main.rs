//! `solver` CLI: answer a word problem through plan, execute and verify.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use solver::exit_codes;
use solver::io::attempt_log::{write_attempt, write_result};
use solver::io::config::{ClientConfig, SolverConfig, load_config, write_config};
use solver::io::generation::GeminiGenerator;
use solver::{FinalResult, Solver, logging};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "solver",
    version,
    about = "Plan, execute and verify answers to word problems"
)]
struct Cli {
    /// Path to the solver config file.
    #[arg(long, global = true, default_value = "solver.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Solve one question and print the result JSON.
    Solve {
        /// Question text. Read from stdin when omitted.
        question: Option<String>,
        /// Override `max_retries` from the config.
        #[arg(long)]
        max_retries: Option<u32>,
        /// Write per-attempt artifacts under this directory.
        #[arg(long)]
        attempt_log: Option<PathBuf>,
        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Solve {
            question,
            max_retries,
            attempt_log,
            compact,
        } => cmd_solve(
            &cli.config,
            question,
            max_retries,
            attempt_log.as_deref(),
            compact,
        ),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &SolverConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_solve(
    config_path: &Path,
    question: Option<String>,
    max_retries: Option<u32>,
    attempt_log: Option<&Path>,
    compact: bool,
) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let question = match question {
        Some(question) => question,
        None => prompt_question(&mut io::stdin().lock(), &mut io::stderr())?,
    };
    if question.trim().is_empty() {
        bail!("question is empty");
    }

    let client = ClientConfig::from_env(&cfg)?;
    let solver = Solver::new(GeminiGenerator::new(client)?)?;
    let max_retries = max_retries.unwrap_or(cfg.max_retries);

    let result = solver.solve_with(&question, max_retries, |record| {
        if let Some(dir) = attempt_log
            && let Err(err) = write_attempt(dir, record)
        {
            warn!(attempt = record.index, "failed to write attempt log: {err:#}");
        }
    })?;
    finish_solve(&result, attempt_log, compact, &mut io::stdout().lock())
}

/// Print the result, then write `result.json`. A log write failure only warns.
fn finish_solve<W: Write>(
    result: &FinalResult,
    attempt_log: Option<&Path>,
    compact: bool,
    out: &mut W,
) -> Result<i32> {
    writeln!(out, "{}", render_result(result, compact)?).context("write result")?;
    if let Some(dir) = attempt_log
        && let Err(err) = write_result(dir, result)
    {
        warn!("failed to write result log: {err:#}");
    }
    Ok(if result.is_success() {
        exit_codes::OK
    } else {
        exit_codes::FAILED
    })
}

/// Prompt on `out` and read one line from `input`.
fn prompt_question<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    write!(out, "Enter your question: ").context("write prompt")?;
    out.flush().context("flush prompt")?;
    let mut line = String::new();
    input.read_line(&mut line).context("read question")?;
    Ok(line.trim().to_string())
}

fn render_result(result: &FinalResult, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(result)
    } else {
        serde_json::to_string_pretty(result)
    };
    rendered.context("serialize result")
}
