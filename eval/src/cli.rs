//! CLI command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use solver::Solver;
use solver::io::config::{ClientConfig, load_config};
use solver::io::generation::GeminiGenerator;
use tracing::{debug, info};

use crate::config::apply_suite_config;
use crate::report::aggregate;
use crate::results::QuestionResult;
use crate::run::{RunSettings, run_suite};
use crate::suite::{SuiteFile, discover_suites, validate_suite_id};

fn suites_dir(repo_root: &Path) -> PathBuf {
    repo_root.join("eval").join("suites")
}

fn results_base(repo_root: &Path) -> PathBuf {
    repo_root.join("eval").join("results")
}

pub fn list_suites(repo_root: &Path) -> Result<()> {
    for suite in discover_suites(&suites_dir(repo_root))? {
        println!("{}", suite.suite.id);
    }
    Ok(())
}

/// Run a suite against the live generation service.
pub fn run_suite_by_id(repo_root: &Path, config_path: &Path, suite_id: &str) -> Result<()> {
    validate_suite_id(suite_id)?;
    let suite_path = suites_dir(repo_root).join(format!("{suite_id}.toml"));
    if !suite_path.exists() {
        bail!("suite {} not found at {}", suite_id, suite_path.display());
    }
    let suite = SuiteFile::load(&suite_path).context("load suite")?;
    let cfg = apply_suite_config(load_config(config_path)?, &suite.config)?;
    debug!(suite_id, max_retries = cfg.max_retries, "suite loaded");

    let client = ClientConfig::from_env(&cfg)?;
    let model = client.model.clone();
    let solver = Solver::new(GeminiGenerator::new(client)?)?;
    let results_base = results_base(repo_root);

    info!(suite_id, questions = suite.questions.len(), "starting suite");
    println!("=== {} ===", suite_id.to_uppercase());
    let outcome = run_suite(
        &solver,
        &suite,
        &RunSettings {
            results_base: &results_base,
            suite_path: &suite_path,
            model: &model,
            max_retries: cfg.max_retries,
        },
        print_question,
    )?;
    println!(
        "run: suite={} eval_run_id={} results={}",
        suite_id,
        outcome.eval_run_id,
        outcome.results_dir.display()
    );
    Ok(())
}

fn print_question(index: usize, entry: &QuestionResult) {
    println!("\n--- Test {} ---", index + 1);
    println!("Question: {}", entry.question);
    match (&entry.result, &entry.error) {
        (Some(result), _) => {
            println!("Final JSON:");
            match serde_json::to_string_pretty(result) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("<unserializable result: {err}>"),
            }
        }
        (None, Some(error)) => println!("Error: {error}"),
        (None, None) => {}
    }
    println!("Verifier passed: {}", entry.verifier_passed);
    println!("Agent retries: {}", entry.retries);
}

pub fn report_suite(repo_root: &Path, suite_id: &str) -> Result<()> {
    validate_suite_id(suite_id)?;
    let (summary, warnings) = aggregate(&results_base(repo_root).join(suite_id))?;
    println!(
        "report: suite={} runs={} questions={}",
        suite_id, summary.runs, summary.questions
    );
    println!(
        "report: success={} failed={} error={} verifier_passed={}",
        summary.success, summary.failed, summary.errors, summary.verifier_passed
    );
    if let Some(avg) = summary.avg_retries {
        println!("report: avg_retries={:.2}", avg);
    }
    if let Some(avg) = summary.avg_duration_ms {
        println!("report: avg_duration_ms={:.0}", avg);
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

pub fn clean_suite(repo_root: &Path, suite_id: &str) -> Result<()> {
    validate_suite_id(suite_id)?;
    let suite_results = results_base(repo_root).join(suite_id);
    if suite_results.exists() {
        std::fs::remove_dir_all(&suite_results)
            .with_context(|| format!("remove {}", suite_results.display()))?;
    }
    println!(
        "clean: suite={} results={}",
        suite_id,
        suite_results.display()
    );
    Ok(())
}
