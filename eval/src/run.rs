//! Suite execution: solve every question and persist the results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use solver::Solver;
use solver::io::generation::Generator;
use tracing::{info, instrument, warn};

use crate::outcome::{classify_outcome, verifier_passed};
use crate::results::{EvalMeta, QuestionResult, file_sha256, results_dir, write_run};
use crate::suite::SuiteFile;

/// Result of running a suite once.
#[derive(Debug)]
pub struct RunOutcome {
    pub eval_run_id: String,
    pub results_dir: PathBuf,
    pub results: Vec<QuestionResult>,
}

/// Settings shared by every question in a run.
#[derive(Debug, Clone)]
pub struct RunSettings<'a> {
    pub results_base: &'a Path,
    pub suite_path: &'a Path,
    pub model: &'a str,
    pub max_retries: u32,
}

pub fn new_eval_run_id() -> String {
    format!("eval-{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

/// Run every question of `suite` through `solver`.
///
/// A question whose solve call errors is recorded with outcome `error`; the
/// run continues with the next question. `on_question` sees each entry as it
/// completes.
#[instrument(skip_all, fields(suite_id = %suite.suite.id))]
pub fn run_suite<G: Generator, F: FnMut(usize, &QuestionResult)>(
    solver: &Solver<G>,
    suite: &SuiteFile,
    settings: &RunSettings<'_>,
    mut on_question: F,
) -> Result<RunOutcome> {
    info!(questions = suite.questions.len(), "suite run started");
    let started_at = Utc::now();
    let eval_run_id = new_eval_run_id();

    let mut results = Vec::with_capacity(suite.questions.len());
    for (index, question) in suite.questions.iter().enumerate() {
        let entry = run_question(solver, question, settings.max_retries);
        on_question(index, &entry);
        results.push(entry);
    }
    let finished_at = Utc::now();

    let meta = EvalMeta {
        suite_id: suite.suite.id.clone(),
        eval_run_id: eval_run_id.clone(),
        suite_hash: file_sha256(settings.suite_path).context("hash suite")?,
        model: settings.model.to_string(),
        max_retries: settings.max_retries,
        start_time: started_at.to_rfc3339(),
        end_time: finished_at.to_rfc3339(),
        duration_secs: (finished_at - started_at).num_milliseconds() as f64 / 1000.0,
        questions: results.len(),
    };
    let dir = results_dir(settings.results_base, &suite.suite.id, &eval_run_id);
    write_run(&dir, &meta, &results).context("write results")?;

    info!(results_dir = %dir.display(), "suite run complete");
    Ok(RunOutcome {
        eval_run_id,
        results_dir: dir,
        results,
    })
}

fn run_question<G: Generator>(
    solver: &Solver<G>,
    question: &str,
    max_retries: u32,
) -> QuestionResult {
    let started = Instant::now();
    let solved = solver.solve(question, max_retries);
    let duration_ms = started.elapsed().as_millis() as u64;

    match solved {
        Ok(result) => QuestionResult {
            question: question.to_string(),
            outcome: classify_outcome(Some(&result)),
            verifier_passed: verifier_passed(&result),
            retries: result.metadata.retries,
            duration_ms,
            error: None,
            result: Some(result),
        },
        Err(err) => {
            warn!("solve aborted: {err:#}");
            QuestionResult {
                question: question.to_string(),
                outcome: classify_outcome(None),
                result: None,
                verifier_passed: false,
                retries: 0,
                duration_ms,
                error: Some(format!("{err:#}")),
            }
        }
    }
}
