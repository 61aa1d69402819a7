use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::outcome::Outcome;
use crate::results::{read_meta, read_results};

#[derive(Debug, Default, PartialEq)]
pub struct ReportSummary {
    pub runs: usize,
    pub questions: usize,
    pub success: usize,
    pub failed: usize,
    pub errors: usize,
    pub verifier_passed: usize,
    pub avg_retries: Option<f64>,
    pub avg_duration_ms: Option<f64>,
}

pub fn load_run_dirs(suite_results_dir: &Path) -> Result<Vec<PathBuf>> {
    if !suite_results_dir.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(suite_results_dir)
        .with_context(|| format!("read {}", suite_results_dir.display()))?
    {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Aggregate every run under a suite's results dir. Unreadable runs are
/// skipped and reported as warnings.
pub fn aggregate(suite_results_dir: &Path) -> Result<(ReportSummary, Vec<String>)> {
    let mut summary = ReportSummary::default();
    let mut warnings = Vec::new();
    let mut retries_total = 0u64;
    let mut solved = 0usize;
    let mut duration_total = 0u64;

    for run_dir in load_run_dirs(suite_results_dir)? {
        if let Err(err) = read_meta(&run_dir) {
            warnings.push(format!("skip {}: {err:#}", run_dir.display()));
            continue;
        }
        let results = match read_results(&run_dir) {
            Ok(results) => results,
            Err(err) => {
                warnings.push(format!("skip {}: {err:#}", run_dir.display()));
                continue;
            }
        };

        summary.runs += 1;
        for entry in &results {
            summary.questions += 1;
            match entry.outcome {
                Outcome::Success => summary.success += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Error => summary.errors += 1,
            }
            if entry.verifier_passed {
                summary.verifier_passed += 1;
            }
            if entry.result.is_some() {
                solved += 1;
                retries_total += u64::from(entry.retries);
            }
            duration_total += entry.duration_ms;
        }
    }

    if solved > 0 {
        summary.avg_retries = Some(retries_total as f64 / solved as f64);
    }
    if summary.questions > 0 {
        summary.avg_duration_ms = Some(duration_total as f64 / summary.questions as f64);
    }
    Ok((summary, warnings))
}
