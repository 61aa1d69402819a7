//! Result persistence for `eval/results/<suite>/<eval-run-id>/`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use solver::FinalResult;

use crate::outcome::Outcome;

/// Metadata for an eval run, persisted to `meta.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EvalMeta {
    pub suite_id: String,
    pub eval_run_id: String,
    /// SHA-256 hash of the suite file for reproducibility tracking.
    pub suite_hash: String,
    pub model: String,
    pub max_retries: u32,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    pub questions: usize,
}

/// One question's entry in `results.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuestionResult {
    pub question: String,
    pub outcome: Outcome,
    pub result: Option<FinalResult>,
    pub verifier_passed: bool,
    pub retries: u32,
    pub duration_ms: u64,
    /// Set when the solve call aborted instead of returning a result.
    pub error: Option<String>,
}

pub fn results_dir(base_dir: &Path, suite_id: &str, eval_run_id: &str) -> PathBuf {
    base_dir.join(suite_id).join(eval_run_id)
}

/// Write `meta.json` and `results.json` into a fresh run directory.
pub fn write_run(dir: &Path, meta: &EvalMeta, results: &[QuestionResult]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create results dir {}", dir.display()))?;
    write_json(&dir.join("meta.json"), meta)?;
    write_json(&dir.join("results.json"), &results)?;
    Ok(())
}

pub fn read_meta(dir: &Path) -> Result<EvalMeta> {
    read_json(&dir.join("meta.json"))
}

pub fn read_results(dir: &Path) -> Result<Vec<QuestionResult>> {
    read_json(&dir.join("results.json"))
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    fs::write(path, format!("{contents}\n")).with_context(|| format!("write {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}
