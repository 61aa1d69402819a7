//! Per-attempt artifacts written by `solver solve --attempt-log DIR`.
//!
//! Layout:
//!
//! ```text
//! DIR/
//!   0/plan.md
//!   0/execution.json
//!   0/verdict.json
//!   0/failure.txt
//!   1/...
//!   result.json
//! ```
//!
//! Files for stages an attempt never reached are simply absent.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::types::FinalResult;
use crate::solve::AttemptRecord;

#[derive(Debug, Clone)]
pub struct AttemptPaths {
    pub dir: PathBuf,
    pub plan_path: PathBuf,
    pub execution_path: PathBuf,
    pub verdict_path: PathBuf,
    pub failure_path: PathBuf,
}

impl AttemptPaths {
    pub fn new(root: &Path, index: u32) -> Self {
        let dir = root.join(index.to_string());
        Self {
            plan_path: dir.join("plan.md"),
            execution_path: dir.join("execution.json"),
            verdict_path: dir.join("verdict.json"),
            failure_path: dir.join("failure.txt"),
            dir,
        }
    }
}

pub fn result_path(root: &Path) -> PathBuf {
    root.join("result.json")
}

pub fn write_attempt(root: &Path, record: &AttemptRecord) -> Result<AttemptPaths> {
    let paths = AttemptPaths::new(root, record.index);
    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("create attempt dir {}", paths.dir.display()))?;

    if let Some(plan) = &record.plan {
        let mut text = plan.clone();
        text.push('\n');
        write_text(&paths.plan_path, &text)?;
    }
    if let Some(execution) = &record.execution {
        write_json(&paths.execution_path, execution)?;
    }
    if let Some(verdict) = &record.verdict {
        write_json(&paths.verdict_path, verdict)?;
    }
    if let Some(failure) = &record.failure {
        let text = format!("{}: {}\n", failure.check_name, failure.details);
        write_text(&paths.failure_path, &text)?;
    }

    Ok(paths)
}

pub fn write_result(root: &Path, result: &FinalResult) -> Result<PathBuf> {
    fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
    let path = result_path(root);
    write_json(&path, result)?;
    Ok(path)
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value)?;
    buf.push('\n');
    write_text(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AttemptMetadata, CheckEntry, ExecutionResult, VerifyResult};
    use std::collections::BTreeMap;

    fn execution() -> ExecutionResult {
        ExecutionResult {
            proposed_answer: "9".to_string(),
            explanation: "3 + 6".to_string(),
            intermediate: BTreeMap::new(),
        }
    }

    #[test]
    fn attempt_paths_are_stable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = AttemptPaths::new(temp.path(), 2);

        assert!(paths.dir.ends_with("2"));
        assert!(paths.plan_path.ends_with("2/plan.md"));
        assert!(paths.execution_path.ends_with("2/execution.json"));
        assert!(paths.verdict_path.ends_with("2/verdict.json"));
        assert!(paths.failure_path.ends_with("2/failure.txt"));
    }

    #[test]
    fn verified_attempt_writes_all_stage_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let record = AttemptRecord {
            index: 0,
            plan: Some("1. Add".to_string()),
            execution: Some(execution()),
            verdict: Some(VerifyResult {
                passed: true,
                checks: vec![CheckEntry {
                    check_name: "arithmetic".to_string(),
                    passed: true,
                    details: "ok".to_string(),
                }],
                issues: String::new(),
            }),
            failure: None,
        };

        let paths = write_attempt(temp.path(), &record).expect("write");

        assert_eq!(
            fs::read_to_string(&paths.plan_path).expect("plan"),
            "1. Add\n"
        );
        let execution: ExecutionResult =
            serde_json::from_str(&fs::read_to_string(&paths.execution_path).expect("read"))
                .expect("parse");
        assert_eq!(execution.proposed_answer, "9");
        assert!(paths.verdict_path.is_file());
        assert!(!paths.failure_path.exists());
    }

    #[test]
    fn failed_attempt_writes_failure_and_skips_missing_stages() {
        let temp = tempfile::tempdir().expect("tempdir");
        let record = AttemptRecord {
            index: 1,
            plan: Some("plan".to_string()),
            execution: None,
            verdict: None,
            failure: Some(CheckEntry::failed(
                "executor_response",
                "malformed executor response: empty response",
            )),
        };

        let paths = write_attempt(temp.path(), &record).expect("write");

        assert!(paths.plan_path.is_file());
        assert!(!paths.execution_path.exists());
        assert!(!paths.verdict_path.exists());
        let failure = fs::read_to_string(&paths.failure_path).expect("failure");
        assert!(failure.starts_with("executor_response: malformed executor response"));
    }

    #[test]
    fn result_is_written_at_log_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("nested/log");
        let result = FinalResult::failed(AttemptMetadata::default());

        let path = write_result(&root, &result).expect("write");

        assert_eq!(path, root.join("result.json"));
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(value["status"], "failed");
    }
}
