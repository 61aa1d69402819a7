use serde::{Deserialize, Serialize};
use solver::{FinalResult, SolveStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
    Error,
}

/// `None` means the solve call itself returned an error.
pub fn classify_outcome(result: Option<&FinalResult>) -> Outcome {
    match result.map(|result| result.status) {
        Some(SolveStatus::Success) => Outcome::Success,
        Some(SolveStatus::Failed) => Outcome::Failed,
        None => Outcome::Error,
    }
}

/// All accumulated checks passed, or the run succeeded when there are none.
pub fn verifier_passed(result: &FinalResult) -> bool {
    let checks = &result.metadata.checks;
    if checks.is_empty() {
        return result.is_success();
    }
    checks.iter().all(|check| check.passed)
}
