//! Inter-stage data contract shared by the agents and the controller.
//!
//! Every record here is plain data: no I/O, no generation calls. The executor
//! and verifier records are deserialized from generation output; the final
//! result is what `solve` hands back to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum number of characters of the explanation shown to the user.
pub const REASONING_CHAR_LIMIT: usize = 250;

/// Fixed user-facing message for an exhausted solve.
pub const FAILURE_MESSAGE: &str =
    "The agent could not find a consistent solution after verification.";

/// Structured output of the executor stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub proposed_answer: String,
    pub explanation: String,
    /// Free-form notes; never shown to the verifier. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub intermediate: BTreeMap<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One atomic verification performed by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEntry {
    pub check_name: String,
    pub passed: bool,
    pub details: String,
}

impl CheckEntry {
    /// A failed check recorded on behalf of an attempt that broke down
    /// before the verifier could judge it.
    pub fn failed(check_name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            passed: false,
            details: details.into(),
        }
    }
}

/// Structured verdict of the verifier stage.
///
/// `passed` is the only acceptance gate. It is never recomputed from `checks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub passed: bool,
    pub checks: Vec<CheckEntry>,
    #[serde(default)]
    pub issues: String,
}

/// Accumulator owned by the controller for one `solve` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptMetadata {
    /// Plan of the most recent attempt; `None` if that attempt never produced one.
    pub plan: Option<String>,
    /// Checks from every attempt, in order. Append-only.
    pub checks: Vec<CheckEntry>,
    /// 0-based index of the last attempt executed.
    pub retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Success,
    Failed,
}

/// Terminal result of a `solve` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    pub answer: String,
    pub status: SolveStatus,
    pub reasoning_visible_to_user: String,
    pub metadata: AttemptMetadata,
}

impl FinalResult {
    pub fn success(execution: &ExecutionResult, metadata: AttemptMetadata) -> Self {
        Self {
            answer: execution.proposed_answer.clone(),
            status: SolveStatus::Success,
            reasoning_visible_to_user: summarize_short(&execution.explanation),
            metadata,
        }
    }

    pub fn failed(metadata: AttemptMetadata) -> Self {
        Self {
            answer: String::new(),
            status: SolveStatus::Failed,
            reasoning_visible_to_user: FAILURE_MESSAGE.to_string(),
            metadata,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SolveStatus::Success
    }
}

/// Trim the explanation and hard-cut it at [`REASONING_CHAR_LIMIT`] characters.
pub fn summarize_short(explanation: &str) -> String {
    explanation
        .trim()
        .chars()
        .take(REASONING_CHAR_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_short_cuts_at_character_limit() {
        let long = "x".repeat(400);
        assert_eq!(summarize_short(&long).chars().count(), REASONING_CHAR_LIMIT);
        assert_eq!(summarize_short("  short  "), "short");
    }

    #[test]
    fn summarize_short_counts_characters_not_bytes() {
        let long = "é".repeat(300);
        let cut = summarize_short(&long);
        assert_eq!(cut.chars().count(), REASONING_CHAR_LIMIT);
        assert_eq!(cut.len(), REASONING_CHAR_LIMIT * 2);
    }

    #[test]
    fn final_result_serializes_with_exact_field_set() {
        let result = FinalResult::failed(AttemptMetadata {
            plan: Some("1. add".to_string()),
            checks: vec![CheckEntry::failed("sum", "wrong total")],
            retries: 1,
        });
        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["answer"], "");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["reasoning_visible_to_user"], FAILURE_MESSAGE);
        assert_eq!(value["metadata"]["plan"], "1. add");
        assert_eq!(value["metadata"]["retries"], 1);
        assert_eq!(value["metadata"]["checks"][0]["check_name"], "sum");
        assert_eq!(value.as_object().expect("object").len(), 4);
    }

    #[test]
    fn verify_result_defaults_missing_issues() {
        let verdict: VerifyResult =
            serde_json::from_str(r#"{"passed": true, "checks": []}"#).expect("parse");
        assert!(verdict.passed);
        assert!(verdict.issues.is_empty());
    }
}
