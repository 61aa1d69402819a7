//! Parsing of structured generation output.
//!
//! Generation services wrap JSON in markdown fences despite instructions, so
//! fence markers are stripped before parsing. Everything else is strict: the
//! stripped text must be one JSON document that satisfies the stage's schema.

use std::fmt;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use jsonschema::{Draft, Validator};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Stage whose output is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Executor,
    Verifier,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Executor => "executor",
            Stage::Verifier => "verifier",
        }
    }

    /// Name of the synthetic check recorded when this stage's output is unusable.
    pub fn check_name(&self) -> &'static str {
        match self {
            Stage::Executor => "executor_response",
            Stage::Verifier => "verifier_response",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The generation call succeeded but its text does not fit the stage schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {stage} response: {reason}")]
pub struct MalformedResponseError {
    pub stage: Stage,
    pub reason: String,
}

impl MalformedResponseError {
    fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Remove every markdown code-fence marker (with its language tag) and trim.
pub fn strip_code_fences(raw: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("fence regex is valid"));
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// Compiled output schema for one stage.
pub struct ResponseContract {
    stage: Stage,
    validator: Validator,
}

impl fmt::Debug for ResponseContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseContract")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl ResponseContract {
    /// Compile a JSON Schema (Draft 2020-12) for `stage`.
    pub fn new(stage: Stage, schema_raw: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(schema_raw)
            .with_context(|| format!("parse {stage} output schema"))?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .with_context(|| format!("compile {stage} output schema"))?;
        Ok(Self { stage, validator })
    }

    /// Strip fences, then parse and validate `raw` into `T`.
    pub fn parse<T: DeserializeOwned>(&self, raw: &str) -> Result<T, MalformedResponseError> {
        let stripped = strip_code_fences(raw);
        if stripped.is_empty() {
            return Err(MalformedResponseError::new(self.stage, "empty response"));
        }

        let instance: Value = serde_json::from_str(&stripped).map_err(|err| {
            MalformedResponseError::new(self.stage, format!("not valid JSON: {err}"))
        })?;

        let violations: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|err| err.to_string())
            .collect();
        if !violations.is_empty() {
            debug!(stage = %self.stage, count = violations.len(), "schema violations");
            return Err(MalformedResponseError::new(
                self.stage,
                format!("schema violations: {}", violations.join("; ")),
            ));
        }

        serde_json::from_value(instance)
            .map_err(|err| MalformedResponseError::new(self.stage, err.to_string()))
    }
}
