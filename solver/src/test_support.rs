//! Test-only helpers: a scripted generator and canned stage replies.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::json;

use crate::io::generation::{GenerationError, Generator};

/// One scripted reply from the generation service.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(GenerationError),
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Generator that replays queued replies in order and records every prompt.
///
/// Panics when a prompt arrives after the script is exhausted, so a test
/// fails loudly if the controller makes more calls than expected.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: RefCell<VecDeque<ScriptedReply>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Number of `generate` calls received so far.
    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(err)) => Err(err),
            None => panic!("scripted generator exhausted at call {}", self.calls()),
        }
    }
}

/// Executor reply JSON with the given answer and explanation.
pub fn execution_json(answer: &str, explanation: &str) -> String {
    json!({
        "proposed_answer": answer,
        "explanation": explanation,
        "intermediate": { "notes": "scripted" },
    })
    .to_string()
}

/// Verifier reply JSON; each `(name, passed)` pair becomes one check.
pub fn verdict_json(passed: bool, checks: &[(&str, bool)]) -> String {
    let checks: Vec<_> = checks
        .iter()
        .map(|(name, ok)| {
            json!({
                "check_name": name,
                "passed": ok,
                "details": format!("{name} scripted"),
            })
        })
        .collect();
    json!({
        "passed": passed,
        "checks": checks,
        "issues": if passed { "" } else { "scripted rejection" },
    })
    .to_string()
}

/// The three replies of one full attempt: plan, execution, verdict.
pub fn attempt_replies(plan: &str, execution: String, verdict: String) -> Vec<ScriptedReply> {
    vec![
        ScriptedReply::text(plan),
        ScriptedReply::Text(execution),
        ScriptedReply::Text(verdict),
    ]
}
