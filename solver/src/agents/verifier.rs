//! Verifier agent: an independent generation pass that judges a proposed
//! solution. There is no symbolic checking behind it, so the verdict is only
//! as sound as the service.

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::response::{ResponseContract, Stage};
use crate::core::types::{ExecutionResult, VerifyResult};
use crate::io::generation::Generator;
use crate::io::prompt::PromptBuilder;

const VERIFY_RESULT_SCHEMA: &str = include_str!("../../schemas/verify_result.schema.json");

pub struct VerifierAgent {
    contract: ResponseContract,
}

impl VerifierAgent {
    pub fn new() -> Result<Self> {
        Ok(Self {
            contract: ResponseContract::new(Stage::Verifier, VERIFY_RESULT_SCHEMA)?,
        })
    }

    #[instrument(skip_all)]
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        prompts: &PromptBuilder,
        question: &str,
        execution: &ExecutionResult,
    ) -> Result<VerifyResult> {
        let prompt = prompts.verifier(question, execution)?;
        let raw = generator.generate(&prompt)?;
        let verdict: VerifyResult = self.contract.parse(&raw)?;
        debug!(
            passed = verdict.passed,
            checks = verdict.checks.len(),
            "verdict parsed"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::response::MalformedResponseError;
    use crate::test_support::{ScriptedGenerator, ScriptedReply, verdict_json};
    use std::collections::BTreeMap;

    fn execution() -> ExecutionResult {
        ExecutionResult {
            proposed_answer: "9".to_string(),
            explanation: "3 red and 6 green".to_string(),
            intermediate: BTreeMap::new(),
        }
    }

    #[test]
    fn parses_verdict_with_ordered_checks() {
        let generator = ScriptedGenerator::new(vec![ScriptedReply::Text(verdict_json(
            false,
            &[("arithmetic", true), ("constraints", false)],
        ))]);
        let prompts = PromptBuilder::new().expect("templates");

        let verdict = VerifierAgent::new()
            .expect("agent")
            .run(&generator, &prompts, "How many apples?", &execution())
            .expect("verdict");

        assert!(!verdict.passed);
        let names: Vec<&str> = verdict
            .checks
            .iter()
            .map(|check| check.check_name.as_str())
            .collect();
        assert_eq!(names, vec!["arithmetic", "constraints"]);
        assert_eq!(verdict.issues, "scripted rejection");
    }

    #[test]
    fn top_level_passed_is_taken_as_is() {
        let generator = ScriptedGenerator::new(vec![ScriptedReply::Text(verdict_json(
            true,
            &[("arithmetic", false)],
        ))]);
        let prompts = PromptBuilder::new().expect("templates");

        let verdict = VerifierAgent::new()
            .expect("agent")
            .run(&generator, &prompts, "q", &execution())
            .expect("verdict");
        assert!(verdict.passed);
    }

    #[test]
    fn missing_passed_field_is_malformed() {
        let generator =
            ScriptedGenerator::new(vec![ScriptedReply::text(r#"{"checks": [], "issues": ""}"#)]);
        let prompts = PromptBuilder::new().expect("templates");

        let err = VerifierAgent::new()
            .expect("agent")
            .run(&generator, &prompts, "q", &execution())
            .expect_err("malformed");
        let malformed = err
            .downcast_ref::<MalformedResponseError>()
            .expect("malformed error");
        assert_eq!(malformed.stage, Stage::Verifier);
    }
}
