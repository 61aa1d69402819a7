//! Prompt rendering for the planner, executor and verifier roles.
//!
//! Each prompt is a pure function of its typed inputs. The templates declare
//! the role, its inputs and, for structured roles, the exact JSON shape the
//! service must return.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use tracing::debug;

use crate::core::types::ExecutionResult;

const PLANNER_TEMPLATE: &str = include_str!("prompts/planner.md");
const EXECUTOR_TEMPLATE: &str = include_str!("prompts/executor.md");
const VERIFIER_TEMPLATE: &str = include_str!("prompts/verifier.md");

/// Template engine wrapper around minijinja.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("planner", PLANNER_TEMPLATE)
            .context("load planner template")?;
        env.add_template("executor", EXECUTOR_TEMPLATE)
            .context("load executor template")?;
        env.add_template("verifier", VERIFIER_TEMPLATE)
            .context("load verifier template")?;
        Ok(Self { env })
    }

    pub fn planner(&self, question: &str) -> Result<String> {
        self.render(
            "planner",
            context! {
                question => question.trim(),
            },
        )
    }

    pub fn executor(&self, question: &str, plan: &str) -> Result<String> {
        self.render(
            "executor",
            context! {
                question => question.trim(),
                plan => plan.trim(),
            },
        )
    }

    /// Intermediate notes are never shown to the verifier.
    pub fn verifier(&self, question: &str, execution: &ExecutionResult) -> Result<String> {
        self.render(
            "verifier",
            context! {
                question => question.trim(),
                proposed_answer => execution.proposed_answer.as_str(),
                explanation => execution.explanation.as_str(),
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .with_context(|| format!("get {name} template"))?;
        let rendered = template
            .render(ctx)
            .with_context(|| format!("render {name} prompt"))?;
        debug!(template = name, prompt_bytes = rendered.len(), "rendered prompt");
        Ok(rendered)
    }
}
