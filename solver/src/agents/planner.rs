//! Planner agent: question in, numbered plan out.

use anyhow::Result;
use tracing::{debug, instrument};

use crate::io::generation::Generator;
use crate::io::prompt::PromptBuilder;

/// Produces a free-text plan. The plan is never parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlannerAgent;

impl PlannerAgent {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all)]
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        prompts: &PromptBuilder,
        question: &str,
    ) -> Result<String> {
        let prompt = prompts.planner(question)?;
        let plan = generator.generate(&prompt)?.trim().to_string();
        debug!(plan_lines = plan.lines().count(), "plan generated");
        Ok(plan)
    }
}
