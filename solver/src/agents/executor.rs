//! Executor agent: follows the plan and returns a structured result.

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::response::{ResponseContract, Stage};
use crate::core::types::ExecutionResult;
use crate::io::generation::Generator;
use crate::io::prompt::PromptBuilder;

const EXECUTION_RESULT_SCHEMA: &str = include_str!("../../schemas/execution_result.schema.json");

/// Executor agent wrapper that owns the compiled output schema.
pub struct ExecutorAgent {
    contract: ResponseContract,
}

impl ExecutorAgent {
    pub fn new() -> Result<Self> {
        Ok(Self {
            contract: ResponseContract::new(Stage::Executor, EXECUTION_RESULT_SCHEMA)?,
        })
    }

    /// Fails with `MalformedResponseError` when the reply does not fit the schema.
    #[instrument(skip_all, fields(plan_bytes = plan.len()))]
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        prompts: &PromptBuilder,
        question: &str,
        plan: &str,
    ) -> Result<ExecutionResult> {
        let prompt = prompts.executor(question, plan)?;
        let raw = generator.generate(&prompt)?;
        let result: ExecutionResult = self.contract.parse(&raw)?;
        debug!(answer = %result.proposed_answer, "execution parsed");
        Ok(result)
    }
}
