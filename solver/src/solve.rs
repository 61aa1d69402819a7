//! Plan -> execute -> verify controller with bounded blind retries.

use anyhow::Result;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::agents::{ExecutorAgent, PlannerAgent, VerifierAgent};
use crate::core::response::MalformedResponseError;
use crate::core::types::{AttemptMetadata, CheckEntry, ExecutionResult, FinalResult, VerifyResult};
use crate::io::generation::{GenerationError, Generator};
use crate::io::prompt::PromptBuilder;

pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Check name recorded when a generation call itself fails.
pub const GENERATION_CHECK_NAME: &str = "generation_service";

/// Everything one attempt produced, in stage order.
///
/// Stages after the first failure stay `None`. `failure` is set only when a
/// stage could not complete; a verifier rejection is not a failure here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub index: u32,
    pub plan: Option<String>,
    pub execution: Option<ExecutionResult>,
    pub verdict: Option<VerifyResult>,
    pub failure: Option<CheckEntry>,
}

impl AttemptRecord {
    fn new(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// True only when the verifier returned `passed: true`.
    pub fn accepted(&self) -> bool {
        self.verdict.as_ref().is_some_and(|verdict| verdict.passed)
    }

    /// Checks this attempt contributes to the accumulated metadata.
    pub fn checks(&self) -> Vec<CheckEntry> {
        match (&self.verdict, &self.failure) {
            (Some(verdict), _) => verdict.checks.clone(),
            (None, Some(failure)) => vec![failure.clone()],
            (None, None) => Vec::new(),
        }
    }

    fn pending_stage(&self) -> &'static str {
        if self.plan.is_none() {
            "planner"
        } else if self.execution.is_none() {
            "executor"
        } else {
            "verifier"
        }
    }
}

/// Owns the role agents and the prompt templates for one generator.
pub struct Solver<G> {
    generator: G,
    prompts: PromptBuilder,
    planner: PlannerAgent,
    executor: ExecutorAgent,
    verifier: VerifierAgent,
}

impl<G: Generator> Solver<G> {
    pub fn new(generator: G) -> Result<Self> {
        Ok(Self {
            generator,
            prompts: PromptBuilder::new()?,
            planner: PlannerAgent::new(),
            executor: ExecutorAgent::new()?,
            verifier: VerifierAgent::new()?,
        })
    }

    pub fn solve(&self, question: &str, max_retries: u32) -> Result<FinalResult> {
        self.solve_with(question, max_retries, |_| {})
    }

    /// Run up to `max_retries + 1` attempts, stopping at the first verified one.
    ///
    /// `on_attempt` sees every attempt, including the accepted one. Generation
    /// failures and malformed stage replies are recorded as failed checks and
    /// retried; any other error aborts the whole solve.
    #[instrument(skip_all, fields(max_retries = max_retries))]
    pub fn solve_with<F: FnMut(&AttemptRecord)>(
        &self,
        question: &str,
        max_retries: u32,
        mut on_attempt: F,
    ) -> Result<FinalResult> {
        let mut metadata = AttemptMetadata::default();

        for index in 0..=max_retries {
            let record = self.run_attempt(question, index)?;

            metadata.retries = index;
            metadata.plan = record.plan.clone();
            metadata.checks.extend(record.checks());
            on_attempt(&record);

            if record.accepted()
                && let Some(execution) = &record.execution
            {
                info!(attempt = index, "solution verified");
                return Ok(FinalResult::success(execution, metadata));
            }
            if record.failure.is_none() {
                info!(attempt = index, "verifier rejected solution");
            }
        }

        warn!(attempts = max_retries + 1, "no verified solution");
        Ok(FinalResult::failed(metadata))
    }

    #[instrument(skip_all, fields(attempt = index))]
    fn run_attempt(&self, question: &str, index: u32) -> Result<AttemptRecord> {
        let mut record = AttemptRecord::new(index);
        if let Err(err) = self.run_stages(question, &mut record) {
            let Some(check) = failure_check(&err, record.pending_stage()) else {
                return Err(err);
            };
            warn!(
                stage = record.pending_stage(),
                check = %check.check_name,
                "attempt failed: {}",
                check.details
            );
            record.failure = Some(check);
        }
        Ok(record)
    }

    fn run_stages(&self, question: &str, record: &mut AttemptRecord) -> Result<()> {
        let plan = self
            .planner
            .run(&self.generator, &self.prompts, question)?;
        let plan = record.plan.insert(plan);

        let execution = self
            .executor
            .run(&self.generator, &self.prompts, question, plan)?;
        let execution = record.execution.insert(execution);

        let verdict = self
            .verifier
            .run(&self.generator, &self.prompts, question, execution)?;
        record.verdict = Some(verdict);
        Ok(())
    }
}

/// Solve `question` with a fresh [`Solver`] around `generator`.
pub fn solve<G: Generator>(generator: G, question: &str, max_retries: u32) -> Result<FinalResult> {
    Solver::new(generator)?.solve(question, max_retries)
}

/// Map a recoverable stage error to the failed check recorded for it.
fn failure_check(err: &anyhow::Error, stage: &str) -> Option<CheckEntry> {
    if let Some(generation) = err.downcast_ref::<GenerationError>() {
        return Some(CheckEntry::failed(
            GENERATION_CHECK_NAME,
            format!("{stage} call failed: {generation}"),
        ));
    }
    if let Some(malformed) = err.downcast_ref::<MalformedResponseError>() {
        return Some(CheckEntry::failed(
            malformed.stage.check_name(),
            malformed.to_string(),
        ));
    }
    None
}
