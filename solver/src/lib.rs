//! Closed-loop word-problem solver.
//!
//! A question goes through three roles backed by one text-generation
//! service: a planner writes a numbered plan, an executor follows it and
//! returns a structured answer, and a verifier judges that answer. Rejected
//! or broken attempts are retried from scratch up to a fixed bound.
//!
//! - **[`core`]**: Pure data model and response parsing. No I/O.
//! - **[`io`]**: Generation client, prompts, config and attempt artifacts.
//! - **[`agents`]**: One wrapper per role.
//! - **[`solve`]**: The controller tying the roles into a bounded loop.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod solve;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::types::{FinalResult, SolveStatus};
pub use crate::solve::{AttemptRecord, DEFAULT_MAX_RETRIES, Solver, solve};
