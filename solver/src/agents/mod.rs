//! Role agents: each renders its prompt, makes exactly one generation call
//! and turns the reply into the next stage's input.

pub mod executor;
pub mod planner;
pub mod verifier;

pub use executor::ExecutorAgent;
pub use planner::PlannerAgent;
pub use verifier::VerifierAgent;
