//! Side-effecting boundaries: configuration, the generation service,
//! prompt rendering and attempt artifacts.

pub mod attempt_log;
pub mod config;
pub mod generation;
pub mod prompt;
