//! Deterministic, pure logic shared by the solver.
//!
//! Core modules must be free of I/O side effects. They define the data
//! contract between stages and the parsing rules for generation output.

pub mod response;
pub mod types;
