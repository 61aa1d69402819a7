//! Stable exit codes for the solver CLI.

/// Command succeeded; for `solve`, the answer was verified.
pub const OK: i32 = 0;
/// Invalid input or config, or a runtime error that aborted the command.
pub const INVALID: i32 = 1;
/// `solver solve` ran to completion without a verified answer.
pub const FAILED: i32 = 2;
