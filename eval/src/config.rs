//! Solver configuration merging.
//!
//! Applies suite-specific overrides on top of the loaded solver config.

use anyhow::Result;
use solver::io::config::SolverConfig;

use crate::suite::SuiteConfig;

pub fn apply_suite_config(mut base: SolverConfig, overrides: &SuiteConfig) -> Result<SolverConfig> {
    if let Some(max_retries) = overrides.max_retries {
        base.max_retries = max_retries;
    }
    if let Some(model) = &overrides.model {
        base.model = model.clone();
    }
    base.validate()?;
    Ok(base)
}
