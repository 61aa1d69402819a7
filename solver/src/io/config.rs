//! Solver configuration stored in `solver.toml`, plus the credentials resolved
//! from the process environment once at startup.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `model` when set.
pub const MODEL_OVERRIDE_ENV: &str = "GEMINI_MODEL";

/// Solver configuration (TOML).
///
/// Missing fields fall back to defaults so an absent file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Model identifier passed to the generation service.
    pub model: String,

    /// Base URL of the Gemini REST API.
    pub base_url: String,

    /// Per-request timeout for generation calls.
    pub request_timeout_secs: u64,

    /// Retries after the first attempt when the verifier rejects a solution.
    pub max_retries: u32,

    /// Sampling temperature; the service default is used when unset.
    pub temperature: Option<f32>,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_secs: 60,
            max_retries: crate::solve::DEFAULT_MAX_RETRIES,
            temperature: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model must be non-empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(anyhow!("base_url must be non-empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(anyhow!("api_key_env must be non-empty"));
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(anyhow!("temperature must be within 0.0..=2.0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SolverConfig::default()`.
pub fn load_config(path: &Path) -> Result<SolverConfig> {
    if !path.exists() {
        let cfg = SolverConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SolverConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SolverConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

/// Everything the generation client needs, resolved once at startup.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ClientConfig {
    /// Resolve from the process environment.
    pub fn from_env(cfg: &SolverConfig) -> Result<Self> {
        Self::resolve(cfg, |name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` for environment variables.
    pub fn resolve<F>(cfg: &SolverConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        cfg.validate()?;
        let api_key = lookup(&cfg.api_key_env)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("{} is not set", cfg.api_key_env))?;
        let model = lookup(MODEL_OVERRIDE_ENV)
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| cfg.model.clone());

        Ok(Self {
            api_key,
            model,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(cfg.request_timeout_secs),
            temperature: cfg.temperature,
        })
    }
}
