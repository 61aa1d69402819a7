//! Suite file parsing and validation.
//!
//! Suites are TOML files listing questions to send through the solver.
//! See `eval/suites/` for examples.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

/// A parsed suite file: metadata, solver overrides and questions.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SuiteFile {
    pub suite: SuiteMeta,
    #[serde(default)]
    pub config: SuiteConfig,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SuiteMeta {
    /// Unique identifier (slug format: `[a-z0-9_-]+`).
    pub id: String,
    #[serde(default)]
    pub description: String,
}

/// Solver configuration overrides for the suite.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SuiteConfig {
    pub max_retries: Option<u32>,
    pub model: Option<String>,
}

impl SuiteFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read suite {}", path.display()))?;
        let suite: SuiteFile = toml::from_str(&contents)
            .with_context(|| format!("parse suite {}", path.display()))?;
        suite
            .validate()
            .with_context(|| format!("validate suite {}", path.display()))?;
        Ok(suite)
    }

    #[cfg(test)]
    pub fn parse_str(contents: &str) -> Result<Self> {
        let suite: SuiteFile = toml::from_str(contents).context("parse suite")?;
        suite.validate()?;
        Ok(suite)
    }

    fn validate(&self) -> Result<()> {
        validate_suite_id(&self.suite.id)?;
        if self.questions.is_empty() {
            bail!("questions must be a non-empty array");
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.trim().is_empty() {
                bail!("questions[{}] must be non-empty", index);
            }
        }
        if let Some(model) = &self.config.model
            && model.trim().is_empty()
        {
            bail!("config.model must be non-empty when set");
        }
        Ok(())
    }
}

/// Discover and load all suite files from a directory, sorted by id.
pub fn discover_suites(dir: &Path) -> Result<Vec<SuiteFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut suites = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read suites dir {}", dir.display()))? {
        let entry = entry.context("read suite entry")?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        suites.push(SuiteFile::load(&path)?);
    }
    suites.sort_by(|left, right| left.suite.id.cmp(&right.suite.id));
    for pair in suites.windows(2) {
        if pair[0].suite.id == pair[1].suite.id {
            return Err(anyhow!("duplicate suite.id {}", pair[0].suite.id));
        }
    }
    Ok(suites)
}

pub fn validate_suite_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("suite.id must be non-empty");
    }
    if !id
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
    {
        bail!("suite.id must use [a-z0-9_-] only");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_suite() {
        let input = r#"
questions = ["What is 2 + 2?", "What is 3 + 3?"]

[suite]
id = "smoke"
description = "two sums"

[config]
max_retries = 2
"#;
        let suite = SuiteFile::parse_str(input).expect("suite parses");
        assert_eq!(suite.suite.id, "smoke");
        assert_eq!(suite.config.max_retries, Some(2));
        assert_eq!(suite.questions.len(), 2);
    }

    #[test]
    fn rejects_invalid_id() {
        let input = r#"
questions = ["q"]

[suite]
id = "../escape"
"#;
        let err = SuiteFile::parse_str(input).expect_err("invalid id");
        assert!(err.to_string().contains("suite.id"));
    }

    #[test]
    fn rejects_blank_question() {
        let input = r#"
questions = ["ok", "   "]

[suite]
id = "blank"
"#;
        let err = SuiteFile::parse_str(input).expect_err("blank question");
        assert!(err.to_string().contains("questions[1]"));
    }

    #[test]
    fn rejects_empty_question_list() {
        let input = r#"
questions = []

[suite]
id = "empty"
"#;
        let _err = SuiteFile::parse_str(input).expect_err("no questions");
    }

    #[test]
    fn discovers_shipped_suites() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("suites");
        let suites = discover_suites(&dir).expect("discover");
        let ids: Vec<&str> = suites.iter().map(|suite| suite.suite.id.as_str()).collect();
        assert_eq!(ids, vec!["easy", "tricky"]);
    }

    #[test]
    fn discover_rejects_duplicate_ids() {
        let temp = tempfile::tempdir().expect("tempdir");
        let body = "questions = [\"q\"]\n[suite]\nid = \"dup\"\n";
        fs::write(temp.path().join("a.toml"), body).expect("a");
        fs::write(temp.path().join("b.toml"), body).expect("b");

        let err = discover_suites(temp.path()).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate suite.id dup"));
    }
}
