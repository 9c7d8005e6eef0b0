//! JSON-lines scenario files
//!
//! One step per line, ordered by `at_ms`:
//!
//! ```text
//! {"at_ms": 0, "inbound": {"type": "component", "componentId": "deathscreen", "action": "show"}}
//! {"at_ms": 100, "key_down": "e"}
//! {"at_ms": 3000, "key_up": "e"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid step")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: at_ms {at_ms} is earlier than the previous step ({previous})")]
    OutOfOrder { line: usize, at_ms: u64, previous: u64 },
}

/// What happens at a step
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepInput {
    /// A host message, delivered as if posted to the window
    Inbound(Value),
    KeyDown(String),
    KeyUp(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(flatten)]
    pub input: StepInput,
}

pub fn parse(source: &str) -> Result<Vec<Step>, ScenarioError> {
    let mut steps: Vec<Step> = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let step: Step =
            serde_json::from_str(raw).map_err(|source| ScenarioError::Parse { line, source })?;
        if let Some(previous) = steps.last()
            && step.at_ms < previous.at_ms
        {
            return Err(ScenarioError::OutOfOrder {
                line,
                at_ms: step.at_ms,
                previous: previous.at_ms,
            });
        }
        steps.push(step);
    }
    Ok(steps)
}

pub fn load(path: &Path) -> Result<Vec<Step>, ScenarioError> {
    let source = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&source)
}
