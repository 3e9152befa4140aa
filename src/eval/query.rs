//! Eval case type and answer matching for the evaluation framework.

use serde::Deserialize;
use std::path::Path;

/// Single evaluation case: a question and the exact reply expected for it.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalQuery {
    /// Question text, as a client would send it.
    pub question: String,
    /// Index to ask; the configured default index when absent.
    #[serde(default)]
    pub index: Option<String>,
    /// Expected reply: the formatted answer or a fixed failure message.
    pub expected: String,
    /// Category for reporting (e.g. type_of, birthplace, starring, quantity).
    #[serde(default)]
    pub category: Option<String>,
}

impl EvalQuery {
    /// Whether `reply` matches the expected text, ignoring trailing whitespace per line.
    pub fn is_correct(&self, reply: &str) -> bool {
        normalize(reply) == normalize(&self.expected)
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or("uncategorized")
    }
}

fn normalize(text: &str) -> Vec<&str> {
    text.trim().lines().map(str::trim_end).collect()
}

/// Read a JSON array of cases.
pub fn load_cases(path: &Path) -> anyhow::Result<Vec<EvalQuery>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let cases: Vec<EvalQuery> =
        serde_json::from_str(&json).map_err(|e| anyhow::anyhow!("Invalid eval cases JSON: {}", e))?;
    Ok(cases)
}
