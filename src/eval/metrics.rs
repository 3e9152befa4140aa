//! Evaluation metrics: overall and per-category accuracy.

use std::collections::BTreeMap;

/// Proportion of passed cases. Returns 0.0 for an empty run.
pub fn accuracy(outcomes: &[bool]) -> f32 {
    if outcomes.is_empty() {
        return 0.0;
    }
    outcomes.iter().filter(|passed| **passed).count() as f32 / outcomes.len() as f32
}

/// Pass counts of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryScore {
    pub passed: usize,
    pub total: usize,
}

impl CategoryScore {
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f32 / self.total as f32
        }
    }
}

/// Group `(category, passed)` outcomes by category, sorted by name.
pub fn category_accuracy<'a>(outcomes: impl IntoIterator<Item = (&'a str, bool)>) -> BTreeMap<String, CategoryScore> {
    let mut scores: BTreeMap<String, CategoryScore> = BTreeMap::new();
    for (category, passed) in outcomes {
        let score = scores.entry(category.to_string()).or_default();
        score.total += 1;
        if passed {
            score.passed += 1;
        }
    }
    scores
}
