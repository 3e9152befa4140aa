//! Evaluation framework: question/answer case sets, accuracy metrics and CLI support.

pub mod metrics;
pub mod query;

pub use metrics::{accuracy, category_accuracy, CategoryScore};
pub use query::{load_cases, EvalQuery};
