//! Question answering: predicate catalog, template classification, the
//! resolution engine and answer formatting.
//!
//! A question flows through `template::normalize` and `template::classify`,
//! is executed by `Engine` against a `TripleIndex`, and the resulting
//! `ResultMap` is rendered by `format_answer`.

pub mod catalog;
pub mod engine;
pub mod format;
pub mod template;

pub use catalog::{PredicateCatalog, PredicateEntry};
pub use engine::Engine;
pub use format::format_answer;
pub use template::{classify, normalize, PersonFilter, Template};
