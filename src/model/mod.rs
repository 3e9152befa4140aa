//! Data model: validated node identities, language tags, query descriptors
//! and the per-question result map.

mod element;
mod language;
mod query;
mod result_map;

pub use element::{Element, ElementKind};
pub use language::{Language, DEFAULT_LANGUAGE};
pub use query::{Direction, Query};
pub use result_map::ResultMap;
