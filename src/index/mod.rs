//! Triple index contract and its implementations.
//!
//! Every lookup is an exact-term match over one predicate. The derived
//! operations (`execute`, `is_person`, `labels`, `description`) are built on
//! the two required lookups so that any backing store gets them for free.

mod memory;
mod sqlite;

pub use memory::MemoryIndex;
pub use sqlite::{IndexState, SqliteIndex};

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{QaError, Result};
use crate::model::{Direction, Element, ElementKind, Language, Query};

/// Predicate holding an element's type names.
pub const FIELD_TYPE: &str = "type";
/// Predicate holding language-tagged display labels.
pub const FIELD_LABEL: &str = "label";
/// Predicate holding language-tagged descriptions.
pub const FIELD_DESCRIPTION: &str = "common.topic.description";
/// Reduced type name that marks a topic as a person.
pub const PERSON_TYPE: &str = "people person";

/// Read-only access to the persisted relation graph.
pub trait TripleIndex: Send + Sync {
    /// Values related to `anchor` through `field`.
    ///
    /// `Direction::Subject` returns the objects of `(anchor, field, ?)` with
    /// hyphens turned into spaces; `Direction::Object` returns the subjects of
    /// `(?, field, anchor)`. Fails `NotFound` when nothing matches.
    fn lookup_property(&self, field: &str, anchor: &str, direction: Direction) -> Result<BTreeSet<String>>;

    /// Topics labelled `term` in `language`, or failing that, topics of type `term`.
    fn lookup_topics_by_label_or_type(&self, term: &str, language: &Language) -> Result<BTreeSet<Element>>;

    /// Run a query descriptor and build result elements of its kind.
    fn execute(&self, query: &Query) -> Result<BTreeSet<Element>> {
        self.lookup_property(query.field(), query.anchor(), query.direction())?
            .into_iter()
            .map(|id| Element::new(query.result_kind(), id))
            .collect()
    }

    /// Whether the element's types include `people person`. Types never are.
    fn is_person(&self, element: &Element) -> Result<bool> {
        if !element.is_topic() {
            return Ok(false);
        }
        match self.lookup_property(FIELD_TYPE, element.id(), Direction::Subject) {
            Ok(types) => Ok(types.contains(PERSON_TYPE)),
            Err(QaError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Display labels of an element in `language`.
    ///
    /// A type is its own label; a topic needs at least one `label` property.
    fn labels(&self, element: &Element, language: &Language) -> Result<BTreeSet<String>> {
        match element.kind() {
            ElementKind::Type => Ok(BTreeSet::from([element.id().to_string()])),
            ElementKind::Topic => tagged_values(self, FIELD_LABEL, element, language),
        }
    }

    /// Description of a topic in `language`.
    fn description(&self, element: &Element, language: &Language) -> Result<String> {
        tagged_values(self, FIELD_DESCRIPTION, element, language)?
            .into_iter()
            .next_back()
            .ok_or(QaError::NotFound)
    }
}

/// Language-filtered values of a tagged property.
fn tagged_values<I: TripleIndex + ?Sized>(
    index: &I,
    field: &str,
    element: &Element,
    language: &Language,
) -> Result<BTreeSet<String>> {
    let raw = index.lookup_property(field, element.id(), Direction::Subject)?;
    let mut out = BTreeSet::new();
    for value in &raw {
        if let Some(text) = language.filter_label(value)? {
            out.insert(text);
        }
    }
    Ok(out)
}

impl<T: TripleIndex + ?Sized> TripleIndex for Arc<T> {
    fn lookup_property(&self, field: &str, anchor: &str, direction: Direction) -> Result<BTreeSet<String>> {
        (**self).lookup_property(field, anchor, direction)
    }

    fn lookup_topics_by_label_or_type(&self, term: &str, language: &Language) -> Result<BTreeSet<Element>> {
        (**self).lookup_topics_by_label_or_type(term, language)
    }
}

/// `NotFound` for an empty lookup, the set otherwise.
pub(crate) fn non_empty<T>(set: BTreeSet<T>) -> Result<BTreeSet<T>> {
    if set.is_empty() {
        Err(QaError::NotFound)
    } else {
        Ok(set)
    }
}

/// Subject-direction results are display values: hyphens read as spaces.
pub(crate) fn normalize_object(value: &str) -> String {
    value.replace('-', " ")
}
