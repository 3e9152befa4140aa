use std::collections::BTreeSet;

use super::{non_empty, normalize_object, TripleIndex, FIELD_LABEL, FIELD_TYPE};
use crate::error::Result;
use crate::model::{Direction, Element, Language};

/// Triple index held entirely in memory.
///
/// Used as the test double for the engine and for small fixture graphs.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    triples: BTreeSet<(String, String, String)>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples<I, S>(triples: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut index = Self::new();
        for (s, p, o) in triples {
            index.insert(s, p, o);
        }
        index
    }

    pub fn insert(&mut self, subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) {
        self.triples.insert((subject.into(), predicate.into(), object.into()));
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    fn subjects_where(&self, predicate: &str, object: &str) -> BTreeSet<String> {
        self.triples
            .iter()
            .filter(|(_, p, o)| p == predicate && o == object)
            .map(|(s, _, _)| s.clone())
            .collect()
    }
}

impl TripleIndex for MemoryIndex {
    fn lookup_property(&self, field: &str, anchor: &str, direction: Direction) -> Result<BTreeSet<String>> {
        let values = match direction {
            Direction::Subject => self
                .triples
                .iter()
                .filter(|(s, p, _)| p == field && s == anchor)
                .map(|(_, _, o)| normalize_object(o))
                .collect(),
            Direction::Object => self.subjects_where(field, anchor),
        };
        non_empty(values)
    }

    fn lookup_topics_by_label_or_type(&self, term: &str, language: &Language) -> Result<BTreeSet<Element>> {
        let mut subjects = self.subjects_where(FIELD_LABEL, &language.tagged(term));
        if subjects.is_empty() {
            subjects = self.subjects_where(FIELD_TYPE, term);
        }
        non_empty(subjects)?.into_iter().map(Element::topic).collect()
    }
}
