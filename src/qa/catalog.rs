use std::collections::BTreeMap;

use crate::error::{QaError, Result};

/// Canonical predicate for a term, plus the optional collection predicate
/// used to reach it through an intermediate node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateEntry {
    pub predicate: String,
    pub collection: Option<String>,
}

/// Natural-language term → predicate mapping.
///
/// Entries are only ever added or overwritten, never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateCatalog {
    entries: BTreeMap<String, PredicateEntry>,
}

impl PredicateCatalog {
    /// Catalog without any entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Catalog with the built-in film/person vocabulary.
    pub fn seeded() -> Self {
        let mut catalog = Self::empty();
        catalog.register("description", "common.topic.description");
        catalog.register("genre", "film.film.genre");
        catalog.register("directed", "film.film.directed_by");
        catalog.register("written", "film.film.written_by");
        catalog.register("produced", "film.film.produced_by");
        catalog.register("city", "location citytown");
        catalog.register("cities", "location citytown");
        catalog.register("movie", "film film");
        catalog.register("movies", "film film");
        catalog.register_with_collection("actors", "film.performance.actor", "film.film.starring");
        catalog.register("birth date", "date_of_birth");
        catalog
    }

    /// Map `term` to `predicate`, replacing any previous entry.
    pub fn register(&mut self, term: impl Into<String>, predicate: impl Into<String>) {
        self.entries.insert(
            term.into(),
            PredicateEntry {
                predicate: predicate.into(),
                collection: None,
            },
        );
    }

    /// Map `term` to `predicate` reachable through `collection` nodes.
    pub fn register_with_collection(
        &mut self,
        term: impl Into<String>,
        predicate: impl Into<String>,
        collection: impl Into<String>,
    ) {
        self.entries.insert(
            term.into(),
            PredicateEntry {
                predicate: predicate.into(),
                collection: Some(collection.into()),
            },
        );
    }

    pub fn lookup(&self, term: &str) -> Result<&PredicateEntry> {
        self.entries
            .get(term)
            .ok_or_else(|| QaError::UnknownPredicateTerm(term.to_string()))
    }

    pub fn predicate(&self, term: &str) -> Result<&str> {
        self.lookup(term).map(|entry| entry.predicate.as_str())
    }

    pub fn collection(&self, term: &str) -> Option<&str> {
        self.entries.get(term).and_then(|entry| entry.collection.as_deref())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PredicateEntry)> {
        self.entries.iter().map(|(term, entry)| (term.as_str(), entry))
    }
}

impl Default for PredicateCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}
