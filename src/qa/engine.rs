use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};

use super::catalog::PredicateCatalog;
use super::format::format_answer;
use super::template::{classify, normalize, PersonFilter, Template};
use crate::error::{QaError, Result};
use crate::index::{TripleIndex, FIELD_TYPE};
use crate::model::{Direction, Element, ElementKind, Language, Query, ResultMap};

/// Predicate linking a person to their birthplace.
pub const FIELD_BIRTHPLACE: &str = "people.person.place_of_birth";

/// Question answering engine over a triple index.
///
/// The engine keeps no per-question state: every call classifies, resolves
/// and formats independently, so one engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Engine<I> {
    index: I,
    catalog: Arc<PredicateCatalog>,
    language: Language,
}

impl<I: TripleIndex> Engine<I> {
    /// Engine with the seeded catalog and the default language.
    pub fn new(index: I) -> Self {
        Self::with_catalog(index, Arc::new(PredicateCatalog::seeded()), Language::default())
    }

    pub fn with_catalog(index: I, catalog: Arc<PredicateCatalog>, language: Language) -> Self {
        Self {
            index,
            catalog,
            language,
        }
    }

    /// Add or overwrite a catalog entry for this engine.
    pub fn register_predicate(&mut self, term: &str, predicate: &str, collection: Option<&str>) {
        let catalog = Arc::make_mut(&mut self.catalog);
        match collection {
            Some(collection) => catalog.register_with_collection(term, predicate, collection),
            None => catalog.register(term, predicate),
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn catalog(&self) -> &PredicateCatalog {
        &self.catalog
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Answer a question as display text in the engine's language.
    pub fn answer(&self, question: &str) -> Result<String> {
        self.answer_in(question, &self.language)
    }

    pub fn answer_in(&self, question: &str, language: &Language) -> Result<String> {
        let results = self.query_in(question, language)?;
        format_answer(&self.index, &results, language)
    }

    /// Resolve a question to its raw result map.
    pub fn query(&self, question: &str) -> Result<ResultMap> {
        self.query_in(question, &self.language)
    }

    pub fn query_in(&self, question: &str, language: &Language) -> Result<ResultMap> {
        let template = classify(&normalize(question))?;
        debug!("Classified {:?} as {:?}", question, template);
        self.resolve(template, language)
    }

    fn resolve(&self, template: Template, language: &Language) -> Result<ResultMap> {
        match template {
            Template::TypeOf { anchor, filter } => {
                let candidates = self.candidates(&anchor, language)?;
                self.collect(&candidates, ElementKind::Type, FIELD_TYPE, filter)
            }
            Template::Birthplace { anchor } => {
                let candidates = self.candidates(&anchor, language)?;
                self.collect(&candidates, ElementKind::Topic, FIELD_BIRTHPLACE, PersonFilter::PersonsOnly)
            }
            Template::Property { term, anchor } => {
                let predicate = self.catalog.predicate(&term)?;
                let candidates = self.candidates(&anchor, language)?;
                self.collect(&candidates, ElementKind::Topic, predicate, PersonFilter::NonPersonsOnly)
            }
            Template::Starring { term, anchor } => self.resolve_starring(&term, &anchor, language),
            Template::Quantity { count, term } => self.resolve_quantity(count, &term),
        }
    }

    fn candidates(&self, label: &str, language: &Language) -> Result<BTreeSet<Element>> {
        let candidates = self.index.lookup_topics_by_label_or_type(label, language)?;
        debug!("{} candidate(s) for {:?}", candidates.len(), label);
        Ok(candidates)
    }

    /// Run `field` on every accepted candidate and key the results by candidate.
    ///
    /// Candidates without a value are skipped. An empty outcome is
    /// `WrongInputType` when the filter rejected something, `NotFound` otherwise.
    fn collect(
        &self,
        candidates: &BTreeSet<Element>,
        kind: ElementKind,
        field: &str,
        filter: PersonFilter,
    ) -> Result<ResultMap> {
        let mut results = ResultMap::new();
        let mut rejected = false;
        for candidate in candidates {
            if filter != PersonFilter::Any && !filter.accepts(self.index.is_person(candidate)?) {
                rejected = true;
                continue;
            }
            match self.index.execute(&Query::new(kind, field, candidate, Direction::Subject)) {
                Ok(values) => {
                    results.insert(candidate.clone(), values);
                }
                Err(QaError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }

        if !results.is_empty() {
            Ok(results)
        } else if rejected {
            Err(QaError::WrongInputType(filter.rejection().to_string()))
        } else {
            Err(QaError::NotFound)
        }
    }

    fn resolve_starring(&self, term: &str, anchor: &str, language: &Language) -> Result<ResultMap> {
        let entry = self.catalog.lookup(term)?;
        let candidates = self.candidates(anchor, language)?;
        match self.collect(&candidates, ElementKind::Topic, &entry.predicate, PersonFilter::Any) {
            Err(QaError::NotFound) => {}
            other => return other,
        }

        let Some(collection) = entry.collection.as_deref() else {
            return Err(QaError::NotFound);
        };
        debug!("No direct {} for {:?}, expanding through {}", entry.predicate, anchor, collection);
        self.expand_collection(&candidates, collection, &entry.predicate)
    }

    /// Reach `predicate` through the intermediate nodes of `collection`.
    ///
    /// Results are keyed by intermediate node. Lookups that find nothing are
    /// skipped; other per-node failures are logged and only surface when
    /// nothing at all could be resolved.
    fn expand_collection(&self, anchors: &BTreeSet<Element>, collection: &str, predicate: &str) -> Result<ResultMap> {
        let mut failures: Vec<QaError> = Vec::new();

        let mut nodes = BTreeSet::new();
        for anchor in anchors {
            match self.index.execute(&Query::new(ElementKind::Topic, collection, anchor, Direction::Subject)) {
                Ok(found) => nodes.extend(found),
                Err(QaError::NotFound) => {}
                Err(e) => failures.push(e),
            }
        }

        let mut results = ResultMap::new();
        for node in nodes {
            match self.index.execute(&Query::new(ElementKind::Topic, predicate, &node, Direction::Subject)) {
                Ok(values) => {
                    results.insert(node, values);
                }
                Err(QaError::NotFound) => {}
                Err(e) => failures.push(e),
            }
        }

        if let Some(first) = failures.first() {
            warn!("{} lookup(s) failed while expanding {}: {}", failures.len(), collection, first);
        }
        if results.is_empty() {
            return Err(failures.into_iter().next().unwrap_or(QaError::NotFound));
        }
        Ok(results)
    }

    fn resolve_quantity(&self, count: usize, term: &str) -> Result<ResultMap> {
        let type_name = self.quantity_predicate(term, count)?;
        let key = Element::type_(type_name)?;
        let topics = self
            .index
            .execute(&Query::new(ElementKind::Topic, FIELD_TYPE, &key, Direction::Object))?;

        let mut results = ResultMap::new();
        results.insert(key, topics);
        results.truncate_values(count);
        Ok(results)
    }

    /// Catalog predicate for a quantity term.
    ///
    /// A term that is unknown only in the requested number ("3 actor" when
    /// "actors" is registered) is a grammar mistake, not missing data.
    fn quantity_predicate(&self, term: &str, count: usize) -> Result<&str> {
        if self.catalog.contains(term) {
            return self.catalog.predicate(term);
        }
        let (corrected, message) = if count > 1 {
            (Some(format!("{}s", term)), "Type plural form!")
        } else {
            (term.strip_suffix('s').map(str::to_string), "Type singular form!")
        };
        if corrected.map_or(false, |c| self.catalog.contains(&c)) {
            return Err(QaError::GrammarMismatch(message.to_string()));
        }
        Err(QaError::UnknownPredicateTerm(term.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    fn film_index() -> MemoryIndex {
        MemoryIndex::from_triples([
            ("m.0inc1", "label", "Inception @en"),
            ("m.0inc1", "label", "Origine @it"),
            ("m.0inc1", "type", "film film"),
            ("m.0inc1", "film.film.genre", "m.0sci1"),
            ("m.0inc1", "film.film.genre", "m.0thr1"),
            ("m.0inc1", "film.film.directed_by", "m.0nol1"),
            ("m.0inc1", "film.film.starring", "m.0prf1"),
            ("m.0inc1", "film.film.starring", "m.0prf2"),
            ("m.0inc1", "film.film.starring", "m.0prf3"),
            ("m.0prf1", "film.performance.actor", "m.0dic1"),
            ("m.0prf2", "film.performance.actor", "m.0gor1"),
            ("m.0mem1", "label", "Memento @en"),
            ("m.0mem1", "type", "film film"),
            ("m.0mem1", "film.performance.actor", "m.0pea1"),
            ("m.0bam1", "label", "Bambi @en"),
            ("m.0bam1", "type", "film film"),
            ("m.0bam1", "people.person.place_of_birth", "m.0hnl1"),
            ("m.0sci1", "label", "Science Fiction @en"),
            ("m.0sci1", "label", "Fantascienza @it"),
            ("m.0thr1", "label", "Thriller @en"),
            ("m.0nol1", "label", "Christopher Nolan @en"),
            ("m.0nol1", "type", "people person"),
            ("m.0dic1", "label", "Leonardo DiCaprio @en"),
            ("m.0dic1", "type", "people person"),
            ("m.0dic1", "type", "film.performance.actor"),
            ("m.0gor1", "label", "Joseph Gordon-Levitt @en"),
            ("m.0gor1", "type", "people person"),
            ("m.0gor1", "type", "film.performance.actor"),
            ("m.0pea1", "label", "Guy Pearce @en"),
            ("m.0oba1", "label", "Barack Obama @en"),
            ("m.0oba1", "type", "people person"),
            ("m.0oba1", "people.person.place_of_birth", "m.0hnl1"),
            ("m.0hnl1", "label", "Honolulu @en"),
            ("m.0hnl1", "type", "location citytown"),
            ("m.0rom1", "type", "location citytown"),
            ("m.0rom1", "label", "Rome @en"),
        ])
    }

    fn engine() -> Engine<MemoryIndex> {
        Engine::new(film_index())
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine<MemoryIndex>>();
        assert_send_sync::<Engine<Arc<MemoryIndex>>>();
    }

    #[test]
    fn test_what_is() {
        assert_eq!(engine().answer("What is Inception ?").unwrap(), "m.0inc1: film film");
    }

    #[test]
    fn test_who_is_person() {
        assert_eq!(engine().answer("Who is Barack Obama ?").unwrap(), "m.0oba1: people person");
    }

    #[test]
    fn test_person_filter_rejections() {
        let engine = engine();
        assert!(matches!(engine.answer("What is Barack Obama"), Err(QaError::WrongInputType(_))));
        assert!(matches!(engine.answer("Who is Inception"), Err(QaError::WrongInputType(_))));
    }

    #[test]
    fn test_unknown_anchor() {
        assert!(matches!(engine().answer("What is Tenet ?"), Err(QaError::NotFound)));
    }

    #[test]
    fn test_birthplace() {
        assert_eq!(
            engine().answer("Where was Barack Obama born ?").unwrap(),
            "m.0oba1: Honolulu"
        );
    }

    #[test]
    fn test_birthplace_requires_person() {
        assert!(matches!(
            engine().answer("Where was Bambi born ?"),
            Err(QaError::WrongInputType(_))
        ));
    }

    #[test]
    fn test_property_question() {
        let engine = engine();
        assert_eq!(
            engine.answer("Who has directed Inception ?").unwrap(),
            "m.0inc1: Christopher Nolan"
        );
        assert_eq!(
            engine.answer("Which has genre Inception").unwrap(),
            "m.0inc1: Science Fiction, Thriller"
        );
        assert!(matches!(
            engine.answer("Who has edited Inception"),
            Err(QaError::UnknownPredicateTerm(_))
        ));
        assert!(matches!(engine.answer("Who has written Inception"), Err(QaError::NotFound)));
    }

    #[test]
    fn test_property_in_other_language() {
        let italian = Language::new("it");
        assert_eq!(
            engine().answer_in("Which has genre Origine", &italian).unwrap(),
            "m.0inc1: Fantascienza"
        );
    }

    #[test]
    fn test_starring_direct() {
        assert_eq!(
            engine().answer("Tell me the actors of Memento").unwrap(),
            "m.0mem1: Guy Pearce"
        );
    }

    #[test]
    fn test_starring_falls_back_to_collection() {
        let results = engine().query("Tell me the actors of Inception").unwrap();
        let keys: Vec<&str> = results.anchors().map(Element::id).collect();
        // m.0prf3 has no actor and is skipped
        assert_eq!(keys, vec!["m.0prf1", "m.0prf2"]);

        assert_eq!(
            engine().answer("Tell me the actors of Inception").unwrap(),
            "m.0prf1: Leonardo DiCaprio\nm.0prf2: Joseph Gordon Levitt"
        );
    }

    #[test]
    fn test_starring_without_collection() {
        let mut engine = engine();
        engine.register_predicate("actors", "film.performance.actor", None);
        assert!(matches!(
            engine.answer("Tell me the actors of Inception"),
            Err(QaError::NotFound)
        ));
    }

    #[test]
    fn test_register_predicate_is_local() {
        let catalog = Arc::new(PredicateCatalog::seeded());
        let mut engine = Engine::with_catalog(film_index(), catalog.clone(), Language::default());
        engine.register_predicate("born in", FIELD_BIRTHPLACE, None);
        assert!(engine.catalog().contains("born in"));
        assert!(!catalog.contains("born in"));
    }

    #[test]
    fn test_quantity() {
        let results = engine().query("Tell 2 actors of Inception").unwrap();
        assert_eq!(results.len(), 1);
        let key = results.anchors().next().unwrap();
        assert_eq!(key.kind(), ElementKind::Type);
        assert_eq!(key.id(), "film.performance.actor");

        assert_eq!(
            engine().answer("Tell me 1 city").unwrap(),
            "location citytown: Honolulu"
        );
        assert_eq!(
            engine().answer("Tell me 5 cities").unwrap(),
            "location citytown: Honolulu, Rome"
        );
    }

    #[test]
    fn test_quantity_truncates_in_order() {
        let results = engine().query("Tell me 1 movie").unwrap();
        let values = results.get(&Element::type_("film film").unwrap()).unwrap();
        let ids: Vec<&str> = values.iter().map(Element::id).collect();
        assert_eq!(ids, vec!["m.0bam1"]);
    }

    #[test]
    fn test_quantity_grammar() {
        let engine = engine();
        assert!(matches!(
            engine.answer("Tell 3 actor of Inception"),
            Err(QaError::GrammarMismatch(_))
        ));
        assert!(matches!(engine.answer("Tell me 2 city"), Err(QaError::GrammarMismatch(_))));
        assert!(matches!(engine.answer("Tell me 3 books"), Err(QaError::UnknownPredicateTerm(_))));
        assert!(matches!(engine.answer("Tell me 3 x"), Err(QaError::UnknownPredicateTerm(_))));
    }

    #[test]
    fn test_quantity_without_members() {
        let mut engine = engine();
        engine.register_predicate("books", "book book", None);
        assert!(matches!(engine.answer("Tell me 2 books"), Err(QaError::NotFound)));
    }

    #[test]
    fn test_invalid_identifier_propagates() {
        let mut index = film_index();
        index.insert("m.0inc1", "film.film.produced_by", "nobody");
        let engine = Engine::new(index);
        assert!(matches!(
            engine.answer("Who has produced Inception"),
            Err(QaError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_untagged_label_is_language_error() {
        let mut index = film_index();
        index.insert("m.0inc1", "film.film.produced_by", "m.0emm1");
        index.insert("m.0emm1", "label", "Emma Thomas");
        let engine = Engine::new(index);
        assert!(matches!(
            engine.answer("Who has produced Inception"),
            Err(QaError::LanguageFormat(_))
        ));
    }

    #[test]
    fn test_classification_errors_pass_through() {
        let engine = engine();
        assert!(matches!(engine.answer(""), Err(QaError::MalformedQuestion)));
        assert!(matches!(engine.answer("Hello there friend"), Err(QaError::UnrecognizedQuestionForm)));
        assert!(matches!(engine.answer("Tell me many movies"), Err(QaError::NonNumericQuantity(_))));
    }
}
