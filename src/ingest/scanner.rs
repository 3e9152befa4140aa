//! Line scanner for triple dumps (N-Triples style or whitespace separated).

use regex::Regex;

use crate::index::FIELD_TYPE;

/// One scanned `(subject, predicate, object)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// Turns dump lines into index rows.
///
/// IRIs keep only their local name, language-tagged literals become
/// `text @lang`, the terminal `.` is dropped and everything after the
/// predicate is joined into the object.
#[derive(Debug, Clone)]
pub struct TripleScanner {
    token: Regex,
    max_object_len: usize,
}

impl TripleScanner {
    pub fn new(max_object_len: usize) -> Self {
        // IRI | literal with optional @lang or ^^<datatype> | bare token
        let token = Regex::new(r#"<([^>]*)>|"((?:[^"\\]|\\.)*)"(?:@([A-Za-z][A-Za-z0-9-]*)|\^\^<[^>]*>)?|(\S+)"#)
            .expect("Invalid regex pattern");
        Self { token, max_object_len }
    }

    /// Scan one line; `None` for blank, comment or short lines.
    pub fn scan_line(&self, line: &str) -> Option<Triple> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut parts: Vec<String> = Vec::new();
        for cap in self.token.captures_iter(line) {
            if let Some(iri) = cap.get(1) {
                parts.push(local_name(iri.as_str()).to_string());
            } else if let Some(text) = cap.get(2) {
                let text = text.as_str().replace("\\\"", "\"");
                match cap.get(3) {
                    Some(lang) => parts.push(format!("{} @{}", text.trim(), lang.as_str())),
                    None => parts.push(text.trim().to_string()),
                }
            } else if let Some(bare) = cap.get(4) {
                let bare = bare.as_str();
                if bare == "." {
                    continue;
                }
                parts.push(local_name(bare).to_string());
            }
        }
        parts.retain(|p| !p.is_empty());
        if parts.len() < 3 {
            return None;
        }

        let mut rest = parts.split_off(2);
        if let Some(last) = rest.last_mut() {
            if last.len() > 1 && last.ends_with('.') && !last.ends_with("..") {
                last.pop();
            }
        }
        let predicate = parts.pop()?;
        let subject = parts.pop()?;

        let mut object = String::new();
        for part in rest {
            if object.len() >= self.max_object_len {
                break;
            }
            if !object.is_empty() {
                object.push(' ');
            }
            object.push_str(&part);
        }

        if predicate == FIELD_TYPE {
            object = reduce_type(&object);
        }

        Some(Triple {
            subject,
            predicate,
            object,
        })
    }
}

/// Text after the last `/` or `#`.
fn local_name(value: &str) -> &str {
    match value.rfind(|c: char| c == '/' || c == '#') {
        Some(pos) => &value[pos + 1..],
        None => value,
    }
}

/// Dots and underscores become spaces and only the last two words are kept:
/// `film.film` → `film film`.
pub fn reduce_type(value: &str) -> String {
    let spaced = value.replace(|c: char| c == '.' || c == '_', " ");
    let words: Vec<&str> = spaced.split_whitespace().collect();
    let start = words.len().saturating_sub(2);
    words[start..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> TripleScanner {
        TripleScanner::new(512)
    }

    #[test]
    fn test_ntriples_iri_line() {
        let t = scanner()
            .scan_line("<http://rdf.freebase.com/ns/m.0inc1> <http://rdf.freebase.com/ns/film.film.genre> <http://rdf.freebase.com/ns/m.0sci1> .")
            .unwrap();
        assert_eq!(t.subject, "m.0inc1");
        assert_eq!(t.predicate, "film.film.genre");
        assert_eq!(t.object, "m.0sci1");
    }

    #[test]
    fn test_language_literal() {
        let t = scanner()
            .scan_line(r#"<http://rdf.freebase.com/ns/m.0inc1> <http://www.w3.org/2000/01/rdf-schema#label> "Inception"@en ."#)
            .unwrap();
        assert_eq!(t.predicate, "label");
        assert_eq!(t.object, "Inception @en");
    }

    #[test]
    fn test_typed_literal_keeps_text() {
        let t = scanner()
            .scan_line(r#"<m.0oba1> <date_of_birth> "1961-08-04"^^<http://www.w3.org/2001/XMLSchema#date> ."#)
            .unwrap();
        assert_eq!(t.object, "1961-08-04");
    }

    #[test]
    fn test_type_objects_are_reduced() {
        let t = scanner()
            .scan_line("<m.0inc1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://rdf.freebase.com/ns/film.film> .")
            .unwrap();
        assert_eq!(t.predicate, "type");
        assert_eq!(t.object, "film film");
    }

    #[test]
    fn test_whitespace_separated_line() {
        let t = scanner().scan_line("m.0inc1\tlabel\tInception @en").unwrap();
        assert_eq!(t.subject, "m.0inc1");
        assert_eq!(t.object, "Inception @en");

        let t = scanner().scan_line("m.0oba1 type people.person.").unwrap();
        assert_eq!(t.object, "people person");
    }

    #[test]
    fn test_short_and_blank_lines() {
        assert!(scanner().scan_line("").is_none());
        assert!(scanner().scan_line("   ").is_none());
        assert!(scanner().scan_line("# comment").is_none());
        assert!(scanner().scan_line("<m.0inc1> <label> .").is_none());
    }

    #[test]
    fn test_object_cap() {
        let scanner = TripleScanner::new(8);
        let t = scanner.scan_line("m.0a1 common.topic.description one two three four").unwrap();
        assert_eq!(t.object, "one two three");
    }

    #[test]
    fn test_reduce_type() {
        assert_eq!(reduce_type("film.film"), "film film");
        assert_eq!(reduce_type("people.person"), "people person");
        assert_eq!(reduce_type("location.citytown"), "location citytown");
        assert_eq!(reduce_type("base.type_ontology.animate"), "ontology animate");
        assert_eq!(reduce_type("film"), "film");
    }
}
