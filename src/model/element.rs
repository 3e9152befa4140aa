use std::cmp::Ordering;
use std::fmt;

use crate::error::{QaError, Result};

/// The two kinds of graph node an answer can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// Concrete entity (film, person, place), id carries a digit
    Topic,
    /// Class of entities, e.g. `film film` or `people person`
    Type,
}

/// A validated graph node.
///
/// Ordering is lexicographic on the id; the kind only breaks ties so that
/// `Ord` stays consistent with `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    id: String,
    kind: ElementKind,
}

impl Element {
    /// Build an element of the given kind, applying that kind's validity rule.
    pub fn new(kind: ElementKind, id: impl Into<String>) -> Result<Self> {
        match kind {
            ElementKind::Topic => Self::topic(id),
            ElementKind::Type => Self::type_(id),
        }
    }

    /// A topic id must contain at least one digit.
    pub fn topic(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !id.chars().any(|c| c.is_ascii_digit()) {
            return Err(QaError::InvalidIdentifier(format!("'{}' is not a topic", id)));
        }
        Ok(Self { id, kind: ElementKind::Topic })
    }

    /// A type id must be at least two characters long and its second
    /// character must not be a dot.
    pub fn type_(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        match id.chars().nth(1) {
            Some(second) if second != '.' => Ok(Self { id, kind: ElementKind::Type }),
            _ => Err(QaError::InvalidIdentifier(format!("'{}' is not a type", id))),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_topic(&self) -> bool {
        self.kind == ElementKind::Topic
    }
}

impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id).then(self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_requires_digit() {
        assert!(Element::topic("m.0abc1").is_ok());
        assert!(Element::topic("7").is_ok());
        assert!(matches!(Element::topic("Inception"), Err(QaError::InvalidIdentifier(_))));
        assert!(matches!(Element::topic(""), Err(QaError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_type_rules() {
        assert!(Element::type_("film film").is_ok());
        assert!(Element::type_("ab").is_ok());
        assert!(Element::type_("film.performance.actor").is_ok());
        assert!(matches!(Element::type_("m.0abc"), Err(QaError::InvalidIdentifier(_))));
        assert!(matches!(Element::type_("f"), Err(QaError::InvalidIdentifier(_))));
        assert!(matches!(Element::type_(""), Err(QaError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_type_rule_counts_characters_not_bytes() {
        // 'é' is two bytes; the second character is still '.'
        assert!(Element::type_("é.x").is_err());
        assert!(Element::type_("éé").is_ok());
    }

    #[test]
    fn test_topic_validity_matches_digit_presence() {
        for id in ["a", "abc", "m.x", "1", "x9y", "m.0f8l9c", "no digits here", "٣"] {
            let has_digit = id.chars().any(|c| c.is_ascii_digit());
            assert_eq!(Element::topic(id).is_ok(), has_digit, "id {:?}", id);
        }
    }

    #[test]
    fn test_new_selects_rule_by_kind() {
        assert!(Element::new(ElementKind::Topic, "m.01").unwrap().is_topic());
        assert_eq!(
            Element::new(ElementKind::Type, "film film").unwrap().kind(),
            ElementKind::Type
        );
        assert!(Element::new(ElementKind::Topic, "film film").is_err());
    }

    #[test]
    fn test_order_is_lexicographic_on_id() {
        let a = Element::topic("m.01a").unwrap();
        let b = Element::topic("m.01b").unwrap();
        let t = Element::type_("m1").unwrap();
        assert!(a < b);
        assert!(b < t);
        let mut v = vec![t.clone(), b.clone(), a.clone()];
        v.sort();
        assert_eq!(v, vec![a, b, t]);
    }

    #[test]
    fn test_equality_includes_kind() {
        let topic = Element::topic("x1").unwrap();
        let ty = Element::type_("x1").unwrap();
        assert_ne!(topic, ty);
        assert_eq!(topic, Element::topic("x1").unwrap());
    }
}
