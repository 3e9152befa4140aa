use super::{Element, ElementKind};

/// Role the anchor plays in the matched triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Anchor is the subject; the lookup yields objects
    Subject,
    /// Anchor is the object; the lookup yields subjects
    Object,
}

/// One lookup against the triple index. Built fresh per lookup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    result_kind: ElementKind,
    field: String,
    anchor: String,
    direction: Direction,
}

impl Query {
    /// Query anchored on an element.
    pub fn new(result_kind: ElementKind, field: impl Into<String>, anchor: &Element, direction: Direction) -> Self {
        Self::for_id(result_kind, field, anchor.id(), direction)
    }

    /// Query anchored on a raw id (intermediate collection nodes, type ids).
    pub fn for_id(
        result_kind: ElementKind,
        field: impl Into<String>,
        anchor: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            result_kind,
            field: field.into(),
            anchor: anchor.into(),
            direction,
        }
    }

    pub fn result_kind(&self) -> ElementKind {
        self.result_kind
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}
