use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use super::Element;

/// Answer of one question: anchor element → related elements, ordered by anchor.
///
/// Inserting for an existing anchor unions the sets. Empty sets are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    entries: BTreeMap<Element, BTreeSet<Element>>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `values` into the entry for `anchor`. Returns false (and stores
    /// nothing) when `values` is empty.
    pub fn insert(&mut self, anchor: Element, values: BTreeSet<Element>) -> bool {
        if values.is_empty() {
            return false;
        }
        self.entries.entry(anchor).or_default().extend(values);
        true
    }

    /// Keep only the first `n` values of each entry (sorted order).
    pub fn truncate_values(&mut self, n: usize) {
        for values in self.entries.values_mut() {
            if values.len() > n {
                *values = std::mem::take(values).into_iter().take(n).collect();
            }
        }
    }

    pub fn get(&self, anchor: &Element) -> Option<&BTreeSet<Element>> {
        self.entries.get(anchor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Element, BTreeSet<Element>> {
        self.entries.iter()
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Element> {
        self.entries.keys()
    }
}

impl<'a> IntoIterator for &'a ResultMap {
    type Item = (&'a Element, &'a BTreeSet<Element>);
    type IntoIter = btree_map::Iter<'a, Element, BTreeSet<Element>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
