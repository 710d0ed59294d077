// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-class test method counts extracted from a symbol table dump.

use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Reverse;

/// Base classes of all EarlGrey and EarlGrey 2 test classes. They have no real tests of their own,
/// so they are never part of an inventory.
pub const IGNORED_CLASSES: &[&str] = &["BaseEarlGreyTestCase", "ChromeTestCase"];

/// Returns true if `class_name` is one of the [`IGNORED_CLASSES`].
pub fn is_ignored_class(class_name: &str) -> bool {
    IGNORED_CLASSES.contains(&class_name)
}

/// A mapping from test class name to the number of distinct test methods in that class.
///
/// Classes are kept in the order they were first discovered. That order is used to break ties
/// between classes with equal counts while balancing, so it is part of the inventory's identity:
/// two inventories with the same counts but a different discovery order are not equal.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct TestInventory {
    counts: IndexMap<String, usize>,
}

impl TestInventory {
    /// Creates a new, empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an inventory from `(class, count)` pairs in discovery order.
    ///
    /// Repeated classes have their counts summed and keep the position of their first occurrence.
    /// Ignored classes are dropped.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String> + AsRef<str>,
    {
        let mut inventory = Self::new();
        for (class_name, count) in counts {
            inventory.add(class_name, count);
        }
        inventory
    }

    pub(crate) fn add(&mut self, class_name: impl Into<String> + AsRef<str>, count: usize) {
        if is_ignored_class(class_name.as_ref()) {
            return;
        }
        *self.counts.entry(class_name.into()).or_insert(0) += count;
    }

    /// Returns the number of test classes in this inventory.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if no test classes were found.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the method count for `class_name`, if it is present.
    pub fn get(&self, class_name: &str) -> Option<usize> {
        self.counts.get(class_name).copied()
    }

    /// Returns true if `class_name` is present, even with a count of zero.
    pub fn contains(&self, class_name: &str) -> bool {
        self.counts.contains_key(class_name)
    }

    /// Iterates over `(class, count)` pairs in discovery order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, usize)> + '_ {
        self.counts
            .iter()
            .map(|(class_name, count)| (class_name.as_str(), *count))
    }

    /// Iterates over class names in discovery order.
    pub fn class_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.counts.keys().map(|class_name| class_name.as_str())
    }

    /// Returns the sum of all method counts.
    pub fn total_count(&self) -> usize {
        self.counts.values().sum()
    }

    /// Returns `(class, count)` pairs ordered by count, largest first. Equal counts stay in
    /// discovery order.
    pub fn by_count_descending(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self.iter().enumerate().collect();
        entries.sort_by_key(|&(discovery_index, (_, count))| (Reverse(count), discovery_index));
        entries.into_iter().map(|(_, entry)| entry).collect()
    }
}

// IndexMap equality ignores order, but discovery order matters here.
impl PartialEq for TestInventory {
    fn eq(&self, other: &Self) -> bool {
        self.counts.iter().eq(other.counts.iter())
    }
}

impl Eq for TestInventory {}
