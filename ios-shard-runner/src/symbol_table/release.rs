// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::inventory::{TestInventory, is_ignored_class};
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};

// A class record such as `name 0x1064b8438 CacheTestCase`, up to and including the line break.
static TEST_CLASS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"name 0[xX]\w+ ([A-Za-z_][A-Za-z0-9_]*Test(?:Case|))\n")
        .expect("release test class regex is valid")
});

// A method record such as `name 0x1075e6887 testA`, up to and including the line break.
static TEST_METHOD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"name 0[xX]\w+ (test[A-Za-z0-9_]+)\n").expect("release test method regex is valid")
});

pub(super) fn parse(dump: &str) -> TestInventory {
    let mut inventory = TestInventory::new();
    for (class_name, segment) in class_segments(dump) {
        if is_ignored_class(class_name) {
            tracing::trace!("skipping methods of ignored class {class_name}");
            continue;
        }
        let method_names: HashSet<&str> = TEST_METHOD_NAME
            .captures_iter(segment)
            .map(|captures| {
                let (_, [method_name]) = captures.extract();
                method_name
            })
            .collect();
        inventory.add(class_name, method_names.len());
    }
    inventory
}

/// Splits `dump` on class records, returning each class name with the text that follows it up to
/// the next class record. Text before the first class record belongs to no class and is dropped.
fn class_segments(dump: &str) -> Vec<(&str, &str)> {
    let mut segments = Vec::new();
    let mut current: Option<(&str, usize)> = None;

    for captures in TEST_CLASS_NAME.captures_iter(dump) {
        let marker = captures.get_match();
        let (_, [class_name]) = captures.extract();
        if let Some((prev_class, start)) = current.replace((class_name, marker.end())) {
            segments.push((prev_class, &dump[start..marker.start()]));
        }
    }
    if let Some((class_name, start)) = current {
        segments.push((class_name, &dump[start..]));
    }

    segments
}
