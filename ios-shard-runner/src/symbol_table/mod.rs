// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsers for `otool -ov` symbol table dumps.
//!
//! Debug and release builds of a test bundle produce structurally different dumps, so there is one
//! extraction pass for each:
//!
//! * Debug dumps tag every method implementation with its owning class, as in
//!   `imp 0x1075e6887 -[CacheTestCase testA]`. These are matched directly and grouped by class.
//! * Release dumps list class names and method names as bare `name 0x... <symbol>` records. The
//!   dump is split on class records, and method records are attributed to the class record that
//!   most recently preceded them.
//!
//! The release pass attributes methods purely by position. If the tool emits a method record
//! before its owning class record, the method is counted towards the previous class. Downstream
//! fixtures depend on these counts, so this must not change.

mod debug;
mod release;

use crate::inventory::TestInventory;
use camino::Utf8Path;
use serde::Serialize;
use std::fmt;

/// The layout of a symbol table dump.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolDumpFormat {
    /// Output for a bundle built with `is_debug=true`.
    Debug,

    /// Output for a bundle built with `is_debug=false`.
    Release,
}

impl SymbolDumpFormat {
    /// Determines the dump format.
    ///
    /// The format is release if `release` was requested explicitly, or if the build directory has
    /// a release configuration component (e.g. `out/Release` or `out/Release-iphonesimulator`).
    pub fn detect(release: bool, build_dir: &Utf8Path) -> Self {
        let release_dir = build_dir.components().any(|component| {
            let component = component.as_str();
            component == "Release" || component.starts_with("Release-")
        });
        Self::from_release(release || release_dir)
    }

    /// Returns the release format if `release` is true, and the debug format otherwise.
    pub fn from_release(release: bool) -> Self {
        if release { Self::Release } else { Self::Debug }
    }

    /// Parses `dump` into a [`TestInventory`].
    ///
    /// Parsing never fails: text without any recognizable records produces an empty inventory.
    pub fn parse(self, dump: &str) -> TestInventory {
        let inventory = match self {
            Self::Debug => debug::parse(dump),
            Self::Release => release::parse(dump),
        };
        tracing::debug!(
            "parsed {} dump: {} test classes, {} test methods",
            self,
            inventory.len(),
            inventory.total_count(),
        );
        inventory
    }
}

impl fmt::Display for SymbolDumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}
