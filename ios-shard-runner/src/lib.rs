// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for ios-shard: splitting the test classes in an iOS test bundle across CI
//! shards.
//!
//! The basic flow is:
//!
//! 1. Locate the test binary in the app bundle ([`app_path`]).
//! 2. Dump its Objective-C metadata with `otool -ov` ([`dump_source`]).
//! 3. Count the test methods in each test class ([`symbol_table`], [`inventory`]).
//! 4. Balance classes across shards by method count ([`partition`]).
//! 5. Return the classes for the current shard ([`coordinator`]).

pub mod app_path;
pub mod config;
pub mod coordinator;
pub mod dump_source;
pub mod errors;
pub mod inventory;
pub mod otool_cli;
pub mod partition;
pub mod symbol_table;
#[cfg(test)]
mod test_helpers;
