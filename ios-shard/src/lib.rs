// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Select the test classes one CI shard should run from an iOS test bundle.
//!
//! Chromium's iOS EarlGrey test bundles are too large to run on a single simulator in reasonable
//! time. `ios-shard` reads the bundle's Objective-C metadata with `otool -ov`, counts the test
//! methods in each test class, and balances classes across shards by method count. Every shard
//! runs the same command with its own `GTEST_SHARD_INDEX` and gets a disjoint set of classes.
//!
//! The core logic lives in the `ios-shard-runner` crate.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::ShardExitCode;
#[doc(hidden)]
pub use output::OutputWriter;
