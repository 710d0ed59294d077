// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `ios-shard` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ShardExitCode {}

impl ShardExitCode {
    /// No errors occurred and ios-shard exited normally.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up an ios-shard invocation, such as an invalid config
    /// file or app bundle name.
    pub const SETUP_ERROR: i32 = 96;

    /// The shard index or shard count was invalid.
    pub const INVALID_SHARD_ARGS: i32 = 97;

    /// The symbol table dump could not be obtained.
    pub const SYMBOL_DUMP_FAILED: i32 = 98;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
