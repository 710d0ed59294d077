// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by ios-shard.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::{borrow::Cow, fmt};
use thiserror::Error;

/// The requested number of shards was zero.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("total shards must be at least 1 (got {total_shards})")]
pub struct InvalidShardCount {
    total_shards: usize,
}

impl InvalidShardCount {
    pub(crate) fn new(total_shards: usize) -> Self {
        Self { total_shards }
    }

    /// Returns the shard count that was rejected.
    pub fn total_shards(&self) -> usize {
        self.total_shards
    }
}

/// A shard index was requested that does not exist in the computed shard set.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("shard index {shard_index} is out of range (total shards: {total_shards})")]
pub struct ShardIndexOutOfRange {
    shard_index: usize,
    total_shards: usize,
}

impl ShardIndexOutOfRange {
    pub(crate) fn new(shard_index: usize, total_shards: usize) -> Self {
        Self {
            shard_index,
            total_shards,
        }
    }

    /// The index that was requested.
    pub fn shard_index(&self) -> usize {
        self.shard_index
    }

    /// The number of shards that were computed.
    pub fn total_shards(&self) -> usize {
        self.total_shards
    }
}

/// An error that occurs while parsing a [`ShardSelector`](crate::partition::ShardSelector) input.
#[derive(Clone, Debug, Error)]
#[error("shard must be in the format \"<shard-index>/<total-shards>\":\n{message}")]
pub struct ShardSelectorParseError {
    message: Cow<'static, str>,
}

impl ShardSelectorParseError {
    pub(crate) fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An error that occurred while running the symbol table dump tool.
#[derive(Debug, Error)]
pub enum ToolInvocationError {
    /// The tool could not be started.
    #[error("failed to execute `{command}`")]
    Exec {
        /// The command that was run.
        command: String,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// The tool ran but exited with a failure status.
    #[error("`{command}` exited with {}", DisplayExitCode(.exit_code.as_ref().copied()))]
    Failed {
        /// The command that was run.
        command: String,

        /// The exit code, if the process exited normally.
        exit_code: Option<i32>,

        /// Captured standard error, lossily decoded.
        stderr: String,
    },
}

struct DisplayExitCode(Option<i32>);

impl fmt::Display for DisplayExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "a signal"),
        }
    }
}

/// An error that occurred while reading a previously captured symbol table dump.
#[derive(Debug, Error)]
#[error("failed to read symbol table dump from `{path}`")]
pub struct DumpReadError {
    path: Utf8PathBuf,
    #[source]
    err: std::io::Error,
}

impl DumpReadError {
    pub(crate) fn new(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self {
            path: path.into(),
            err,
        }
    }
}

/// An error that occurred while obtaining a symbol table dump from any source.
#[derive(Debug, Error)]
pub enum SymbolDumpError {
    /// The dump tool failed.
    #[error(transparent)]
    Tool(#[from] ToolInvocationError),

    /// A captured dump file could not be read.
    #[error(transparent)]
    Read(#[from] DumpReadError),
}

/// An error that occurred while determining the path to the binary inside an app bundle.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AppPathError {
    /// The app argument does not name a `.app` bundle.
    #[error("app `{app}` does not end with `.app`")]
    NotAnAppBundle {
        /// The app argument.
        app: String,
    },

    /// A host app was passed, but the app is not an EarlGrey 2 runner bundle.
    #[error("app `{app}` was passed with host app `{host_app}`, but does not end with `-Runner.app`")]
    MissingRunnerSuffix {
        /// The app argument.
        app: String,

        /// The host app argument.
        host_app: String,
    },
}

/// An error that occurred while loading the tool config.
#[derive(Debug, Error)]
#[error("failed to parse ios-shard config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}

/// An error returned by [`select_shard`](crate::coordinator::select_shard).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SelectShardError {
    /// The shard count was invalid.
    #[error(transparent)]
    InvalidShardCount(#[from] InvalidShardCount),

    /// The shard index was out of range.
    #[error(transparent)]
    ShardIndexOutOfRange(#[from] ShardIndexOutOfRange),
}

/// An error returned by [`Coordinator::shard_test_cases`](crate::coordinator::Coordinator::shard_test_cases).
#[derive(Debug, Error)]
pub enum ShardTestCasesError {
    /// The path to the test binary could not be determined.
    #[error("failed to determine path to test binary")]
    AppPath(#[from] AppPathError),

    /// The symbol table dump could not be obtained. Tool failures pass through unchanged.
    #[error(transparent)]
    SymbolDump(#[from] SymbolDumpError),

    /// Balancing or shard selection failed.
    #[error(transparent)]
    Select(#[from] SelectShardError),
}

impl From<ToolInvocationError> for ShardTestCasesError {
    fn from(err: ToolInvocationError) -> Self {
        Self::SymbolDump(SymbolDumpError::Tool(err))
    }
}
