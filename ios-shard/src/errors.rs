// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{exit_codes::ShardExitCode, output::StderrStyles};
use ios_shard_runner::errors::*;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error that ios-shard reports to the user, as opposed to a bug.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("app path error")]
    AppPathError {
        #[from]
        err: AppPathError,
    },
    #[error("symbol table dump error")]
    SymbolDumpError {
        #[from]
        err: SymbolDumpError,
    },
    #[error("shard selection error")]
    SelectShardError {
        #[from]
        err: SelectShardError,
    },
    #[error("shard arguments missing")]
    ShardArgsMissing { missing: &'static str },
    #[error("writing output failed")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
    #[error("writing JSON output failed")]
    WriteJsonError {
        #[source]
        err: serde_json::Error,
    },
}

impl From<ShardTestCasesError> for ExpectedError {
    fn from(err: ShardTestCasesError) -> Self {
        match err {
            ShardTestCasesError::AppPath(err) => Self::AppPathError { err },
            ShardTestCasesError::SymbolDump(err) => Self::SymbolDumpError { err },
            ShardTestCasesError::Select(err) => Self::SelectShardError { err },
        }
    }
}

impl From<InvalidShardCount> for ExpectedError {
    fn from(err: InvalidShardCount) -> Self {
        Self::SelectShardError { err: err.into() }
    }
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } | Self::AppPathError { .. } => {
                ShardExitCode::SETUP_ERROR
            }
            Self::SelectShardError { .. } | Self::ShardArgsMissing { .. } => {
                ShardExitCode::INVALID_SHARD_ARGS
            }
            Self::SymbolDumpError { .. } => ShardExitCode::SYMBOL_DUMP_FAILED,
            Self::WriteOutputError { .. } | Self::WriteJsonError { .. } => {
                ShardExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::ConfigParseError { err } => {
                tracing::error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::AppPathError { err } => {
                tracing::error!("failed to determine path to test binary: {err}");
                None
            }
            Self::SymbolDumpError { err } => {
                match err {
                    SymbolDumpError::Tool(ToolInvocationError::Exec { command, err }) => {
                        tracing::error!("failed to execute `{}`", command.style(styles.bold));
                        Some(err as &dyn Error)
                    }
                    SymbolDumpError::Tool(ToolInvocationError::Failed { stderr, .. }) => {
                        tracing::error!("{err}");
                        if !stderr.trim().is_empty() {
                            tracing::info!(
                                target: crate::output::NO_HEADING_TARGET,
                                "{}",
                                stderr.trim_end().style(styles.warning_text)
                            );
                        }
                        None
                    }
                    SymbolDumpError::Read(read_err) => {
                        tracing::error!("{read_err}");
                        read_err.source()
                    }
                }
            }
            Self::SelectShardError { err } => {
                tracing::error!("{err}");
                None
            }
            Self::ShardArgsMissing { missing } => {
                tracing::error!(
                    "{} must be specified, either on the command line or through the environment",
                    missing.style(styles.bold)
                );
                None
            }
            Self::WriteOutputError { err } => {
                tracing::error!("failed to write output");
                Some(err as &dyn Error)
            }
            Self::WriteJsonError { err } => {
                tracing::error!("failed to write JSON output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            tracing::error!(
                target: crate::output::NO_HEADING_TARGET,
                "\nCaused by:\n  {}",
                err
            );
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let invalid = ios_shard_runner::partition::partition(
            &ios_shard_runner::inventory::TestInventory::new(),
            0,
        )
        .expect_err("0 shards is invalid");
        let err: ExpectedError = invalid.into();
        assert_eq!(err.process_exit_code(), ShardExitCode::INVALID_SHARD_ARGS);

        let err = ExpectedError::ShardArgsMissing {
            missing: "--total-shards",
        };
        assert_eq!(err.process_exit_code(), ShardExitCode::INVALID_SHARD_ARGS);

        let err: ExpectedError = ShardTestCasesError::from(AppPathError::NotAnAppBundle {
            app: "foo".to_owned(),
        })
        .into();
        assert_eq!(err.process_exit_code(), ShardExitCode::SETUP_ERROR);

        let err: ExpectedError = ShardTestCasesError::from(ToolInvocationError::Failed {
            command: "otool -ov foo".to_owned(),
            exit_code: Some(1),
            stderr: String::new(),
        })
        .into();
        assert_eq!(err.process_exit_code(), ShardExitCode::SYMBOL_DUMP_FAILED);
    }
}
