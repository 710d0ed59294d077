// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ToolInvocationError;
use camino::{Utf8Path, Utf8PathBuf};
use std::borrow::Cow;
use tracing::{debug, info};

/// Create an otool CLI call.
#[derive(Clone, Debug)]
pub struct OtoolCli<'a> {
    otool_path: &'a Utf8Path,
    args: Vec<Cow<'a, str>>,
}

impl<'a> OtoolCli<'a> {
    /// Create an otool CLI call that dumps Objective-C metadata: `otool -ov <binary>`.
    pub fn objc_metadata(otool_path: &'a Utf8Path, binary: &'a Utf8Path) -> Self {
        let mut cli = Self {
            otool_path,
            args: vec![],
        };
        cli.add_arg("-ov").add_arg(binary.as_str());
        cli
    }

    fn add_arg(&mut self, arg: impl Into<Cow<'a, str>>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    fn command_str(&self) -> String {
        let mut command = self.otool_path.to_string();
        for arg in &self.args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }

    /// Convert the command to a [`duct::Expression`].
    pub fn to_expression(&self) -> duct::Expression {
        // Call as_str rather than as_std_path so otool is looked up in PATH if necessary.
        duct::cmd(self.otool_path.as_str(), self.args.iter().map(|arg| &**arg))
    }

    /// Execute the command and return its standard output.
    ///
    /// Output that isn't valid UTF-8 is decoded lossily: symbol names are ASCII, and anything else
    /// in the dump is irrelevant.
    pub fn read(&self) -> Result<String, ToolInvocationError> {
        let command = self.command_str();
        info!("otool command: {command}");
        let output = self
            .to_expression()
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(|err| ToolInvocationError::Exec {
                command: command.clone(),
                err,
            })?;

        info!("otool exited with {}", output.status);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!("stderr:");
            debug!("{stderr}");
            return Err(ToolInvocationError::Failed {
                command,
                exit_code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The default path to otool: the `OTOOL` environment variable if set, otherwise `otool`.
pub fn default_otool_path() -> Utf8PathBuf {
    match std::env::var("OTOOL") {
        Ok(otool_path) if !otool_path.is_empty() => Utf8PathBuf::from(otool_path),
        _ => Utf8PathBuf::from("otool"),
    }
}
