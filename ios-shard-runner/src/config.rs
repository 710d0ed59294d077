// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for ios-shard.

use crate::{errors::ConfigParseError, otool_cli::default_otool_path};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// The arguments that determine which test classes a shard runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShardConfig {
    /// The app bundle under test, e.g. `ios_chrome_ui_eg2tests_module-Runner.app`.
    pub app: String,

    /// The host app, for EarlGrey 2 tests.
    pub host_app: Option<String>,

    /// Whether the bundle was built in release mode.
    pub release: bool,

    /// The 0-based index of this shard.
    pub shard_index: usize,

    /// The total number of shards.
    pub total_shards: usize,
}

/// Settings loaded from config files.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolConfig {
    otool_path: Utf8PathBuf,
    build_dir: Utf8PathBuf,
}

impl ToolConfig {
    /// The default location of the config file, relative to the current directory.
    pub const CONFIG_PATH: &'static str = ".config/ios-shard.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the default location under `root`, or from `config_file` if
    /// specified.
    ///
    /// A missing file at the default location is not an error. A missing `config_file` is.
    pub fn from_sources(
        root: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        Self::from_sources_impl(root, config_file, |config_file, unknown| {
            let mut unknown_str = String::new();
            if let [ignored_key] = unknown.iter().collect::<Vec<_>>().as_slice() {
                // Print this on the same line.
                unknown_str.push(' ');
                unknown_str.push_str(ignored_key);
            } else {
                for ignored_key in unknown {
                    unknown_str.push_str("\n  - ");
                    unknown_str.push_str(ignored_key);
                }
            }

            warn!("ignoring unknown configuration keys in config file {config_file}:{unknown_str}");
        })
    }

    // A custom unknown_callback can be passed in while testing.
    fn from_sources_impl(
        root: &Utf8Path,
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(&Utf8Path, &BTreeSet<String>),
    ) -> Result<Self, ConfigParseError> {
        let (config_file, required) = match config_file {
            Some(config_file) => (config_file.to_owned(), true),
            None => (root.join(Self::CONFIG_PATH), false),
        };

        let builder = Self::make_default_config()
            .add_source(File::new(config_file.as_str(), FileFormat::Toml).required(required));
        let config = builder
            .build()
            .map_err(|err| ConfigParseError::new(&config_file, err))?;

        let mut unknown = BTreeSet::new();
        let deserialized: ToolConfigDeserialize =
            serde_ignored::deserialize(config, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .map_err(|err| ConfigParseError::new(&config_file, err))?;

        if !unknown.is_empty() {
            unknown_callback(&config_file, &unknown);
        }

        Ok(Self {
            otool_path: deserialized.otool_path.unwrap_or_else(default_otool_path),
            build_dir: deserialized.build_dir,
        })
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    /// The otool binary to run.
    pub fn otool_path(&self) -> &Utf8Path {
        &self.otool_path
    }

    /// The directory app bundles are looked up in.
    pub fn build_dir(&self) -> &Utf8Path {
        &self.build_dir
    }

    /// Overrides the build directory, e.g. from the command line.
    pub fn set_build_dir(&mut self, build_dir: impl Into<Utf8PathBuf>) {
        self.build_dir = build_dir.into();
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ToolConfigDeserialize {
    #[serde(default)]
    otool_path: Option<Utf8PathBuf>,
    build_dir: Utf8PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn load(
        root: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> (Result<ToolConfig, ConfigParseError>, Vec<String>) {
        let mut unknown_keys = Vec::new();
        let result = ToolConfig::from_sources_impl(root, config_file, |_, unknown| {
            unknown_keys.extend(unknown.iter().cloned());
        });
        (result, unknown_keys)
    }

    #[test]
    fn default_config_without_file() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let (config, unknown) = load(dir.path(), None);
        let config = config.expect("default config is valid");
        assert_eq!(config.build_dir().as_str(), "out/Debug");
        assert_eq!(config.otool_path().as_str(), default_otool_path().as_str());
        assert!(unknown.is_empty());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        std::fs::create_dir(dir.path().join(".config")).expect(".config created");
        std::fs::write(
            dir.path().join(ToolConfig::CONFIG_PATH),
            indoc! {r#"
                build-dir = "out/Release-iphonesimulator"
                otool-path = "/opt/xcode/otool"
                shard-count = 4
            "#},
        )
        .expect("config written");

        let (config, unknown) = load(dir.path(), None);
        let config = config.expect("config is valid");
        assert_eq!(config.build_dir().as_str(), "out/Release-iphonesimulator");
        assert_eq!(config.otool_path().as_str(), "/opt/xcode/otool");
        assert_eq!(unknown, vec!["shard-count".to_owned()]);
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let missing = dir.path().join("missing.toml");
        let (config, _) = load(dir.path(), Some(&missing));
        let err = config.expect_err("missing explicit config is an error");
        assert_eq!(err.config_file(), &missing);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "build-dir = [1, 2]\n").expect("config written");
        let (config, _) = load(dir.path(), Some(&path));
        config.expect_err("build-dir must be a string");
    }
}
