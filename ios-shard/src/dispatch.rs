// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter, StdoutStyles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Subcommand, ValueEnum};
use ios_shard_runner::{
    app_path::AppPathResolver,
    config::{ShardConfig, ToolConfig},
    coordinator::Coordinator,
    dump_source::{DumpFile, Otool, SymbolDumpSource},
    inventory::TestInventory,
    partition::{ShardSelector, partition},
};
use owo_colors::OwoColorize;
use std::io::Write;
use swrite::{SWrite, swrite, swriteln};

/// Select the test classes one CI shard should run from an iOS test bundle.
///
/// Test classes are balanced across shards by their number of test methods, as read from the
/// bundle's Objective-C metadata with `otool -ov`. Every shard computes the same partition from
/// the same bundle, so shards need no coordination beyond agreeing on the shard count.
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct IosShardApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl IosShardApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Select(opts) => opts.exec(output, output_writer),
            Command::Plan(opts) => opts.exec(output, output_writer),
            Command::Inventory(opts) => opts.exec(output, output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the test classes assigned to one shard
    Select(SelectOpts),

    /// Print every shard with its test classes and method count
    Plan(PlanOpts),

    /// Print the number of test methods found in each test class
    Inventory(InventoryOpts),
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Bundle options")]
struct BundleOpts {
    /// App bundle under test, relative to the build directory
    #[arg(long, value_name = "APP")]
    app: String,

    /// Host app, for EarlGrey 2 tests ("NO_PATH" means none)
    #[arg(long, value_name = "HOST_APP")]
    host_app: Option<String>,

    /// The bundle was built in release mode
    ///
    /// Release mode is also assumed if the build directory is a Release directory.
    #[arg(long)]
    release: bool,

    /// Directory app bundles are looked up in [default: from config, or out/Debug]
    #[arg(long, value_name = "DIR", env = "IOS_SHARD_BUILD_DIR")]
    build_dir: Option<Utf8PathBuf>,

    /// Read a previously captured `otool -ov` dump instead of running otool
    #[arg(long, value_name = "PATH")]
    dump_file: Option<Utf8PathBuf>,

    /// Config file [default: .config/ios-shard.toml]
    #[arg(long, value_name = "PATH", env = "IOS_SHARD_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t, value_name = "FORMAT")]
    message_format: MessageFormat,
}

impl BundleOpts {
    fn resolver_and_source(&self) -> Result<(AppPathResolver, Box<dyn SymbolDumpSource>)> {
        let mut tool_config = ToolConfig::from_sources(Utf8Path::new("."), self.config.as_deref())?;
        if let Some(build_dir) = &self.build_dir {
            tool_config.set_build_dir(build_dir);
        }

        let resolver = AppPathResolver::new(tool_config.build_dir());
        let source: Box<dyn SymbolDumpSource> = match &self.dump_file {
            Some(dump_file) => Box::new(DumpFile::new(dump_file)),
            None => Box::new(Otool::new(tool_config.otool_path())),
        };
        Ok((resolver, source))
    }

    fn load_inventory(&self) -> Result<TestInventory> {
        let (resolver, source) = self.resolver_and_source()?;
        let coordinator = Coordinator::new(&resolver, &*source);
        Ok(coordinator.load_inventory(&self.app, self.host_app.as_deref(), self.release)?)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
enum MessageFormat {
    /// Human-readable output
    #[default]
    Human,

    /// JSON output
    Json,
}

#[derive(Debug, Args)]
struct ShardArgs {
    /// 0-based index of this shard
    #[arg(long, value_name = "INDEX", env = "GTEST_SHARD_INDEX")]
    shard_index: Option<usize>,

    /// Total number of shards
    #[arg(long, value_name = "N", env = "GTEST_TOTAL_SHARDS")]
    total_shards: Option<usize>,

    /// Shard index and total in one argument, e.g. 0/3 (overrides the other shard options)
    #[arg(long, value_name = "INDEX/N")]
    shard: Option<ShardSelector>,
}

impl ShardArgs {
    fn selector(&self) -> Result<ShardSelector> {
        if let Some(shard) = self.shard {
            return Ok(shard);
        }
        let shard_index = self.shard_index.ok_or(ExpectedError::ShardArgsMissing {
            missing: "--shard-index",
        })?;
        let total_shards = self.total_shards.ok_or(ExpectedError::ShardArgsMissing {
            missing: "--total-shards",
        })?;
        Ok(ShardSelector::new(shard_index, total_shards)?)
    }
}

#[derive(Debug, Args)]
struct SelectOpts {
    #[clap(flatten)]
    bundle: BundleOpts,

    #[clap(flatten)]
    shard: ShardArgs,
}

impl SelectOpts {
    fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        // Check shard arguments before running otool.
        let selector = self.shard.selector()?;
        let config = ShardConfig {
            app: self.bundle.app.clone(),
            host_app: self.bundle.host_app.clone(),
            release: self.bundle.release,
            shard_index: selector.shard_index(),
            total_shards: selector.total_shards(),
        };

        let (resolver, source) = self.bundle.resolver_and_source()?;
        let test_classes = Coordinator::new(&resolver, &*source).shard_test_cases(&config)?;

        let mut writer = output_writer.stdout_writer();
        match self.bundle.message_format {
            MessageFormat::Human => {
                let styles = output.stdout_styles();
                let mut out = String::new();
                for class_name in &test_classes {
                    swriteln!(out, "{}", class_name.style(styles.class_name));
                }
                write_str(&mut writer, &out)?;
            }
            MessageFormat::Json => write_json(&mut writer, &test_classes)?,
        }

        Ok(0)
    }
}

#[derive(Debug, Args)]
struct PlanOpts {
    #[clap(flatten)]
    bundle: BundleOpts,

    /// Total number of shards
    #[arg(long, value_name = "N", env = "GTEST_TOTAL_SHARDS")]
    total_shards: usize,
}

impl PlanOpts {
    fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let inventory = self.bundle.load_inventory()?;
        let shard_set = partition(&inventory, self.total_shards)?;

        let mut writer = output_writer.stdout_writer();
        match self.bundle.message_format {
            MessageFormat::Human => {
                let styles = output.stdout_styles();
                let mut out = String::new();
                for (index, shard) in shard_set.shards().iter().enumerate() {
                    swriteln!(
                        out,
                        "{} {}: {} methods, {} classes",
                        "shard".style(styles.shard),
                        index.style(styles.shard),
                        shard.size().style(styles.count),
                        shard.test_classes().len().style(styles.count),
                    );
                    for class_name in shard.test_classes() {
                        swrite!(out, "    {}", class_name.style(styles.class_name));
                        if output.verbose {
                            let count = inventory.get(class_name).unwrap_or(0);
                            swrite!(out, " ({count})");
                        }
                        out.push('\n');
                    }
                }
                write_str(&mut writer, &out)?;
            }
            MessageFormat::Json => write_json(&mut writer, &shard_set)?,
        }

        Ok(0)
    }
}

#[derive(Debug, Args)]
struct InventoryOpts {
    #[clap(flatten)]
    bundle: BundleOpts,
}

impl InventoryOpts {
    fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let inventory = self.bundle.load_inventory()?;

        let mut writer = output_writer.stdout_writer();
        match self.bundle.message_format {
            MessageFormat::Human => {
                write_str(&mut writer, &format_inventory(&inventory, &output.stdout_styles()))?;
            }
            MessageFormat::Json => write_json(&mut writer, &inventory)?,
        }

        Ok(0)
    }
}

fn format_inventory(inventory: &TestInventory, styles: &StdoutStyles) -> String {
    let mut out = String::new();
    for (class_name, count) in inventory.iter() {
        swriteln!(
            out,
            "{}: {}",
            class_name.style(styles.class_name),
            count.style(styles.count)
        );
    }
    swriteln!(
        out,
        "{} test classes, {} test methods",
        inventory.len().style(styles.count),
        inventory.total_count().style(styles.count),
    );
    out
}

fn write_str(writer: &mut impl Write, s: &str) -> Result<()> {
    writer
        .write_all(s.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|err| ExpectedError::WriteOutputError { err })
}

fn write_json(writer: &mut impl Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)
        .map_err(|err| ExpectedError::WriteJsonError { err })?;
    write_str(writer, "\n")
}
