// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ties parsing and balancing together to pick the test classes for one shard.
//!
//! Each shard worker runs this independently on the same dump. No state is shared between
//! workers; they agree on the partition because it is a pure function of the dump.

use crate::{
    app_path::AppPathResolver,
    config::ShardConfig,
    dump_source::SymbolDumpSource,
    errors::{SelectShardError, ShardTestCasesError},
    inventory::TestInventory,
    partition::{ShardSelector, partition},
    symbol_table::SymbolDumpFormat,
};
use tracing::info;

/// Parses `dump` and returns the test classes assigned to shard `shard_index` out of
/// `total_shards`.
///
/// `release` selects the release dump layout; otherwise the dump is parsed as a debug build's.
pub fn select_shard(
    dump: &str,
    release: bool,
    shard_index: usize,
    total_shards: usize,
) -> Result<Vec<String>, SelectShardError> {
    let inventory = SymbolDumpFormat::from_release(release).parse(dump);
    select_from_inventory(&inventory, shard_index, total_shards)
}

/// Balances `inventory` and returns the test classes assigned to shard `shard_index` out of
/// `total_shards`.
pub fn select_from_inventory(
    inventory: &TestInventory,
    shard_index: usize,
    total_shards: usize,
) -> Result<Vec<String>, SelectShardError> {
    let shard = partition(inventory, total_shards)?.into_shard(shard_index)?;
    info!(
        "tests to be executed by shard {shard_index} ({} methods): {:?}",
        shard.size(),
        shard.test_classes(),
    );
    Ok(shard.into_test_classes())
}

/// Runs the full pipeline: locate the test binary, dump its symbol table, parse and balance.
#[derive(Clone, Copy)]
pub struct Coordinator<'a> {
    resolver: &'a AppPathResolver,
    source: &'a dyn SymbolDumpSource,
}

impl<'a> Coordinator<'a> {
    /// Creates a new coordinator.
    pub fn new(resolver: &'a AppPathResolver, source: &'a dyn SymbolDumpSource) -> Self {
        Self { resolver, source }
    }

    /// Returns the dump format for a bundle in this coordinator's build directory.
    pub fn dump_format(&self, release: bool) -> SymbolDumpFormat {
        SymbolDumpFormat::detect(release, self.resolver.build_dir())
    }

    /// Builds the test inventory for `app`.
    pub fn load_inventory(
        &self,
        app: &str,
        host_app: Option<&str>,
        release: bool,
    ) -> Result<TestInventory, ShardTestCasesError> {
        let binary = self.resolver.resolve(app, host_app)?;
        let format = self.dump_format(release);
        if format == SymbolDumpFormat::Release {
            info!("release build detected, parsing release symbol table dump");
        }
        let dump = self.source.symbol_dump(&binary)?;
        Ok(format.parse(&dump))
    }

    /// Returns the test classes this shard should run.
    ///
    /// The shard arguments are checked before anything is run.
    pub fn shard_test_cases(&self, config: &ShardConfig) -> Result<Vec<String>, ShardTestCasesError> {
        let selector = ShardSelector::new(config.shard_index, config.total_shards)?;
        let inventory =
            self.load_inventory(&config.app, config.host_app.as_deref(), config.release)?;
        let test_classes = selector.select(&inventory);
        info!(
            "tests to be executed by shard {}: {:?}",
            selector.shard_index(),
            test_classes
        );
        Ok(test_classes)
    }
}

impl std::fmt::Debug for Coordinator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{
            InvalidShardCount, ShardIndexOutOfRange, SymbolDumpError, ToolInvocationError,
        },
        test_helpers::{DEBUG_DUMP, RELEASE_DUMP},
    };
    use camino::{Utf8Path, Utf8PathBuf};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[test]
    fn debug_dump_into_three_shards() {
        let shards: Vec<_> = (0..3)
            .map(|shard_index| {
                select_shard(DEBUG_DUMP, false, shard_index, 3)
                    .expect("shard index is in range")
            })
            .collect();
        assert_eq!(
            shards.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![1, 2, 2]
        );
        assert_eq!(shards[0], vec!["CacheTestCase"]);
    }

    #[test]
    fn debug_dump_into_one_shard() {
        let classes = select_shard(DEBUG_DUMP, false, 0, 1)
            .expect("shard index is in range");
        assert_eq!(
            classes,
            vec![
                "CacheTestCase",
                "TabUITestCase",
                "KeyboardTestCase",
                "PasswordsTestCase",
                "ToolBarTestCase",
            ],
        );
    }

    #[test]
    fn shard_index_out_of_range() {
        assert_eq!(
            select_shard(DEBUG_DUMP, false, 5, 3),
            Err(SelectShardError::ShardIndexOutOfRange(
                ShardIndexOutOfRange::new(5, 3)
            )),
        );
    }

    #[test]
    fn zero_total_shards() {
        assert_eq!(
            select_shard(DEBUG_DUMP, false, 0, 0),
            Err(SelectShardError::InvalidShardCount(InvalidShardCount::new(
                0
            ))),
        );
    }

    #[test]
    fn empty_dump_gives_empty_shards() {
        for release in [false, true] {
            for total_shards in 1..=4 {
                for shard_index in 0..total_shards {
                    let classes = select_shard("", release, shard_index, total_shards)
                        .expect("shard index is in range");
                    assert!(classes.is_empty());
                }
            }
        }
    }

    #[test]
    fn release_dump_into_three_shards() {
        // CacheTestCase and KeyboardTest both have 3 methods; CacheTestCase was seen first.
        let shards: Vec<_> = (0..3)
            .map(|shard_index| {
                select_shard(RELEASE_DUMP, true, shard_index, 3)
                    .expect("shard index is in range")
            })
            .collect();
        assert_eq!(
            shards,
            vec![
                vec!["CacheTestCase"],
                vec!["KeyboardTest"],
                vec!["ToolBarTestCase", "TabUITestCase"],
            ],
        );
    }

    #[derive(Default)]
    struct FakeSource {
        dump: &'static str,
        fail: bool,
        requested: RefCell<Vec<Utf8PathBuf>>,
    }

    impl SymbolDumpSource for FakeSource {
        fn symbol_dump(&self, binary: &Utf8Path) -> Result<String, SymbolDumpError> {
            self.requested.borrow_mut().push(binary.to_owned());
            if self.fail {
                return Err(ToolInvocationError::Failed {
                    command: format!("otool -ov {binary}"),
                    exit_code: Some(1),
                    stderr: "error: no such file".to_owned(),
                }
                .into());
            }
            Ok(self.dump.to_owned())
        }
    }

    fn shard_config(app: &str, host_app: Option<&str>, release: bool) -> ShardConfig {
        ShardConfig {
            app: app.to_owned(),
            host_app: host_app.map(str::to_owned),
            release,
            shard_index: 0,
            total_shards: 3,
        }
    }

    #[test]
    fn coordinator_runs_pipeline() {
        let resolver = AppPathResolver::new("out/Debug");
        let source = FakeSource {
            dump: DEBUG_DUMP,
            ..Default::default()
        };
        let coordinator = Coordinator::new(&resolver, &source);

        let config = shard_config("ios_chrome_ui_egtests.app", None, false);
        let classes = coordinator
            .shard_test_cases(&config)
            .expect("pipeline succeeds");
        assert_eq!(classes, vec!["CacheTestCase"]);
        assert_eq!(
            source.requested.borrow().as_slice(),
            [Utf8PathBuf::from(
                "out/Debug/ios_chrome_ui_egtests.app/ios_chrome_ui_egtests"
            )],
        );
    }

    #[test]
    fn coordinator_detects_release_build_dir() {
        let resolver = AppPathResolver::new("out/Release-iphonesimulator");
        let source = FakeSource {
            dump: RELEASE_DUMP,
            ..Default::default()
        };
        let coordinator = Coordinator::new(&resolver, &source);

        let inventory = coordinator
            .load_inventory("ios_test-Runner.app", Some("host.app"), false)
            .expect("pipeline succeeds");
        assert_eq!(inventory.get("KeyboardTest"), Some(3));
        assert_eq!(inventory.get("TabUITestCase"), Some(0));
        assert_eq!(
            source.requested.borrow().as_slice(),
            [Utf8PathBuf::from(
                "out/Release-iphonesimulator/ios_test-Runner.app/PlugIns/ios_test.xctest/ios_test"
            )],
        );
    }

    #[test]
    fn coordinator_checks_shard_args_before_running_tool() {
        let resolver = AppPathResolver::new("out/Debug");
        let source = FakeSource {
            dump: DEBUG_DUMP,
            ..Default::default()
        };
        let coordinator = Coordinator::new(&resolver, &source);

        let mut config = shard_config("ios_test.app", None, false);
        config.shard_index = 5;
        let err = coordinator
            .shard_test_cases(&config)
            .expect_err("shard index is out of range");
        assert!(
            matches!(
                err,
                ShardTestCasesError::Select(SelectShardError::ShardIndexOutOfRange(_))
            ),
            "unexpected error: {err:?}"
        );
        assert!(source.requested.borrow().is_empty());
    }

    #[test]
    fn coordinator_propagates_tool_errors() {
        let resolver = AppPathResolver::new("out/Debug");
        let source = FakeSource {
            fail: true,
            ..Default::default()
        };
        let coordinator = Coordinator::new(&resolver, &source);

        let err = coordinator
            .shard_test_cases(&shard_config("ios_test.app", None, false))
            .expect_err("tool failure propagates");
        match err {
            ShardTestCasesError::SymbolDump(SymbolDumpError::Tool(ToolInvocationError::Failed {
                exit_code,
                ..
            })) => assert_eq!(exit_code, Some(1)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
