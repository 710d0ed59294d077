// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::inventory::{TestInventory, is_ignored_class};
use indexmap::IndexMap;
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};

// Matches `imp 0x1075e6887 -[CacheTestCase testA]`. The address is optional.
static TEST_METHOD_IMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"imp (?:0[xX][0-9a-fA-F]+ )?-\[([A-Za-z_][A-Za-z0-9_]*Test[Case]*) (test[A-Za-z0-9_]*)\]",
    )
    .expect("debug test method regex is valid")
});

pub(super) fn parse(dump: &str) -> TestInventory {
    // The same implementation can be listed more than once if the class shows up under multiple
    // load commands, so count distinct method names.
    let mut methods: IndexMap<&str, HashSet<&str>> = IndexMap::new();
    for captures in TEST_METHOD_IMP.captures_iter(dump) {
        let (_, [class_name, method_name]) = captures.extract();
        if is_ignored_class(class_name) {
            continue;
        }
        methods.entry(class_name).or_default().insert(method_name);
    }

    TestInventory::from_counts(
        methods
            .into_iter()
            .map(|(class_name, method_names)| (class_name, method_names.len())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::DEBUG_DUMP;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_debug_dump() {
        let inventory = parse(DEBUG_DUMP);
        assert_eq!(
            inventory.iter().collect::<Vec<_>>(),
            vec![
                ("CacheTestCase", 3),
                ("TabUITestCase", 2),
                ("KeyboardTestCase", 1),
                ("PasswordsTestCase", 1),
                ("ToolBarTestCase", 1),
            ],
        );
    }

    #[test]
    fn duplicate_signatures_count_once() {
        let dump = indoc! {"
            imp 0x1075e6887 -[CacheTestCase testA]
            imp 0x1075e6887 -[CacheTestCase testA]
            imp 0x1075e6999 -[CacheTestCase testB]
            imp 0x1075e6999 -[OtherTestCase testA]
        "};
        let inventory = parse(dump);
        assert_eq!(inventory.get("CacheTestCase"), Some(2));
        assert_eq!(inventory.get("OtherTestCase"), Some(1));
    }

    #[test]
    fn ignored_classes_are_dropped() {
        let dump = indoc! {"
            imp 0x1 -[ChromeTestCase testSetUpForTestCase]
            imp 0x2 -[BaseEarlGreyTestCase testFoo]
            imp 0x3 -[BaseEarlGreyTestCase testBar]
            imp 0x4 -[RealTestCase testBaz]
        "};
        let inventory = parse(dump);
        assert_eq!(inventory.class_names().collect::<Vec<_>>(), vec!["RealTestCase"]);
    }

    #[test]
    fn address_is_optional_and_non_test_methods_are_skipped() {
        let dump = indoc! {"
            imp -[SettingsTestCase testOpen]
            imp 0xABC -[SettingsTestCase setUp]
            imp 0xabc -[SettingsTestCase helperTest]
            imp 0x5 -[SettingsHelper testNotATestClass]
            imp 0x6 -[AutofillTest testFill]
        "};
        let inventory = parse(dump);
        assert_eq!(
            inventory.iter().collect::<Vec<_>>(),
            vec![("SettingsTestCase", 1), ("AutofillTest", 1)],
        );
    }

    #[test]
    fn class_suffix_is_any_run_of_case_letters() {
        // After `Test`, the class name may end in any run of the letters in "Case", not just
        // "Case" itself.
        let dump = indoc! {"
            imp 0x1 -[FooTestes testA]
            imp 0x2 -[BarTestCaseCase testB]
            imp 0x3 -[BazTestCasey testC]
        "};
        let inventory = parse(dump);
        assert_eq!(
            inventory.iter().collect::<Vec<_>>(),
            vec![("FooTestes", 1), ("BarTestCaseCase", 1)],
        );
    }

    #[test]
    fn discovery_order_follows_first_method() {
        let dump = indoc! {"
            imp 0x1 -[BTestCase testOne]
            imp 0x2 -[ATestCase testOne]
            imp 0x3 -[BTestCase testTwo]
        "};
        let inventory = parse(dump);
        assert_eq!(
            inventory.class_names().collect::<Vec<_>>(),
            vec!["BTestCase", "ATestCase"],
        );
    }
}
