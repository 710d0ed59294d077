// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Symbol table dumps shared by tests.

use indoc::indoc;

/// `otool -ov` output for a debug build with five test classes.
pub(crate) static DEBUG_DUMP: &str = indoc! {"
    Meta Class
    name 0x1064b8438 CacheTestCase
    baseMethods 0x1068586d8 (struct method_list_t *)
    imp 0x1075e6887 -[CacheTestCase testA]
    types 0x1064cc3e1
    imp 0x1075e6887 -[CacheTestCase testB]
    imp 0x1075e6887 -[CacheTestCase testc]
    name 0x1064b8438 TabUITestCase
    baseMethods 0x1068586d8 (struct method_list_t *)
    imp 0x1075e6887 -[TabUITestCase testD]
    types 0x1064cc3e1 v16@0:8
    imp 0x1075e6887 -[TabUITestCase testE]
    name 0x1064b8438 KeyboardTestCase
    imp 0x1075e6887 -[KeyboardTestCase testF]
    name 0x1064b8438 PasswordsTestCase
    imp 0x1075e6887 -[PasswordsTestCase testG]
    name 0x1064b8438 ToolBarTestCase
    imp 0x1075e6887 -[ToolBarTestCase testH]
    version 0"};

/// `otool -ov` output for a release build.
///
/// `KeyboardTest`'s class record comes after the start of `TabUITestCase`'s method list, so
/// `testD`, `testE` and `testF` are all counted towards `KeyboardTest`, and `TabUITestCase` ends
/// up with no methods at all.
pub(crate) static RELEASE_DUMP: &str = indoc! {"
    Meta Class
    name 0x1064b8438 CacheTestCase
    baseMethods 0x1068586d8 (struct method_list_t *)
    name 0x1075e6887 testA
    types 0x1064cc3e1
    name 0x1075e6887 testB
    name 0x1075e6887 testc
    baseProtocols 0x0
    Meta Class
    name 0x1064b8438 TabUITestCase
    baseMethods 0x1068586d8 (struct method_list_t *)
    name 0x1064b8438 KeyboardTest
    name 0x1075e6887 testD
    types 0x1064cc3e1 v16@0:8
    name 0x1075e6887 testE
    name 0x1075e6887 testF
    baseProtocols 0x0
    name 0x1064b8438 ChromeTestCase
    name 0x1064b8438 setUp
    baseProtocols 0x0
    name 0x1064b8438 ToolBarTestCase
    name 0x1075e6887 testG
    name 0x1075e6887 testH
    baseProtocols 0x0
    version 0"};
