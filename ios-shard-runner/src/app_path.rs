// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locating the test binary inside an app bundle.

use crate::errors::AppPathError;
use camino::{Utf8Path, Utf8PathBuf};

/// The value CI passes as the host app when there isn't one.
pub const NO_HOST_APP: &str = "NO_PATH";

/// Resolves app bundle names to the binary that should be inspected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppPathResolver {
    build_dir: Utf8PathBuf,
}

impl AppPathResolver {
    /// Creates a new resolver for bundles under `build_dir` (e.g. `out/Debug-iphonesimulator`).
    pub fn new(build_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    /// The directory app bundles are looked up in.
    pub fn build_dir(&self) -> &Utf8Path {
        &self.build_dir
    }

    /// Returns the path to the test binary for `app`.
    ///
    /// * For EarlGrey 1 tests, `some_test.app` resolves to `<build_dir>/some_test.app/some_test`.
    /// * For EarlGrey 2 tests a host app is passed as well, and the tests live in a plugin of the
    ///   runner app: `some_test-Runner.app` resolves to
    ///   `<build_dir>/some_test-Runner.app/PlugIns/some_test.xctest/some_test`.
    ///
    /// A host app of [`NO_HOST_APP`] is treated as no host app.
    pub fn resolve(&self, app: &str, host_app: Option<&str>) -> Result<Utf8PathBuf, AppPathError> {
        let app_name = Utf8Path::new(app)
            .file_name()
            .and_then(|file_name| file_name.strip_suffix(".app"))
            .ok_or_else(|| AppPathError::NotAnAppBundle {
                app: app.to_owned(),
            })?;
        let bundle_dir = self.build_dir.join(app);

        match host_app.filter(|host_app| *host_app != NO_HOST_APP) {
            Some(host_app) => {
                tracing::debug!("detected EarlGrey 2 test (host app: {host_app})");
                let test_name = app_name.strip_suffix("-Runner").ok_or_else(|| {
                    AppPathError::MissingRunnerSuffix {
                        app: app.to_owned(),
                        host_app: host_app.to_owned(),
                    }
                })?;
                let mut path = bundle_dir;
                path.push("PlugIns");
                path.push(format!("{test_name}.xctest"));
                path.push(test_name);
                Ok(path)
            }
            None => Ok(bundle_dir.join(app_name)),
        }
    }
}
