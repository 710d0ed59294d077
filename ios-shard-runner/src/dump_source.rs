// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sources of symbol table dumps.

use crate::{
    errors::{DumpReadError, SymbolDumpError},
    otool_cli::OtoolCli,
};
use camino::{Utf8Path, Utf8PathBuf};

/// Produces the symbol table dump for a test binary.
pub trait SymbolDumpSource {
    /// Returns the `otool -ov` style dump for `binary`.
    fn symbol_dump(&self, binary: &Utf8Path) -> Result<String, SymbolDumpError>;
}

/// Obtains dumps by running otool.
#[derive(Clone, Debug)]
pub struct Otool {
    otool_path: Utf8PathBuf,
}

impl Otool {
    /// Creates a new source that runs the otool at `otool_path`.
    pub fn new(otool_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            otool_path: otool_path.into(),
        }
    }
}

impl SymbolDumpSource for Otool {
    fn symbol_dump(&self, binary: &Utf8Path) -> Result<String, SymbolDumpError> {
        Ok(OtoolCli::objc_metadata(&self.otool_path, binary).read()?)
    }
}

/// Reads a dump that was captured earlier, regardless of the binary asked for.
#[derive(Clone, Debug)]
pub struct DumpFile {
    path: Utf8PathBuf,
}

impl DumpFile {
    /// Creates a new source that reads from `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SymbolDumpSource for DumpFile {
    fn symbol_dump(&self, binary: &Utf8Path) -> Result<String, SymbolDumpError> {
        tracing::debug!("reading symbol table dump for {binary} from {}", self.path);
        fs_err::read_to_string(&self.path)
            .map_err(|err| DumpReadError::new(&self.path, err).into())
    }
}
