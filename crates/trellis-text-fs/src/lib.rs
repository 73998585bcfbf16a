// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `TextSink` for Trellis sessions.

use std::fs;
use std::path::{Path, PathBuf};

use trellis_session::{SinkError, TextSink, TextUpdate};

/// Writes the authoritative document text to a file on every persist.
pub struct FsTextSink {
    path: PathBuf,
}

impl FsTextSink {
    /// Creates a sink targeting `path`. Parent directories are created
    /// on first persist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The target file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSink for FsTextSink {
    fn persist(&mut self, update: TextUpdate<'_>) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, update.text)?;
        Ok(())
    }
}
