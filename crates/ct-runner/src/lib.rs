//! Drives Catch2 builds and binaries and asserts on what they produce.
//!
//! Every check returns `anyhow::Result<CheckOutcome>`: an `Err` means the
//! check could not run (cmake missing, binary crashed, unreadable output),
//! while `CheckOutcome::Failed` means it ran and Catch2 misbehaved.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

pub mod bazel;
pub mod configure;
pub mod coverage;
pub mod junit;
pub mod process;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    /// Process exit code the CLI should report.
    pub exit_code: i32,
    pub message: String,
}

impl CheckFailure {
    pub fn new(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Failed(CheckFailure),
}

impl CheckOutcome {
    pub fn failed(exit_code: i32, message: impl Into<String>) -> Self {
        Self::Failed(CheckFailure::new(exit_code, message))
    }
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolve absolute path {}", path.display()))
}

pub(crate) fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("{} has no UTF-8 file name", path.display()))
}
