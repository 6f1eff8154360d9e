//! Consistency checks for Catch2's convenience headers.
//!
//! Every non-internal folder under `src/catch2` has a `catch_<path>_all.hpp`
//! header (the package root has `catch_all.hpp`) which must include, in
//! sorted order and exactly once each:
//!
//! * every header directly inside the folder,
//! * every header inside its internal subfolders (`detail`, `internal`),
//! * the convenience header of every other subfolder.
//!
//! [`HeaderTreeVerifier`] walks the tree and returns every [`Violation`] it
//! finds; rendering and exit codes are left to the caller.

use serde::{Deserialize, Serialize};

mod include;
mod verify;
mod violation;

pub use include::{aggregate_header_name, parse_include, parse_includes};
pub use verify::HeaderTreeVerifier;
pub use violation::Violation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderLayout {
    /// Folder, relative to the checkout, that include paths are relative to.
    /// Defaults to `src`.
    pub source_dir: String,
    /// Package folder under `source_dir`; also the required include prefix.
    /// Defaults to `catch2`.
    pub package: String,
    /// Subfolder names whose headers are folded into the parent's
    /// convenience header.
    pub internal_dirs: Vec<String>,
    /// Includes that may be left out of a convenience header even though
    /// they live in the folder. They are still subject to the superfluous
    /// check.
    pub optional_includes: Vec<String>,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            package: "catch2".to_string(),
            internal_dirs: vec!["detail".to_string(), "internal".to_string()],
            optional_includes: vec!["catch2/internal/catch_windows_h_proxy.hpp".to_string()],
        }
    }
}

impl HeaderLayout {
    pub fn is_internal(&self, dir_name: &str) -> bool {
        self.internal_dirs.iter().any(|name| name == dir_name)
    }
}
