//! Checks that every C++ source file starts with the project's license
//! preamble.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ct_paths::{NormalizedPath, RelativePath};
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// The exact first seven lines of every Catch2 source file.
pub const CATCH2_PREAMBLE: &str = "
//              Copyright Catch2 Authors
// Distributed under the Boost Software License, Version 1.0.
//   (See accompanying file LICENSE.txt or copy at
//        https://www.boost.org/LICENSE_1_0.txt)

// SPDX-License-Identifier: BSL-1.0
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LicenseConfig {
    /// Folders, relative to the checkout, searched recursively.
    pub roots: Vec<String>,
    /// File extensions (without the dot) that must carry the preamble.
    pub extensions: Vec<String>,
    pub preamble: String,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            roots: vec!["src/catch2".to_string(), "tests".to_string()],
            extensions: vec!["cpp".to_string(), "hpp".to_string()],
            preamble: CATCH2_PREAMBLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseReport {
    checked: usize,
    failures: Vec<NormalizedPath>,
}

impl LicenseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    /// Files without a proper preamble, relative to the checkout.
    pub fn failures(&self) -> &[NormalizedPath] {
        &self.failures
    }
}

/// Whether `text` starts with `preamble`, compared line by line.
///
/// Only as many lines as the preamble has are looked at, and `\r\n` line
/// endings count as `\n`.
pub fn has_preamble(text: &str, preamble: &str) -> bool {
    let line_count = preamble.split_inclusive('\n').count();
    let head: String = text
        .split_inclusive('\n')
        .take(line_count)
        .map(|line| match line.strip_suffix("\r\n") {
            Some(stripped) => format!("{stripped}\n"),
            None => line.to_string(),
        })
        .collect();
    head == preamble
}

/// Every file under the configured roots with a configured extension,
/// root by root, in name order. Roots that do not exist are skipped.
pub fn collect_sources(checkout: &Path, config: &LicenseConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in &config.roots {
        let root = checkout.join(root);
        if !root.is_dir() {
            debug!(root = %root.display(), "license root missing, skipping");
            continue;
        }
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker {
            let entry = entry.with_context(|| format!("read entry in {}", root.display()))?;
            if entry.file_type().is_file() && has_extension(entry.path(), &config.extensions) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

pub fn check_licenses(checkout: &Path, config: &LicenseConfig) -> Result<LicenseReport> {
    let mut report = LicenseReport::default();
    for path in collect_sources(checkout, config)? {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("read source file {}", path.display()))?;
        report.checked += 1;
        if !has_preamble(&text, &config.preamble) {
            let display = match RelativePath::from_fs(checkout, &path) {
                Some(relative) => NormalizedPath::new(relative.as_str()),
                None => NormalizedPath::from_path(&path),
            };
            report.failures.push(display);
        }
    }
    debug!(
        checked = report.checked,
        failed = report.failures.len(),
        "license check finished"
    );
    Ok(report)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}
