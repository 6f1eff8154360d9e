use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use ct_paths::{NormalizedPath, RelativePath};
use tracing::debug;
use walkdir::WalkDir;

use crate::include::{aggregate_header_name, parse_includes};
use crate::{HeaderLayout, Violation};

/// Walks the package folder and checks every convenience header.
pub struct HeaderTreeVerifier<'a> {
    layout: &'a HeaderLayout,
    package_root: PathBuf,
    optional_includes: HashSet<String>,
}

#[derive(Debug, Default)]
struct FolderEntries {
    headers: Vec<String>,
    subfolders: Vec<String>,
}

impl<'a> HeaderTreeVerifier<'a> {
    /// `checkout` is the top-level Catch2 directory; the package root is
    /// `checkout/<source_dir>/<package>`.
    pub fn new(checkout: &Path, layout: &'a HeaderLayout) -> Self {
        let package_root = checkout.join(&layout.source_dir).join(&layout.package);
        let optional_includes = layout
            .optional_includes
            .iter()
            .map(|include| NormalizedPath::new(include).as_str().to_string())
            .collect();
        Self {
            layout,
            package_root,
            optional_includes,
        }
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    /// Checks the whole tree, depth first, subfolders in name order.
    pub fn verify(&self) -> Result<Vec<Violation>> {
        if !self.package_root.is_dir() {
            bail!(
                "package root {} is not a directory",
                self.package_root.display()
            );
        }
        let mut violations = Vec::new();
        self.walk(&self.package_root, &mut violations)?;
        Ok(violations)
    }

    fn walk(&self, dir: &Path, violations: &mut Vec<Violation>) -> Result<()> {
        violations.extend(self.verify_directory(dir)?);
        for subfolder in read_folder(dir)?.subfolders {
            if !self.layout.is_internal(&subfolder) {
                self.walk(&dir.join(subfolder), violations)?;
            }
        }
        Ok(())
    }

    /// Checks the convenience header of a single folder.
    pub fn verify_directory(&self, dir: &Path) -> Result<Vec<Violation>> {
        let relative = RelativePath::from_fs(&self.package_root, dir).ok_or_else(|| {
            anyhow!(
                "{} is not inside {}",
                dir.display(),
                self.package_root.display()
            )
        })?;
        let header_name = aggregate_header_name(&relative);
        let header_path = dir.join(&header_name);
        debug!(folder = %relative, header = %header_name, "verifying convenience header");

        let mut violations = Vec::new();
        if !header_path.is_file() {
            violations.push(Violation::MissingHeader {
                path: NormalizedPath::from_path(&header_path),
            });
            return Ok(violations);
        }

        let text = fs::read_to_string(&header_path)
            .with_context(|| format!("read convenience header {}", header_path.display()))?;
        let includes = parse_includes(&text, &self.layout.package);

        if includes.windows(2).any(|pair| pair[0] > pair[1]) {
            violations.push(Violation::UnsortedIncludes {
                header: header_name.clone(),
            });
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for include in &includes {
            if !seen.insert(include.as_str()) && reported.insert(include.as_str()) {
                violations.push(Violation::DuplicateInclude {
                    header: header_name.clone(),
                    include: include.clone(),
                });
            }
        }

        let include_dir = self.include_dir(&relative);
        let own_include = include_dir.join(&header_name);
        let expected = self.expected_includes(dir, &include_dir, own_include.as_str())?;
        for include in &expected {
            if !seen.contains(include.as_str()) && !self.optional_includes.contains(include) {
                violations.push(Violation::MissingInclude {
                    header: header_name.clone(),
                    include: include.clone(),
                });
            }
        }

        for include in &includes {
            if !expected.contains(include) && include.as_str() != own_include.as_str() {
                violations.push(Violation::SuperfluousInclude {
                    header: header_name.clone(),
                    include: include.clone(),
                });
            }
        }

        Ok(violations)
    }

    /// How headers in the folder are spelled in an include (`catch2/...`).
    fn include_dir(&self, relative: &RelativePath) -> NormalizedPath {
        let package = NormalizedPath::new(&self.layout.package);
        if relative.is_root() {
            package
        } else {
            package.join(relative.as_str())
        }
    }

    /// The includes a folder's convenience header must contain, relative to
    /// the source dir. `own_include` is the header itself and never expected.
    fn expected_includes(
        &self,
        dir: &Path,
        include_dir: &NormalizedPath,
        own_include: &str,
    ) -> Result<BTreeSet<String>> {
        let entries = read_folder(dir)?;
        let mut expected: BTreeSet<String> = entries
            .headers
            .iter()
            .map(|header| include_dir.join(header).as_str().to_string())
            .collect();

        for subfolder in &entries.subfolders {
            let subfolder_dir = include_dir.join(subfolder);
            if self.layout.is_internal(subfolder) {
                for header in read_folder(&dir.join(subfolder))?.headers {
                    expected.insert(subfolder_dir.join(header).as_str().to_string());
                }
            } else {
                let child = RelativePath::from_fs(&self.package_root, &dir.join(subfolder))
                    .ok_or_else(|| anyhow!("non UTF-8 folder name under {}", dir.display()))?;
                let child_header = aggregate_header_name(&child);
                expected.insert(subfolder_dir.join(child_header).as_str().to_string());
            }
        }

        expected.remove(own_include);
        Ok(expected)
    }
}

/// Headers and subfolders directly inside `dir`, sorted by name. Hidden
/// entries are skipped.
fn read_folder(dir: &Path) -> Result<FolderEntries> {
    let mut entries = FolderEntries::default();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| anyhow!("non UTF-8 entry in {}", entry.path().display()))?;
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type().is_dir() {
            entries.subfolders.push(name.to_string());
        } else if entry.file_type().is_file() && name.ends_with(".hpp") {
            entries.headers.push(name.to_string());
        }
    }
    Ok(entries)
}
