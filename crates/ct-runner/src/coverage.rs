//! Merges per-test OpenCppCoverage binary reports into one Cobertura file.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;
use walkdir::WalkDir;

use crate::process::run_checked;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverageConfig {
    pub tool: String,
    /// Folder, relative to the checkout, holding the per-test reports.
    pub input_dir: String,
    pub input_prefix: String,
    pub input_extension: String,
    /// Value of OpenCppCoverage's `--export_type`.
    pub export: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            tool: "OpenCppCoverage".to_string(),
            input_dir: "tests".to_string(),
            input_prefix: "cov-report".to_string(),
            input_extension: "bin".to_string(),
            export: "cobertura:cobertura.xml".to_string(),
        }
    }
}

/// Coverage reports under `root`, as paths relative to `root`, sorted.
pub fn collect_reports(root: &Path, config: &CoverageConfig) -> Result<Vec<PathBuf>> {
    let input_dir = root.join(&config.input_dir);
    if !input_dir.is_dir() {
        return Ok(Vec::new());
    }
    let suffix = format!(".{}", config.input_extension);
    let mut reports = Vec::new();
    for entry in WalkDir::new(&input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("read entry in {}", input_dir.display()))?;
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if entry.file_type().is_file()
            && name.starts_with(&config.input_prefix)
            && name.ends_with(&suffix)
        {
            reports.push(Path::new(&config.input_dir).join(name));
        }
    }
    Ok(reports)
}

pub fn merge_command(root: &Path, config: &CoverageConfig, reports: &[PathBuf]) -> Command {
    let mut cmd = Command::new(&config.tool);
    cmd.current_dir(root)
        .arg("--quiet")
        .arg(format!("--export_type={}", config.export));
    for report in reports {
        cmd.arg(format!("--input_coverage={}", report.display()));
    }
    cmd
}

/// Merges every report found under `root`; returns how many were merged.
pub fn merge_coverage(root: &Path, config: &CoverageConfig) -> Result<usize> {
    let reports = collect_reports(root, config)?;
    if reports.is_empty() {
        bail!(
            "no coverage reports matching {}/{}*.{} under {}",
            config.input_dir,
            config.input_prefix,
            config.input_extension,
            root.display()
        );
    }
    info!(reports = reports.len(), tool = %config.tool, "merging coverage reports");
    run_checked(&mut merge_command(root, config, &reports))
        .with_context(|| format!("{} failed to merge coverage", config.tool))?;
    Ok(reports.len())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{CoverageConfig, merge_command};

    #[test]
    fn command_lists_every_report() {
        let reports = vec![
            PathBuf::from("tests/cov-report0.bin"),
            PathBuf::from("tests/cov-report1.bin"),
        ];
        let cmd = merge_command(Path::new("/catch"), &CoverageConfig::default(), &reports);
        let args: Vec<String> = cmd
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        assert_eq!(cmd.get_program(), "OpenCppCoverage");
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/catch")));
        assert_eq!(
            args,
            vec![
                "--quiet".to_string(),
                "--export_type=cobertura:cobertura.xml".to_string(),
                format!("--input_coverage={}", reports[0].display()),
                format!("--input_coverage={}", reports[1].display()),
            ]
        );
    }
}
