use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ct_headers::HeaderLayout;
use ct_license::LicenseConfig;
use ct_runner::coverage::CoverageConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RootArgs;

/// Looked up in the checkout root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "catch-tools.json";
/// Names the Catch2 checkout when `--root` is not given.
pub const ROOT_ENV: &str = "CATCH_ROOT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolsConfig {
    pub headers: HeaderLayout,
    pub license: LicenseConfig,
    pub coverage: CoverageConfig,
}

/// `--root`, then `$CATCH_ROOT`, then the current directory.
pub fn resolve_root(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root.to_path_buf());
    }
    if let Some(root) = std::env::var_os(ROOT_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    std::env::current_dir().context("read current directory")
}

/// Reads `explicit`, or `<root>/catch-tools.json` if it exists. Missing
/// sections and fields keep their defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ToolsConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = root.join(CONFIG_FILE_NAME);
            if !path.is_file() {
                debug!(root = %root.display(), "no config file, using defaults");
                return Ok(ToolsConfig::default());
            }
            path
        }
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub(crate) fn load(args: &RootArgs) -> Result<(PathBuf, ToolsConfig)> {
    let root = resolve_root(args.root.as_deref())?;
    let config = load_config(&root, args.config.as_deref())?;
    Ok((root, config))
}
