use anyhow::Context;
use ct_license::check_licenses;
use tracing::info;

use crate::{RootArgs, XtaskError, config};

pub(crate) fn run(args: &RootArgs) -> Result<(), XtaskError> {
    let (root, config) = config::load(args)?;
    let report = check_licenses(&root, &config.license)
        .with_context(|| format!("check licenses under {}", root.display()))?;
    info!(checked = report.checked(), "license check finished");
    if report.is_clean() {
        return Ok(());
    }

    for path in report.failures() {
        println!("File {path} does not have proper licence");
    }
    println!("{} files are missing licence", report.failures().len());
    Err(XtaskError::new("license check failed"))
}
