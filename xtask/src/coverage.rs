use anyhow::Context;
use ct_runner::coverage::merge_coverage;
use tracing::info;

use crate::{RootArgs, XtaskError, config};

pub(crate) fn run(args: &RootArgs) -> Result<(), XtaskError> {
    let (root, config) = config::load(args)?;
    let merged = merge_coverage(&root, &config.coverage)
        .with_context(|| format!("merge coverage under {}", root.display()))?;
    info!(merged, export = %config.coverage.export, "coverage merged");
    Ok(())
}
