use std::path::Path;

use ct_runner::bazel::{check_reporter, check_sharding};

use crate::{XtaskError, finish};

pub(crate) fn reporter(binary: &Path, output_dir: &Path) -> Result<(), XtaskError> {
    finish(check_reporter(binary, output_dir)?)
}

pub(crate) fn sharding(binary: &Path, output_dir: &Path) -> Result<(), XtaskError> {
    finish(check_sharding(binary, output_dir)?)
}
