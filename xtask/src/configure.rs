use std::path::Path;

use ct_runner::configure::{DEFAULT_REPORTER, EXPERIMENTAL_REDIRECT};

use crate::{XtaskError, finish};

pub(crate) fn default_reporter(source: &Path, output_dir: &Path) -> Result<(), XtaskError> {
    finish(DEFAULT_REPORTER.run(source, output_dir)?)
}

pub(crate) fn experimental_redirect(source: &Path, output_dir: &Path) -> Result<(), XtaskError> {
    finish(EXPERIMENTAL_REDIRECT.run(source, output_dir)?)
}
