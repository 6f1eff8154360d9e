//! Checks that CMake configure options reach the built SelfTest binary.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::process::{configure_and_build, run_and_return_output};
use crate::{CheckOutcome, absolute};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureCheck {
    pub name: &'static str,
    /// Build folder under `<output>/CMakeConfigTests`.
    pub build_subdir: &'static str,
    pub options: &'static [(&'static str, &'static str)],
    pub selftest_args: &'static [&'static str],
    /// Text that must appear verbatim in SelfTest's stdout.
    pub required_output: &'static str,
}

pub const DEFAULT_REPORTER: ConfigureCheck = ConfigureCheck {
    name: "default-reporter",
    build_subdir: "DefaultReporter",
    options: &[("CATCH_CONFIG_DEFAULT_REPORTER", "xml")],
    selftest_args: &["[approx][custom]"],
    required_output: "</Catch2TestRun>",
};

/// With the experimental redirect, output from `printf` must land inside the
/// XML reporter's `<StdOut>` element.
pub const EXPERIMENTAL_REDIRECT: ConfigureCheck = ConfigureCheck {
    name: "experimental-redirect",
    build_subdir: "ExperimentalRedirect",
    options: &[("CATCH_CONFIG_EXPERIMENTAL_REDIRECT", "ON")],
    selftest_args: &["-r", "xml", "\"has printf\""],
    required_output: "      <StdOut>\nloose text artifact\n      </StdOut>\n",
};

impl ConfigureCheck {
    pub fn build_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join("CMakeConfigTests").join(self.build_subdir)
    }

    /// Configures and builds `source` with this check's options, runs
    /// `tests/SelfTest` and looks for the required output.
    pub fn run(&self, source: &Path, output_root: &Path) -> Result<CheckOutcome> {
        let source = absolute(source)?;
        let build_dir = self.build_dir(&absolute(output_root)?);
        info!(check = self.name, build_dir = %build_dir.display(), "configure check");

        configure_and_build(&source, &build_dir, self.options)?;
        let (stdout, _) =
            run_and_return_output(&build_dir.join("tests"), "SelfTest", self.selftest_args)?;
        Ok(self.evaluate(&stdout))
    }

    pub fn evaluate(&self, stdout: &str) -> CheckOutcome {
        if stdout.contains(self.required_output) {
            return CheckOutcome::Passed;
        }
        CheckOutcome::failed(
            2,
            format!(
                "Could not find '{}' in the stdout\nstdout: \"{stdout}\"",
                self.required_output
            ),
        )
    }
}
