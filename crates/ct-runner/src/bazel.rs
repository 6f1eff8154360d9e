//! Bazel integration: the `XML_OUTPUT_FILE` JUnit reporter and test
//! sharding via `TEST_SHARD_INDEX`/`TEST_TOTAL_SHARDS`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::junit::{JunitReport, TestCaseSummary};
use crate::process::{describe_status, run_captured, run_checked};
use crate::{CheckOutcome, absolute, file_name};

/// Only shard 0 of 2 is run; the fixture binary puts its single passing test
/// there.
pub const SHARD_INDEX: u32 = 0;
pub const TOTAL_SHARDS: u32 = 2;
pub const SHARD_EXPECTED_OUTPUT: &str = "All tests passed (1 assertion in 1 test case)";

/// Runs `binary` with `XML_OUTPUT_FILE` pointing into `output_dir` and checks
/// that the JUnit report agrees with the console summary.
///
/// Exit code 1 from the binary is expected (it has failing test cases); any
/// other failure is an error.
pub fn check_reporter(binary: &Path, output_dir: &Path) -> Result<CheckOutcome> {
    let binary = absolute(binary)?;
    let output_dir = absolute(output_dir)?;
    let bin_name = file_name(&binary)?;
    let xml_path = output_dir.join(format!("{bin_name}.xml"));
    remove_stale(&xml_path)?;

    info!(binary = %binary.display(), xml = %xml_path.display(), "running bazel reporter check");
    let mut cmd = Command::new(&binary);
    cmd.env("XML_OUTPUT_FILE", &xml_path);
    let output = run_captured(&mut cmd)?;
    let tests_passed = match output.status.code() {
        Some(0) => true,
        Some(1) => false,
        _ => bail!(
            "could not run \"{}\"\nReturn code: {}\nstdout: {}\nstderr: {}",
            binary.display(),
            describe_status(output.status),
            output.stdout,
            output.stderr
        ),
    };

    let xml = fs::read_to_string(&xml_path)
        .with_context(|| format!("could not find '{}'", xml_path.display()))?;
    let report = JunitReport::parse(&xml)
        .with_context(|| format!("parse reporter output {}", xml_path.display()))?;
    Ok(evaluate_reporter_run(
        &report,
        bin_name,
        &output.stdout,
        tests_passed,
    ))
}

/// Cross-checks a JUnit report against the console output of the same run.
pub fn evaluate_reporter_run(
    report: &JunitReport,
    bin_name: &str,
    stdout: &str,
    tests_passed: bool,
) -> CheckOutcome {
    if !report.has_testsuite(bin_name) {
        return CheckOutcome::failed(2, format!("Could not find '{bin_name}' testsuite"));
    }

    // The console reporter must still be active next to the JUnit one.
    let Some(summary) = TestCaseSummary::find(stdout) else {
        return CheckOutcome::failed(2, format!("Could not find test summary in {stdout}"));
    };

    if summary.failed == 0 && !tests_passed {
        return CheckOutcome::failed(2, "Expected at least 1 test failure!");
    }
    if report.testcases != summary.total {
        return CheckOutcome::failed(
            2,
            format!(
                "Unexpected number of test cases! ({} in report, {} in summary)",
                report.testcases, summary.total
            ),
        );
    }
    if report.failures != summary.failed {
        return CheckOutcome::failed(
            2,
            format!(
                "Unexpected number of test failures! ({} in report, {} in summary)",
                report.failures, summary.failed
            ),
        );
    }
    if summary.passed + summary.failed != summary.total {
        return CheckOutcome::failed(
            2,
            format!(
                "Something has gone very wrong, ({} + {}) != {}",
                summary.passed, summary.failed, summary.total
            ),
        );
    }
    CheckOutcome::Passed
}

pub fn shard_status_path(binary: &Path, output_dir: &Path) -> Result<PathBuf> {
    Ok(output_dir.join(format!("{}.shard-support", file_name(binary)?)))
}

/// Runs shard 0 of 2 of `binary` under Bazel's sharding protocol and checks
/// that only the selected test ran and the status file was created.
pub fn check_sharding(binary: &Path, output_dir: &Path) -> Result<CheckOutcome> {
    let binary = absolute(binary)?;
    let output_dir = absolute(output_dir)?;
    let status_path = shard_status_path(&binary, &output_dir)?;
    remove_stale(&status_path)?;

    info!(
        binary = %binary.display(),
        status_file = %status_path.display(),
        "running bazel sharding check"
    );
    let mut cmd = Command::new(&binary);
    cmd.env("BAZEL_TEST", "1")
        .env("TEST_SHARD_INDEX", SHARD_INDEX.to_string())
        .env("TEST_TOTAL_SHARDS", TOTAL_SHARDS.to_string())
        .env("TEST_SHARD_STATUS_FILE", &status_path);
    let output = run_checked(&mut cmd)
        .with_context(|| format!("could not run \"{}\"", binary.display()))?;

    if !output.stdout.contains(SHARD_EXPECTED_OUTPUT) {
        return Ok(CheckOutcome::failed(
            1,
            format!(
                "Did not find expected output in stdout.\nstdout:\n{}",
                output.stdout
            ),
        ));
    }
    if !status_path.is_file() {
        return Ok(CheckOutcome::failed(
            2,
            format!(
                "Catch2 did not create expected file at path '{}'",
                status_path.display()
            ),
        ));
    }
    Ok(CheckOutcome::Passed)
}

fn remove_stale(path: &Path) -> Result<()> {
    if path.is_file() {
        info!(path = %path.display(), "removing output from a previous run");
        fs::remove_file(path).with_context(|| format!("remove stale {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CheckOutcome, evaluate_reporter_run};
    use crate::junit::JunitReport;

    fn report(testcases: usize, failures: usize) -> JunitReport {
        JunitReport {
            testsuites: vec!["BazelReporter".to_string()],
            testcases,
            failures,
        }
    }

    fn exit_code(outcome: CheckOutcome) -> Option<i32> {
        match outcome {
            CheckOutcome::Passed => None,
            CheckOutcome::Failed(failure) => Some(failure.exit_code),
        }
    }

    const FAILING_RUN: &str = "test cases: 3 | 2 passed | 1 failed\n";

    #[test]
    fn consistent_failing_run_passes() {
        let outcome = evaluate_reporter_run(&report(3, 1), "BazelReporter", FAILING_RUN, false);
        assert_eq!(outcome, CheckOutcome::Passed);
    }

    #[test]
    fn missing_testsuite_fails() {
        let outcome = evaluate_reporter_run(&report(3, 1), "SelfTest", FAILING_RUN, false);
        match outcome {
            CheckOutcome::Failed(failure) => {
                assert_eq!(failure.exit_code, 2);
                assert_eq!(failure.message, "Could not find 'SelfTest' testsuite");
            }
            CheckOutcome::Passed => panic!("expected failure"),
        }
    }

    #[test]
    fn missing_summary_fails() {
        let outcome = evaluate_reporter_run(
            &report(3, 0),
            "BazelReporter",
            "All tests passed (3 assertions in 3 test cases)\n",
            true,
        );
        assert_eq!(exit_code(outcome), Some(2));
    }

    #[test]
    fn failing_exit_without_failures_fails() {
        let outcome = evaluate_reporter_run(
            &report(3, 0),
            "BazelReporter",
            "test cases: 3 | 3 passed | 0 failed\n",
            false,
        );
        assert_eq!(exit_code(outcome), Some(2));
    }

    #[test]
    fn count_mismatches_fail() {
        let wrong_cases = evaluate_reporter_run(&report(2, 1), "BazelReporter", FAILING_RUN, false);
        assert_eq!(exit_code(wrong_cases), Some(2));

        let wrong_failures =
            evaluate_reporter_run(&report(3, 2), "BazelReporter", FAILING_RUN, false);
        assert_eq!(exit_code(wrong_failures), Some(2));

        let inconsistent = evaluate_reporter_run(
            &report(4, 1),
            "BazelReporter",
            "test cases: 4 | 2 passed | 1 failed\n",
            false,
        );
        match inconsistent {
            CheckOutcome::Failed(failure) => {
                assert_eq!(failure.message, "Something has gone very wrong, (2 + 1) != 4");
            }
            CheckOutcome::Passed => panic!("expected failure"),
        }
    }
}
