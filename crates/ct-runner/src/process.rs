use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

/// CMake configuration every helper builds and runs.
pub const BUILD_CONFIG: &str = "Debug";

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

pub fn configure_command(source: &Path, build_dir: &Path, options: &[(&str, &str)]) -> Command {
    let mut cmd = Command::new("cmake");
    cmd.arg(format!("-B{}", build_dir.display()))
        .arg(format!("-H{}", source.display()))
        .arg(format!("-DCMAKE_BUILD_TYPE={BUILD_CONFIG}"))
        .arg("-DCATCH_DEVELOPMENT_BUILD=ON");
    for (option, value) in options {
        cmd.arg(format!("-D{option}={value}"));
    }
    cmd
}

pub fn build_command(build_dir: &Path) -> Command {
    let mut cmd = Command::new("cmake");
    cmd.arg("--build")
        .arg(build_dir)
        .args(["--config", BUILD_CONFIG]);
    cmd
}

/// Configures a development build of `source` into `build_dir` with the extra
/// `-D` options, then builds it.
pub fn configure_and_build(source: &Path, build_dir: &Path, options: &[(&str, &str)]) -> Result<()> {
    run_checked(&mut configure_command(source, build_dir, options)).with_context(|| {
        format!(
            "could not configure build to '{}' from '{}'",
            build_dir.display(),
            source.display()
        )
    })?;
    info!(build_dir = %build_dir.display(), "configuring finished");

    run_checked(&mut build_command(build_dir))
        .with_context(|| format!("could not build project in '{}'", build_dir.display()))?;
    info!(build_dir = %build_dir.display(), "building finished");
    Ok(())
}

/// Where a multi-config generator (MSBuild on Windows) puts `binary`.
pub fn binary_path(base: &Path, binary: &str) -> PathBuf {
    if cfg!(windows) {
        base.join(BUILD_CONFIG).join(binary)
    } else {
        base.join(binary)
    }
}

/// Runs a built binary and returns its `(stdout, stderr)`; a non-zero exit
/// is an error.
pub fn run_and_return_output(base: &Path, binary: &str, args: &[&str]) -> Result<(String, String)> {
    let path = binary_path(base, binary);
    let mut cmd = Command::new(&path);
    cmd.args(args);
    let output = run_checked(&mut cmd)
        .with_context(|| format!("could not run \"{}\" with args {args:?}", path.display()))?;
    Ok((output.stdout, output.stderr))
}

/// Runs `cmd` to completion with both streams captured.
pub fn run_captured(cmd: &mut Command) -> Result<ProcessOutput> {
    let description = describe(cmd);
    debug!(command = %description, "spawning");
    let output = cmd
        .output()
        .with_context(|| format!("failed to run {description}"))?;
    Ok(ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Like [`run_captured`], but a non-zero exit is an error carrying the
/// return code and both streams.
pub fn run_checked(cmd: &mut Command) -> Result<ProcessOutput> {
    let output = run_captured(cmd)?;
    if !output.status.success() {
        bail!(
            "{} failed\nReturn code: {}\nstdout: {}\nstderr: {}",
            describe(cmd),
            describe_status(output.status),
            output.stdout,
            output.stderr
        );
    }
    Ok(output)
}

pub fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|arg| arg.to_string_lossy().into_owned()));
    parts.join(" ")
}
