use std::fmt;
use std::path::PathBuf;

use ct_runner::{CheckFailure, CheckOutcome};
use tracing_subscriber::EnvFilter;

mod bazel;
mod config;
mod configure;
mod coverage;
mod headers;
mod license;

pub use config::{CONFIG_FILE_NAME, ROOT_ENV, ToolsConfig, load_config, resolve_root};

const HELP_TEXT: &str = "xtask commands:\n  help\n  check-headers [--root DIR] [--config FILE]\n  check-license [--root DIR] [--config FILE]\n  merge-coverage [--root DIR] [--config FILE]\n  bazel-reporter <test-bin-path> <output-dir>\n  bazel-sharding <test-bin-path> <output-dir>\n  configure-default-reporter <catch2-top-level-dir> <base-build-output-dir>\n  configure-experimental-redirect <catch2-top-level-dir> <base-build-output-dir>";

const BINARY_ARGS: [&str; 2] = ["<test-bin-path>", "<output-dir>"];
const BUILD_ARGS: [&str; 2] = ["<catch2-top-level-dir>", "<base-build-output-dir>"];

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    CheckHeaders(RootArgs),
    CheckLicense(RootArgs),
    MergeCoverage(RootArgs),
    BazelReporter {
        binary: PathBuf,
        output_dir: PathBuf,
    },
    BazelSharding {
        binary: PathBuf,
        output_dir: PathBuf,
    },
    ConfigureDefaultReporter {
        source: PathBuf,
        output_dir: PathBuf,
    },
    ConfigureExperimentalRedirect {
        source: PathBuf,
        output_dir: PathBuf,
    },
}

/// `--root`/`--config` flags shared by the commands that work on a checkout.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RootArgs {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
enum ParseFlagResult {
    Help,
    Args(RootArgs),
}

#[derive(Debug, PartialEq, Eq)]
enum ParsePositionalResult {
    Help,
    Args(PathBuf, PathBuf),
}

#[derive(Debug)]
pub struct XtaskError {
    message: String,
    exit_code: i32,
}

impl XtaskError {
    /// Usage and environment errors exit with 1.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_exit_code(1, message)
    }

    pub fn with_exit_code(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for XtaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for XtaskError {}

impl From<anyhow::Error> for XtaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

impl From<CheckFailure> for XtaskError {
    fn from(failure: CheckFailure) -> Self {
        Self::with_exit_code(failure.exit_code, failure.message)
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

pub fn parse_args<I, S>(args: I) -> Result<Command, XtaskError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = args.into_iter();
    let Some(command) = iter.next() else {
        return Ok(Command::Help);
    };

    match command.as_ref() {
        "help" | "--help" | "-h" => Ok(Command::Help),
        name @ ("check-headers" | "check-license" | "merge-coverage") => {
            let args = match parse_root_flags(&mut iter, name)? {
                ParseFlagResult::Help => return Ok(Command::Help),
                ParseFlagResult::Args(args) => args,
            };
            Ok(match name {
                "check-headers" => Command::CheckHeaders(args),
                "check-license" => Command::CheckLicense(args),
                _ => Command::MergeCoverage(args),
            })
        }
        name @ ("bazel-reporter" | "bazel-sharding") => {
            let (binary, output_dir) = match parse_positional(&mut iter, name, BINARY_ARGS)? {
                ParsePositionalResult::Help => return Ok(Command::Help),
                ParsePositionalResult::Args(first, second) => (first, second),
            };
            Ok(if name == "bazel-reporter" {
                Command::BazelReporter { binary, output_dir }
            } else {
                Command::BazelSharding { binary, output_dir }
            })
        }
        name @ ("configure-default-reporter" | "configure-experimental-redirect") => {
            let (source, output_dir) = match parse_positional(&mut iter, name, BUILD_ARGS)? {
                ParsePositionalResult::Help => return Ok(Command::Help),
                ParsePositionalResult::Args(first, second) => (first, second),
            };
            Ok(if name == "configure-default-reporter" {
                Command::ConfigureDefaultReporter { source, output_dir }
            } else {
                Command::ConfigureExperimentalRedirect { source, output_dir }
            })
        }
        other => Err(XtaskError::new(format!("unknown command: {other}"))),
    }
}

pub fn run<I, S>(args: I) -> Result<(), XtaskError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match parse_args(args)? {
        Command::Help => {
            println!("{HELP_TEXT}");
            Ok(())
        }
        Command::CheckHeaders(args) => headers::run(&args),
        Command::CheckLicense(args) => license::run(&args),
        Command::MergeCoverage(args) => coverage::run(&args),
        Command::BazelReporter { binary, output_dir } => bazel::reporter(&binary, &output_dir),
        Command::BazelSharding { binary, output_dir } => bazel::sharding(&binary, &output_dir),
        Command::ConfigureDefaultReporter { source, output_dir } => {
            configure::default_reporter(&source, &output_dir)
        }
        Command::ConfigureExperimentalRedirect { source, output_dir } => {
            configure::experimental_redirect(&source, &output_dir)
        }
    }
}

pub fn help_text() -> &'static str {
    HELP_TEXT
}

/// Maps a check's outcome onto the CLI result.
pub(crate) fn finish(outcome: CheckOutcome) -> Result<(), XtaskError> {
    match outcome {
        CheckOutcome::Passed => Ok(()),
        CheckOutcome::Failed(failure) => Err(failure.into()),
    }
}

fn parse_root_flags<I, S>(iter: &mut I, command: &str) -> Result<ParseFlagResult, XtaskError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = RootArgs::default();
    while let Some(arg) = iter.next() {
        let (flag, slot) = match arg.as_ref() {
            "--help" | "-h" => return Ok(ParseFlagResult::Help),
            "--root" => ("--root", &mut args.root),
            "--config" => ("--config", &mut args.config),
            other => {
                return Err(XtaskError::new(format!(
                    "unexpected argument for {command}: {other}"
                )));
            }
        };
        if slot.is_some() {
            return Err(XtaskError::new(format!("duplicate {flag} flag")));
        }
        let value = iter
            .next()
            .ok_or_else(|| XtaskError::new(format!("missing value for {flag}")))?;
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(XtaskError::new(format!("missing value for {flag}")));
        }
        if value.starts_with('-') {
            return Err(XtaskError::new(format!("invalid value for {flag}: {value}")));
        }
        *slot = Some(PathBuf::from(value));
    }
    Ok(ParseFlagResult::Args(args))
}

fn parse_positional<I, S>(
    iter: &mut I,
    command: &str,
    names: [&str; 2],
) -> Result<ParsePositionalResult, XtaskError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let mut values = Vec::new();
    for arg in iter {
        match arg.as_ref() {
            "--help" | "-h" => return Ok(ParsePositionalResult::Help),
            value if value.trim().is_empty() => {
                return Err(XtaskError::new(format!(
                    "empty argument for {command}; usage: {command} {} {}",
                    names[0], names[1]
                )));
            }
            value => values.push(PathBuf::from(value)),
        }
    }
    let count = values.len();
    let mut values = values.into_iter();
    match (values.next(), values.next(), values.next()) {
        (Some(first), Some(second), None) => Ok(ParsePositionalResult::Args(first, second)),
        _ => Err(XtaskError::new(format!(
            "{command} expects 2 arguments, got {count}; usage: {command} {} {}",
            names[0], names[1]
        ))),
    }
}
