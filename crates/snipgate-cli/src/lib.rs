//! Command-line front end for the `snipgate` safety gate.
//!
//! [`run`] parses arguments, hands the configuration flags to
//! `ortho_config` (defaults, TOML file, `SNIPGATE_*` environment variables,
//! then flags), evaluates the snippet against a PHP environment and maps the
//! outcome onto an exit code:
//!
//! | Outcome                  | Exit code |
//! |--------------------------|-----------|
//! | value printed            | 0         |
//! | usage or configuration   | 1         |
//! | not safe                 | 2         |
//! | syntax error             | 3         |
//! | execution fatal          | 4         |
//! | runtime error            | 5         |
//!
//! With `--expect TYPE` the binary prints `true` or `false` and exits 0.

mod cli;
mod telemetry;

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use snipgate::{Expression, FailureKind};
use ortho_config::{OrthoConfig, OrthoError};
use snipgate_config::Config;
use snipgate_php::{PhpEnvironment, PreludeError};
use thiserror::Error;

use self::cli::{Cli, ExpectedType};
use self::telemetry::TelemetryError;

/// Exit code for usage and configuration errors.
pub const EXIT_USAGE: u8 = 1;
/// Exit code when the snippet uses a forbidden identifier.
pub const EXIT_NOT_SAFE: u8 = 2;
/// Exit code when the snippet is malformed.
pub const EXIT_SYNTAX: u8 = 3;
/// Exit code when the environment cannot evaluate the snippet.
pub const EXIT_FATAL: u8 = 4;
/// Exit code when the snippet raises while running.
pub const EXIT_RUNTIME: u8 = 5;

/// Returns the exit code reported for a failure kind.
#[must_use]
pub const fn exit_code_for(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::NotSafe => EXIT_NOT_SAFE,
        FailureKind::SyntaxError => EXIT_SYNTAX,
        FailureKind::ExecutionFatal => EXIT_FATAL,
        FailureKind::RuntimeError => EXIT_RUNTIME,
    }
}

/// Errors that stop the binary before evaluation starts.
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load configuration: {0}")]
    Config(Arc<OrthoError>),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Prelude(#[from] PreludeError),
    #[error("failed to read snippet from standard input: {0}")]
    Stdin(#[source] Arc<io::Error>),
}

/// Borrowed standard streams.
struct IoStreams<'a, R, W, E> {
    stdin: &'a mut R,
    stdout: &'a mut W,
    stderr: &'a mut E,
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let mut io = IoStreams {
        stdin,
        stdout,
        stderr,
    };
    run_with_streams(args, &mut io)
}

fn run_with_streams<I, R, W, E>(args: I, io: &mut IoStreams<'_, R, W, E>) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_parse_error(&error, io),
    };

    match evaluate(&cli, io) {
        Ok(code) => code,
        Err(error) => {
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn report_parse_error<R, W, E>(error: &clap::Error, io: &mut IoStreams<'_, R, W, E>) -> ExitCode
where
    W: Write,
    E: Write,
{
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(io.stdout, "{error}");
            ExitCode::SUCCESS
        }
        _ => {
            let _ = write!(io.stderr, "{error}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    Config::load_from_iter(cli.config_arguments()).map_err(CliError::Config)
}

fn read_code<R: Read>(code: &str, stdin: &mut R) -> Result<String, CliError> {
    if code != "-" {
        return Ok(code.to_owned());
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(|error| CliError::Stdin(Arc::new(error)))?;
    Ok(buffer)
}

fn evaluate<R, W, E>(cli: &Cli, io: &mut IoStreams<'_, R, W, E>) -> Result<ExitCode, CliError>
where
    R: Read,
    W: Write,
    E: Write,
{
    let config = load_config(cli)?;
    telemetry::initialise(&config)?;

    let mut environment =
        PhpEnvironment::new(&config.php_binary).with_timeout(config.check_timeout());
    if let Some(path) = &config.prelude_path {
        environment = environment.with_prelude_file(path)?;
    }

    let expression = Expression::new(read_code(&cli.code, io.stdin)?)
        .with_allowed_keywords(cli.allowed_keywords.iter().cloned())
        .with_allowed_functions(cli.allowed_functions.iter().cloned())
        .with_allowed_class_names(cli.allowed_classes.iter().cloned());
    let evaluator = environment.evaluator();

    if let Some(expected) = cli.expect {
        let matches = match expected {
            ExpectedType::Boolean => expression.returns_boolean(&evaluator),
            ExpectedType::Integer => expression.returns_integer(&evaluator),
            ExpectedType::Float => expression.returns_float(&evaluator),
            ExpectedType::String => expression.returns_string(&evaluator),
        };
        let _ = writeln!(io.stdout, "{matches}");
        return Ok(ExitCode::SUCCESS);
    }

    match expression.evaluate(&evaluator) {
        Ok(value) => {
            let _ = writeln!(io.stdout, "{value}");
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            let _ = writeln!(io.stderr, "{error}");
            Ok(ExitCode::from(exit_code_for(error.kind())))
        }
    }
}
