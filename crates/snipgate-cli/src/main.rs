//! CLI entrypoint for the `snipgate` safety gate.
//!
//! The binary delegates to [`snipgate_cli::run`], which loads configuration,
//! validates the snippet against its allow-lists and reports the outcome.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin: StdinLock<'_> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    snipgate_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
