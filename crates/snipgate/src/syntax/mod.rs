//! Syntax validation delegated to an external checker.
//!
//! The gate does not parse snippets itself. A [`SyntaxChecker`] decides
//! whether a snippet is well formed; the production implementation,
//! [`ProcessSyntaxChecker`], pipes the snippet into a language-native lint
//! command (such as `php -l`) and interprets its exit status.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::process::{ProcessCommand, ProcessError, run_piped};

/// Tracing target for syntax checks.
const SYNTAX_TARGET: &str = "snipgate::syntax";

/// Errors reported by a syntax check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The snippet is malformed.
    #[error("snippet is malformed: {diagnostic}")]
    Malformed {
        /// Diagnostic text reported by the checker, verbatim.
        diagnostic: String,
    },

    /// The checker could not be launched.
    #[error("syntax checker {} could not be launched: {source}", program.display())]
    Unavailable {
        /// Checker program.
        program: PathBuf,
        /// Underlying spawn error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The checker did not finish before the configured deadline.
    #[error("syntax checker {} did not finish within {timeout:?}", program.display())]
    TimedOut {
        /// Checker program.
        program: PathBuf,
        /// Deadline that expired.
        timeout: Duration,
    },

    /// Communication with the checker failed.
    #[error("I/O error communicating with syntax checker {}: {source}", program.display())]
    Io {
        /// Checker program.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl From<ProcessError> for CheckError {
    fn from(error: ProcessError) -> Self {
        match error {
            ProcessError::Launch { program, source } => Self::Unavailable { program, source },
            ProcessError::TimedOut { program, timeout } => Self::TimedOut { program, timeout },
            ProcessError::Io { program, source } => Self::Io { program, source },
        }
    }
}

/// Decides whether a snippet is syntactically well formed.
pub trait SyntaxChecker {
    /// Checks `code`, returning `Ok(())` when it is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Malformed`] for syntax errors and the other
    /// variants when the checker itself cannot do its job.
    fn check(&self, code: &str) -> Result<(), CheckError>;
}

impl<T: SyntaxChecker + ?Sized> SyntaxChecker for &T {
    fn check(&self, code: &str) -> Result<(), CheckError> {
        (**self).check(code)
    }
}

/// Runs an external lint command over the snippet.
///
/// The checker writes `<prologue><code>` to the command's stdin, closes it,
/// and waits for the command to exit. Exit status zero means well formed;
/// any other status is a syntax error whose diagnostic is the command's
/// stderr (or stdout, when stderr is blank).
///
/// # Example
///
/// ```no_run
/// use snipgate::{ProcessCommand, ProcessSyntaxChecker, SyntaxChecker};
///
/// let checker = ProcessSyntaxChecker::new(ProcessCommand::new("php").arg("-l"))
///     .with_prologue("<?php ");
/// assert!(checker.check("return 1 + 1;").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ProcessSyntaxChecker {
    command: ProcessCommand,
    prologue: String,
    timeout: Option<Duration>,
}

impl ProcessSyntaxChecker {
    /// Creates a checker with no prologue and no timeout.
    #[must_use]
    pub const fn new(command: ProcessCommand) -> Self {
        Self {
            command,
            prologue: String::new(),
            timeout: None,
        }
    }

    /// Sets the text written before the snippet.
    #[must_use]
    pub fn with_prologue(mut self, prologue: impl Into<String>) -> Self {
        self.prologue = prologue.into();
        self
    }

    /// Bounds how long the checker may run before it is killed.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the checker command.
    #[must_use]
    pub const fn command(&self) -> &ProcessCommand {
        &self.command
    }

    /// Returns the prologue written before the snippet.
    #[must_use]
    pub fn prologue(&self) -> &str {
        &self.prologue
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl SyntaxChecker for ProcessSyntaxChecker {
    fn check(&self, code: &str) -> Result<(), CheckError> {
        let mut input = String::with_capacity(self.prologue.len() + code.len());
        input.push_str(&self.prologue);
        input.push_str(code);

        let output = run_piped(&self.command, &input, self.timeout)?;
        if output.success() {
            debug!(target: SYNTAX_TARGET, "snippet is well formed");
            return Ok(());
        }

        debug!(
            target: SYNTAX_TARGET,
            status = output.code(),
            "syntax checker rejected snippet"
        );
        Err(CheckError::Malformed {
            diagnostic: output.diagnostic().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests;
