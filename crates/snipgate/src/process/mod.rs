//! Subprocess execution with piped standard streams.
//!
//! [`run_piped`] spawns an external tool, writes the supplied input to its
//! stdin, drains stdout and stderr, and waits for the process to exit. The
//! three streams are serviced by scoped threads so a chatty child can never
//! deadlock on a full pipe buffer, every handle is released on every exit
//! path, and the child is always reaped, including after a timeout kill.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

/// Tracing target for subprocess operations.
const PROCESS_TARGET: &str = "snipgate::process";

/// Interval between exit polls while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Program and arguments describing an external tool invocation.
///
/// # Example
///
/// ```
/// use snipgate::process::ProcessCommand;
///
/// let command = ProcessCommand::new("php").arg("-l");
/// assert_eq!(command.program().to_str(), Some("php"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessCommand {
    /// Creates a command for the given program with no arguments.
    ///
    /// Bare program names are resolved through `PATH` at spawn time.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments in order.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the program path or name.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the arguments passed to the program.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl ProcessOutput {
    /// Returns `true` when the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Returns the exit code, or `None` when the process was killed by a
    /// signal.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Everything the process wrote to stdout, lossily decoded as UTF-8.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Everything the process wrote to stderr, lossily decoded as UTF-8.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Returns the diagnostic stream: stderr, or stdout when stderr is blank.
    ///
    /// Some tools report problems on stdout (PHP's CLI does unless
    /// `display_errors` is redirected), so an empty stderr falls back to the
    /// other stream rather than losing the message.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Errors raised while running a subprocess.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to launch {}: {source}", program.display())]
    Launch {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying spawn error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The program did not exit before the deadline and was killed.
    #[error("{} did not exit within {timeout:?}", program.display())]
    TimedOut {
        /// Program that was killed.
        program: PathBuf,
        /// Deadline that expired.
        timeout: Duration,
    },

    /// Reading from or writing to the child's pipes failed.
    #[error("I/O error communicating with {}: {source}", program.display())]
    Io {
        /// Program whose pipes failed.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl ProcessError {
    fn io(program: &Path, source: io::Error) -> Self {
        Self::Io {
            program: program.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

/// Runs `command`, feeding `input` on stdin, and returns its captured output.
///
/// Stdin is closed as soon as the input has been written so tools that read
/// to end-of-file terminate. When `timeout` is set the child is killed and
/// reaped once it expires; without a timeout the call blocks until exit.
///
/// A child that exits without consuming its input is not an error: the
/// resulting broken pipe is ignored.
///
/// # Errors
///
/// Returns [`ProcessError::Launch`] when the program cannot be spawned,
/// [`ProcessError::TimedOut`] when the deadline expires, and
/// [`ProcessError::Io`] when a pipe fails.
pub fn run_piped(
    command: &ProcessCommand,
    input: &str,
    timeout: Option<Duration>,
) -> Result<ProcessOutput, ProcessError> {
    let program = command.program();

    debug!(
        target: PROCESS_TARGET,
        program = %program.display(),
        input_bytes = input.len(),
        "spawning process"
    );

    let mut child = Command::new(program)
        .args(command.arguments())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Launch {
            program: program.to_path_buf(),
            source: Arc::new(source),
        })?;

    let child_stdin = child.stdin.take();
    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();

    thread::scope(|scope| {
        let writer = scope.spawn(move || write_input(child_stdin, input));
        let stdout_reader = scope.spawn(move || drain(child_stdout));
        let stderr_reader = scope.spawn(move || drain(child_stderr));

        let exit = wait_for_exit(program, &mut child, timeout);
        let written = join_stream(writer);
        let captured_stdout = join_stream(stdout_reader);
        let captured_stderr = join_stream(stderr_reader);

        let status = exit?;
        written.map_err(|err| ProcessError::io(program, err))?;
        let stdout = captured_stdout.map_err(|err| ProcessError::io(program, err))?;
        let stderr = captured_stderr.map_err(|err| ProcessError::io(program, err))?;

        debug!(
            target: PROCESS_TARGET,
            program = %program.display(),
            ?status,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "process exited"
        );

        Ok(ProcessOutput {
            status,
            stdout,
            stderr,
        })
    })
}

/// Writes the input to the child's stdin and closes it.
fn write_input(stdin: Option<ChildStdin>, input: &str) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input.as_bytes()).and_then(|()| stdin.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
    // Stdin is dropped here, closing the pipe to signal end of input.
}

/// Reads a stream to end-of-file.
fn drain(stream: Option<impl Read>) -> io::Result<String> {
    let Some(mut reader) = stream else {
        return Ok(String::new());
    };
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn join_stream<T>(handle: ScopedJoinHandle<'_, io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("stream thread panicked")))
}

/// Waits for the child to exit, killing and reaping it if the timeout expires.
fn wait_for_exit(
    program: &Path,
    child: &mut Child,
    timeout: Option<Duration>,
) -> Result<ExitStatus, ProcessError> {
    let Some(timeout) = timeout else {
        return child.wait().map_err(|err| ProcessError::io(program, err));
    };

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if start.elapsed() > timeout => {
                warn!(
                    target: PROCESS_TARGET,
                    program = %program.display(),
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "process timed out, killing it"
                );
                reap(child);
                return Err(ProcessError::TimedOut {
                    program: program.to_path_buf(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                reap(child);
                return Err(ProcessError::io(program, err));
            }
        }
    }
}

fn reap(child: &mut Child) {
    drop(child.kill());
    drop(child.wait());
}

#[cfg(test)]
mod tests;
