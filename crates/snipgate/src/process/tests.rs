//! Unit tests for the piped subprocess runner.

use std::time::{Duration, Instant};

use rstest::rstest;

use super::*;

fn shell(script: &str) -> ProcessCommand {
    ProcessCommand::new("/bin/sh").arg("-c").arg(script)
}

#[test]
fn input_is_forwarded_to_stdin() {
    let output = run_piped(&shell("cat"), "echo from stdin", None).expect("run cat");
    assert!(output.success());
    assert_eq!(output.stdout(), "echo from stdin");
    assert_eq!(output.stderr(), "");
}

#[test]
fn stderr_and_exit_code_are_captured() {
    let output = run_piped(
        &shell("cat > /dev/null; echo 'bad token' >&2; exit 3"),
        "input",
        None,
    )
    .expect("run failing script");
    assert!(!output.success());
    assert_eq!(output.code(), Some(3));
    assert_eq!(output.stderr(), "bad token\n");
    assert_eq!(output.diagnostic(), "bad token\n");
}

#[test]
fn diagnostic_falls_back_to_stdout_when_stderr_is_blank() {
    let output = run_piped(&shell("echo 'parse error on stdout'; exit 255"), "", None)
        .expect("run script");
    assert_eq!(output.diagnostic(), "parse error on stdout\n");
}

#[test]
fn unread_input_is_not_an_error() {
    let large = "x".repeat(256 * 1024);
    let output = run_piped(&shell("exit 0"), &large, None).expect("run script");
    assert!(output.success());
}

#[rstest]
#[case::absolute("/nonexistent/snipgate-tool")]
#[case::bare("snipgate-tool-that-does-not-exist")]
fn missing_program_is_a_launch_error(#[case] program: &str) {
    let err = run_piped(&ProcessCommand::new(program), "", None).expect_err("launch fails");
    assert!(
        matches!(err, ProcessError::Launch { .. }),
        "expected launch error, got {err:?}"
    );
    assert!(err.to_string().contains(program), "message: {err}");
}

#[test]
fn timeout_kills_and_reaps_the_child() {
    let start = Instant::now();
    let err = run_piped(
        &shell("exec sleep 5"),
        "",
        Some(Duration::from_millis(100)),
    )
    .expect_err("should time out");
    assert!(
        matches!(err, ProcessError::TimedOut { .. }),
        "expected timeout, got {err:?}"
    );
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[test]
fn fast_process_finishes_within_timeout() {
    let output = run_piped(&shell("cat"), "ok", Some(Duration::from_secs(10)))
        .expect("run within timeout");
    assert_eq!(output.stdout(), "ok");
}

#[test]
fn command_builder_collects_arguments() {
    let command = ProcessCommand::new("php")
        .arg("-d")
        .args(["display_errors=stderr", "-l"]);
    assert_eq!(command.program(), Path::new("php"));
    assert_eq!(command.arguments().len(), 3);
}
