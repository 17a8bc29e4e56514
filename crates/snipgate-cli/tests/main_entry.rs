//! Integration tests for the `snipgate` binary entry point.
//!
//! Verifies exit codes and user-facing error output for paths that do not
//! depend on a working PHP installation.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_succeeds() {
    let mut command = cargo_bin_cmd!("snipgate");
    command.arg("--help");
    command.assert().success().stdout(contains("--allow-function"));
}

#[test]
fn missing_code_exits_with_usage_error() {
    let mut command = cargo_bin_cmd!("snipgate");
    command.assert().code(1).stderr(contains("CODE"));
}

#[test]
fn missing_interpreter_exits_with_fatal_code() {
    let mut command = cargo_bin_cmd!("snipgate");
    command
        .env_remove("SNIPGATE_PHP_BINARY")
        .args(["--php-binary", "/nonexistent/php", "--allow-keyword", "return"])
        .arg("return 1;");
    command
        .assert()
        .code(4)
        .stderr(contains("evaluation failed fatally"));
}

#[test]
fn snippet_can_come_from_stdin() {
    let mut command = cargo_bin_cmd!("snipgate");
    command
        .args(["--php-binary", "/nonexistent/php", "--expect", "string", "-"])
        .write_stdin("return 'x';");
    command.assert().success().stdout("false\n");
}
