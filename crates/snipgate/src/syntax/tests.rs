//! Unit tests for the process-backed syntax checker.

use std::time::Duration;

use rstest::{fixture, rstest};

use super::*;

fn shell_checker(script: &str) -> ProcessSyntaxChecker {
    ProcessSyntaxChecker::new(ProcessCommand::new("/bin/sh").arg("-c").arg(script))
}

/// Accepts input only when it starts with the prologue and has balanced
/// braces, reporting a diagnostic on stderr otherwise.
#[fixture]
fn brace_checker() -> ProcessSyntaxChecker {
    shell_checker(concat!(
        "input=$(cat); ",
        "case \"$input\" in '<?php '*) ;; *) echo 'missing prologue' >&2; exit 2;; esac; ",
        "open=$(printf '%s' \"$input\" | tr -cd '{' | wc -c); ",
        "close=$(printf '%s' \"$input\" | tr -cd '}' | wc -c); ",
        "if [ \"$open\" -ne \"$close\" ]; then ",
        "echo \"Parse error: unmatched braces\" >&2; exit 255; fi"
    ))
    .with_prologue("<?php ")
}

#[rstest]
fn well_formed_snippet_passes(brace_checker: ProcessSyntaxChecker) {
    brace_checker
        .check("if (true) { return 1; }")
        .expect("balanced snippet is well formed");
}

#[rstest]
fn malformed_snippet_reports_diagnostic(brace_checker: ProcessSyntaxChecker) {
    let err = brace_checker
        .check("if (true) { return 1;")
        .expect_err("unbalanced snippet is malformed");
    match err {
        CheckError::Malformed { diagnostic } => {
            assert_eq!(diagnostic, "Parse error: unmatched braces\n");
        }
        other => panic!("expected malformed, got {other:?}"),
    }
}

#[rstest]
fn missing_prologue_is_detected_by_checker(brace_checker: ProcessSyntaxChecker) {
    let checker = brace_checker.with_prologue("");
    let err = checker.check("return 1;").expect_err("prologue required");
    assert!(
        matches!(err, CheckError::Malformed { ref diagnostic } if diagnostic.contains("prologue")),
        "unexpected error: {err:?}"
    );
}

#[test]
fn diagnostic_printed_on_stdout_is_kept() {
    let checker = shell_checker("cat > /dev/null; echo 'Errors parsing Standard input code'; exit 255");
    let err = checker.check("{").expect_err("malformed");
    assert!(
        matches!(err, CheckError::Malformed { ref diagnostic } if !diagnostic.is_empty()),
        "unexpected error: {err:?}"
    );
}

#[test]
fn missing_checker_is_unavailable() {
    let checker = ProcessSyntaxChecker::new(ProcessCommand::new("/nonexistent/php")).with_prologue("<?php ");
    let err = checker.check("return 1;").expect_err("checker missing");
    assert!(
        matches!(err, CheckError::Unavailable { .. }),
        "expected unavailable, got {err:?}"
    );
    assert!(err.to_string().contains("/nonexistent/php"));
}

#[test]
fn hung_checker_times_out() {
    let checker =
        shell_checker("exec sleep 5").with_timeout(Some(Duration::from_millis(100)));
    let err = checker.check("return 1;").expect_err("checker hangs");
    assert!(
        matches!(err, CheckError::TimedOut { .. }),
        "expected timeout, got {err:?}"
    );
}

#[test]
fn accessors_expose_configuration() {
    let checker = shell_checker("true")
        .with_prologue("<?php ")
        .with_timeout(Some(Duration::from_secs(3)));
    assert_eq!(checker.prologue(), "<?php ");
    assert_eq!(checker.timeout(), Some(Duration::from_secs(3)));
    assert_eq!(checker.command().program(), std::path::Path::new("/bin/sh"));
}

#[test]
fn process_errors_map_onto_check_errors() {
    let launch = ProcessError::Launch {
        program: "php".into(),
        source: Arc::new(io::Error::from(io::ErrorKind::NotFound)),
    };
    assert!(matches!(
        CheckError::from(launch),
        CheckError::Unavailable { .. }
    ));

    let timeout = ProcessError::TimedOut {
        program: "php".into(),
        timeout: Duration::from_secs(1),
    };
    assert!(matches!(
        CheckError::from(timeout),
        CheckError::TimedOut { .. }
    ));
}
