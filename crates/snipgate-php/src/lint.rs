//! Syntax checking through `php -l`.

use std::path::PathBuf;

use snipgate::{ProcessCommand, ProcessSyntaxChecker};

/// Text written ahead of every snippet so PHP parses it as code.
pub const PHP_PROLOGUE: &str = "<?php ";

/// Builds a checker that pipes snippets into `php -l`.
///
/// Errors are routed to stderr so the diagnostic is not mixed with the
/// linter's summary line on stdout.
#[must_use]
pub fn php_lint(binary: impl Into<PathBuf>) -> ProcessSyntaxChecker {
    let command = ProcessCommand::new(binary).args(["-d", "display_errors=stderr", "-l"]);
    ProcessSyntaxChecker::new(command).with_prologue(PHP_PROLOGUE)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn lint_runs_php_in_lint_mode_with_open_tag() {
        let checker = php_lint("/usr/bin/php8.3");
        assert_eq!(
            checker.command().program(),
            std::path::Path::new("/usr/bin/php8.3")
        );
        let expected: Vec<OsString> = ["-d", "display_errors=stderr", "-l"]
            .into_iter()
            .map(OsString::from)
            .collect();
        assert_eq!(checker.command().arguments(), expected.as_slice());
        assert_eq!(checker.prologue(), "<?php ");
        assert_eq!(checker.timeout(), None);
    }
}
