//! Command-line argument definitions.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use snipgate_config::LogFormat;

/// Runtime type a snippet is expected to return.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExpectedType {
    /// `true` or `false`.
    Boolean,
    /// A whole number.
    Integer,
    /// A floating point number.
    Float,
    /// A string.
    String,
}

/// Validates a PHP snippet against explicit allow-lists, then runs it.
#[derive(Parser, Debug)]
#[command(name = "snipgate")]
pub(crate) struct Cli {
    /// Reads settings from a TOML file.
    #[arg(long, value_name = "PATH")]
    pub(crate) config_path: Option<PathBuf>,
    /// PHP interpreter to use.
    #[arg(long, value_name = "PATH")]
    pub(crate) php_binary: Option<PathBuf>,
    /// Host code loaded before the snippet.
    #[arg(long, alias = "prelude", value_name = "PATH")]
    pub(crate) prelude_path: Option<PathBuf>,
    /// Upper bound on each PHP subprocess, in seconds (0 waits indefinitely).
    #[arg(long, value_name = "SECS")]
    pub(crate) check_timeout_secs: Option<u64>,
    /// `tracing` filter directive.
    #[arg(long, value_name = "FILTER")]
    pub(crate) log_filter: Option<String>,
    /// Log output format (`json` or `compact`).
    #[arg(long, value_name = "FORMAT")]
    pub(crate) log_format: Option<LogFormat>,
    /// Keyword the snippet may use (repeatable).
    #[arg(long = "allow-keyword", value_name = "KEYWORD")]
    pub(crate) allowed_keywords: Vec<String>,
    /// Function the snippet may call (repeatable).
    #[arg(long = "allow-function", value_name = "FUNCTION")]
    pub(crate) allowed_functions: Vec<String>,
    /// Class the snippet may reference (repeatable).
    #[arg(long = "allow-class", value_name = "CLASS")]
    pub(crate) allowed_classes: Vec<String>,
    /// Prints whether the snippet returns this type instead of its value.
    #[arg(long, value_enum, value_name = "TYPE")]
    pub(crate) expect: Option<ExpectedType>,
    /// Snippet to evaluate, or `-` to read it from standard input.
    #[arg(value_name = "CODE", allow_hyphen_values = true)]
    pub(crate) code: String,
}

impl Cli {
    /// Arguments handed to the configuration loader: the program name
    /// followed by every configuration flag given on the command line.
    pub(crate) fn config_arguments(&self) -> Vec<OsString> {
        let mut args = vec![OsString::from("snipgate")];
        push_flag(&mut args, "--config-path", self.config_path.as_ref());
        push_flag(&mut args, "--php-binary", self.php_binary.as_ref());
        push_flag(&mut args, "--prelude-path", self.prelude_path.as_ref());
        push_flag(
            &mut args,
            "--check-timeout-secs",
            self.check_timeout_secs.map(|secs| secs.to_string()),
        );
        push_flag(&mut args, "--log-filter", self.log_filter.as_ref());
        push_flag(
            &mut args,
            "--log-format",
            self.log_format.map(|format| format.to_string()),
        );
        args
    }
}

fn push_flag<V: Into<OsString>>(args: &mut Vec<OsString>, flag: &str, value: Option<V>) {
    if let Some(value) = value {
        args.push(OsString::from(flag));
        args.push(value.into());
    }
}
