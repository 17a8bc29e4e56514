//! Configuration for the `snipgate` command-line front end.
//!
//! Settings are layered by `ortho_config`: built-in defaults, then a TOML
//! file, then `SNIPGATE_*` environment variables, then command-line flags.
//! The file is named with `--config-path` or `SNIPGATE_CONFIG_PATH`;
//! without either, `.snipgate.toml` is discovered in the usual locations.
//!
//! ```toml
//! php_binary = "/usr/bin/php8.3"
//! prelude_path = "host/prelude.php"
//! check_timeout_secs = 5
//! log_filter = "snipgate=debug"
//! log_format = "json"
//! ```

mod defaults;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PHP_BINARY, default_log_filter, default_log_filter_string,
    default_log_format, default_php_binary,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Settings for the command-line front end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SNIPGATE")]
pub struct Config {
    /// PHP interpreter used for introspection, linting and execution.
    #[serde(default = "default_php_binary")]
    #[ortho_config(default = default_php_binary())]
    pub php_binary: PathBuf,
    /// Host code loaded before every snippet.
    #[serde(default)]
    pub prelude_path: Option<PathBuf>,
    /// Upper bound on each PHP subprocess, in seconds. Unset or zero waits
    /// indefinitely.
    #[serde(default)]
    pub check_timeout_secs: Option<u64>,
    /// `tracing` filter directive.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            php_binary: default_php_binary(),
            prelude_path: None,
            check_timeout_secs: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Returns the subprocess timeout, or `None` when waits are unbounded.
    #[must_use]
    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
