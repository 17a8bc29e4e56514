use std::path::PathBuf;

use crate::logging::LogFormat;

/// PHP binary used when none is configured; resolved through `PATH`.
pub const DEFAULT_PHP_BINARY: &str = "php";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default PHP binary path.
#[must_use]
pub fn default_php_binary() -> PathBuf {
    PathBuf::from(DEFAULT_PHP_BINARY)
}

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
