//! Behavioural tests for configuration layering.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use snipgate_config::{Config, LogFormat};
use tempfile::TempDir;

/// Serialises scenarios, which all read the process environment.
static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const SNIPGATE_VARIABLES: &[&str] = &[
    "SNIPGATE_CONFIG_PATH",
    "SNIPGATE_PHP_BINARY",
    "SNIPGATE_PRELUDE_PATH",
    "SNIPGATE_CHECK_TIMEOUT_SECS",
    "SNIPGATE_LOG_FILTER",
    "SNIPGATE_LOG_FORMAT",
];

struct Harness {
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
    _guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        let harness = Self {
            temp_dir,
            cli_args: RefCell::new(vec![OsString::from("snipgate")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
            _guard: guard,
        };
        for key in SNIPGATE_VARIABLES {
            harness.remove_env(key);
        }
        harness
    }

    fn write_config(&self, contents: &str) {
        let path = self.temp_dir.path().join("snipgate.toml");
        if let Err(error) = fs::write(&path, contents) {
            panic!("failed to write configuration: {error}");
        }
        self.push_cli_arg("--config-path");
        self.push_cli_arg(path.into_os_string());
    }

    fn remember(&self, key: &str) {
        let previous = std::env::var_os(key);
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn set_env(&self, key: &str, value: &str) {
        self.remember(key);
        // Edition 2024 marks environment mutation as `unsafe`. The mutex held
        // by the harness keeps other scenarios from reading it concurrently
        // and `Drop` restores the previous values.
        unsafe { std::env::set_var(key, value) };
    }

    fn remove_env(&self, key: &str) {
        self.remember(key);
        unsafe { std::env::remove_var(key) };
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => *self.loaded.borrow_mut() = Some(config),
            Err(error) => *self.error.borrow_mut() = Some(error.to_string()),
        }
    }

    fn config(&self) -> Config {
        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }
        match self.loaded.borrow().clone() {
            Some(config) => config,
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            match value {
                Some(os_value) => unsafe { std::env::set_var(&key, os_value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the PHP binary to {binary}")]
fn given_php_binary(harness: &Harness, binary: String) {
    harness.write_config(&format!("php_binary = \"{}\"\n", binary.trim_matches('"')));
}

#[given("a configuration file containing {contents}")]
fn given_contents(harness: &Harness, contents: String) {
    harness.write_config(contents.trim_matches('"'));
}

#[given("the environment sets {key} to {value}")]
fn given_environment(harness: &Harness, key: String, value: String) {
    harness.set_env(&key, value.trim_matches('"'));
}

#[given("the command line passes {flag} {value}")]
fn given_flag(harness: &Harness, flag: String, value: String) {
    harness.push_cli_arg(flag);
    harness.push_cli_arg(value.trim_matches('"'));
}

#[when("the configuration is loaded")]
fn when_loaded(harness: &Harness) {
    harness.load();
}

#[then("the PHP binary is {binary}")]
fn then_php_binary(harness: &Harness, binary: String) {
    assert_eq!(
        harness.config().php_binary,
        PathBuf::from(binary.trim_matches('"'))
    );
}

#[then("the log format is {format}")]
fn then_log_format(harness: &Harness, format: String) {
    let expected: LogFormat = match format.trim_matches('"').parse() {
        Ok(parsed) => parsed,
        Err(error) => panic!("unknown log format {format}: {error}"),
    };
    assert_eq!(harness.config().log_format, expected);
}

#[then("loading fails")]
fn then_load_fails(harness: &Harness) {
    assert!(
        harness.error.borrow().is_some(),
        "expected loading to fail, got {:?}",
        harness.loaded.borrow()
    );
}

#[scenario(path = "tests/features/configuration_layers.feature")]
fn configuration_layers(harness: Harness) {
    let _ = harness;
}
