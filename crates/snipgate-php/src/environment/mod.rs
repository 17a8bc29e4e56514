//! PHP interpreter driven as a subprocess.
//!
//! A [`PhpEnvironment`] stands for the host program: a PHP binary plus a
//! prelude of host code (classes, functions) loaded before every
//! introspection and execution. It answers capability queries by asking the
//! interpreter what it knows, and executes validated snippets with `eval`
//! inside a closure, so a `return` statement yields the snippet's value and
//! the code is compiled exactly as the linter saw it.
//!
//! Both scripts print their result after a marker line and encode it as
//! JSON, so output the prelude or the snippet writes itself never gets
//! mistaken for the result. Invalid UTF-8 in strings is replaced with
//! U+FFFD, and non-finite doubles travel as their `var_export` text (`INF`,
//! `-INF`, `NAN`) because JSON has no spelling for them.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use snipgate::{
    CapabilityRegistry, CapabilitySnapshot, Evaluator, HostError, HostEvaluator,
    ProcessCommand, ProcessError, ProcessOutput, ProcessSyntaxChecker, RegistryError, Value,
    run_piped,
};
use thiserror::Error;
use tracing::debug;

use crate::keywords::keyword_set;
use crate::lint::php_lint;

/// Tracing target for PHP subprocess operations.
const PHP_TARGET: &str = "snipgate_php::environment";

/// Line printed immediately before the JSON-encoded result.
const RESULT_MARKER: &str = "\n__SNIPGATE_RESULT__";

/// Lists every function and type known once the prelude has loaded.
const INTROSPECTION_SCRIPT: &str = r"
$__snipgate_functions = get_defined_functions();
echo $__snipgate_marker, json_encode([
    'callables' => array_merge($__snipgate_functions['internal'], $__snipgate_functions['user']),
    'type_names' => array_merge(get_declared_classes(), get_declared_interfaces(), get_declared_traits()),
]);
";

/// Reports the type and value of `$__snipgate_result`.
const RESULT_EPILOGUE: &str = r"
$__snipgate_type = gettype($__snipgate_result);
if ($__snipgate_type === 'double' && !is_finite($__snipgate_result)) {
    $__snipgate_result = var_export($__snipgate_result, true);
}
echo $__snipgate_marker, json_encode(
    ['type' => $__snipgate_type, 'value' => $__snipgate_result],
    JSON_PARTIAL_OUTPUT_ON_ERROR | JSON_PRESERVE_ZERO_FRACTION | JSON_INVALID_UTF8_SUBSTITUTE
);
";

/// A prelude file could not be read.
#[derive(Debug, Error)]
#[error("failed to read prelude {}: {source}", path.display())]
pub struct PreludeError {
    path: PathBuf,
    #[source]
    source: Arc<io::Error>,
}

impl PreludeError {
    /// Path of the prelude that failed to load.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The PHP host program: interpreter binary and prelude source.
///
/// # Example
///
/// ```no_run
/// use snipgate::Expression;
/// use snipgate_php::PhpEnvironment;
///
/// let environment = PhpEnvironment::new("php")
///     .with_prelude("class Test { public function foobar() { return 'foobar'; } }");
/// let expression = Expression::new("$test = new Test; return $test->foobar();")
///     .with_allowed_keywords(["new", "return"])
///     .with_allowed_functions(["foobar"])
///     .with_allowed_class_names(["Test"]);
/// assert!(expression.returns_string(&environment.evaluator()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpEnvironment {
    binary: PathBuf,
    prelude: String,
    timeout: Option<Duration>,
}

impl PhpEnvironment {
    /// Creates an environment with an empty prelude and no timeout.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            prelude: String::new(),
            timeout: None,
        }
    }

    /// Appends `source` to the prelude, returning the environment.
    #[must_use]
    pub fn with_prelude(mut self, source: &str) -> Self {
        self.define(source);
        self
    }

    /// Appends the contents of the file at `path` to the prelude.
    ///
    /// # Errors
    ///
    /// Returns a [`PreludeError`] if the file cannot be read.
    pub fn with_prelude_file(self, path: &Path) -> Result<Self, PreludeError> {
        let source = fs::read_to_string(path).map_err(|source| PreludeError {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        Ok(self.with_prelude(&source))
    }

    /// Bounds every PHP subprocess, including the linter.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads more host code. Callables and types it declares appear in the
    /// next capability snapshot.
    ///
    /// A leading `<?php` open tag is dropped.
    pub fn define(&mut self, source: &str) {
        let body = strip_open_tag(source);
        if body.trim().is_empty() {
            return;
        }
        if !self.prelude.is_empty() {
            self.prelude.push('\n');
        }
        self.prelude.push_str(body);
    }

    /// Returns the interpreter binary.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Returns the accumulated prelude source, without an open tag.
    #[must_use]
    pub fn prelude(&self) -> &str {
        &self.prelude
    }

    /// Returns the subprocess timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the `php -l` checker for this environment's binary.
    #[must_use]
    pub fn lint(&self) -> ProcessSyntaxChecker {
        php_lint(&self.binary).with_timeout(self.timeout)
    }

    /// Wires the environment into an [`Evaluator`], serving as both
    /// registry and host.
    #[must_use]
    pub fn evaluator(&self) -> Evaluator<&Self, ProcessSyntaxChecker, &Self> {
        Evaluator::new(self, self.lint(), self)
    }

    fn script(&self, body: &str) -> String {
        format!(
            "<?php\n$__snipgate_marker = {marker:?};\n{prelude}\n;\n{body}",
            marker = RESULT_MARKER,
            prelude = self.prelude,
        )
    }

    fn execution_script(&self, code: &str) -> String {
        let body = format!(
            "$__snipgate_result = (static function () {{\n    return eval({});\n}})();\n{RESULT_EPILOGUE}",
            php_string_literal(code)
        );
        self.script(&body)
    }

    fn run(&self, script: &str) -> Result<ProcessOutput, ProcessError> {
        let command = ProcessCommand::new(&self.binary).args(["-d", "display_errors=stderr"]);
        run_piped(&command, script, self.timeout)
    }

    fn inventory(&self) -> Result<Inventory, RegistryError> {
        let output = self
            .run(&self.script(INTROSPECTION_SCRIPT))
            .map_err(|err| match err {
                ProcessError::Launch { .. } => RegistryError::Unavailable {
                    message: err.to_string(),
                },
                other => RegistryError::Introspection {
                    message: other.to_string(),
                },
            })?;
        if !output.success() {
            return Err(RegistryError::Introspection {
                message: output.diagnostic().trim().to_owned(),
            });
        }
        let inventory = decode_inventory(output.stdout())?;
        debug!(
            target: PHP_TARGET,
            callables = inventory.callables.len(),
            type_names = inventory.type_names.len(),
            "introspected PHP environment"
        );
        Ok(inventory)
    }
}

/// Drops a leading `<?php` open tag.
fn strip_open_tag(source: &str) -> &str {
    let trimmed = source.trim_start();
    trimmed.strip_prefix("<?php").unwrap_or(source)
}

/// Quotes `text` as a single-quoted PHP string literal.
///
/// Only backslashes and single quotes are special inside such a literal, so
/// every other byte passes through unchanged.
fn php_string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('\'');
    for ch in text.chars() {
        if matches!(ch, '\\' | '\'') {
            literal.push('\\');
        }
        literal.push(ch);
    }
    literal.push('\'');
    literal
}

/// Returns the text printed after the last result marker.
fn payload(stdout: &str) -> Option<&str> {
    stdout.rsplit_once(RESULT_MARKER).map(|(_, json)| json)
}

#[derive(Debug, Deserialize)]
struct Inventory {
    callables: Vec<String>,
    type_names: Vec<String>,
}

fn decode_inventory(stdout: &str) -> Result<Inventory, RegistryError> {
    let json = payload(stdout).ok_or_else(|| RegistryError::Introspection {
        message: "introspection script printed no result".to_owned(),
    })?;
    serde_json::from_str(json).map_err(|err| RegistryError::Introspection {
        message: format!("unreadable introspection result: {err}"),
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl Envelope {
    /// Maps PHP's `gettype()` names onto [`Value`] variants.
    fn into_value(self) -> Result<Value, HostError> {
        let decoded = match self.type_name.as_str() {
            "NULL" => Some(Value::Null),
            "boolean" => self.value.as_bool().map(Value::Boolean),
            "integer" => self.value.as_i64().map(Value::Integer),
            "double" => decode_double(&self.value).map(Value::Float),
            "string" => self.value.as_str().map(|text| Value::String(text.to_owned())),
            _ => Some(Value::Other {
                type_name: self.type_name.clone(),
                repr: self.value.to_string(),
            }),
        };
        decoded.ok_or_else(|| HostError::Protocol {
            message: format!("{} result carried {}", self.type_name, self.value),
        })
    }
}

/// Reads a double, accepting the `var_export` spelling of non-finite values.
fn decode_double(value: &serde_json::Value) -> Option<f64> {
    match value.as_str() {
        Some("INF") => Some(f64::INFINITY),
        Some("-INF") => Some(f64::NEG_INFINITY),
        Some("NAN") => Some(f64::NAN),
        Some(_) => None,
        None => value.as_f64(),
    }
}

fn decode_result(stdout: &str) -> Result<Value, HostError> {
    let json = payload(stdout).ok_or_else(|| HostError::Protocol {
        message: "snippet terminated before its result was printed".to_owned(),
    })?;
    let envelope: Envelope = serde_json::from_str(json).map_err(|err| HostError::Protocol {
        message: format!("unreadable result: {err}"),
    })?;
    envelope.into_value()
}

impl CapabilityRegistry for PhpEnvironment {
    fn keywords(&self) -> Result<BTreeSet<String>, RegistryError> {
        Ok(keyword_set())
    }

    fn callables(&self) -> Result<BTreeSet<String>, RegistryError> {
        Ok(self.inventory()?.callables.into_iter().collect())
    }

    fn type_names(&self) -> Result<BTreeSet<String>, RegistryError> {
        Ok(self.inventory()?.type_names.into_iter().collect())
    }

    fn snapshot(&self) -> Result<CapabilitySnapshot, RegistryError> {
        let Inventory {
            callables,
            type_names,
        } = self.inventory()?;
        Ok(CapabilitySnapshot::new(
            keyword_set(),
            callables.into_iter().collect(),
            type_names.into_iter().collect(),
        ))
    }
}

impl HostEvaluator for PhpEnvironment {
    fn execute(&self, code: &str) -> Result<Value, HostError> {
        let output = self.run(&self.execution_script(code)).map_err(|err| HostError::Unavailable {
            message: err.to_string(),
        })?;
        if !output.success() {
            debug!(
                target: PHP_TARGET,
                status = output.code(),
                "snippet raised during execution"
            );
            return Err(HostError::Raised {
                message: output.diagnostic().trim().to_owned(),
            });
        }
        decode_result(output.stdout())
    }
}
