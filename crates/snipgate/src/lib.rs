//! Pre-execution safety gate for dynamically supplied code snippets.
//!
//! A host program that runs snippets written by someone else wants to
//! restrict them to an explicit set of keywords, callables and type names.
//! `snipgate` decides, before any side effect can happen, whether a snippet
//! stays within its allow-lists, confirms that it is syntactically well
//! formed, and only then executes it and classifies the result.
//!
//! # Architecture
//!
//! Evaluation is a fixed pipeline driven by [`Evaluator`]:
//!
//! 1. A [`CapabilityRegistry`] enumerates every identifier the environment
//!    knows about. The forbidden set of each [`Category`] is that universe
//!    minus the [`Expression`]'s allow-list, recomputed on every call.
//! 2. [`scan`] matches the forbidden identifiers against the snippet and
//!    reports the first [`Violation`].
//! 3. A [`SyntaxChecker`] (usually a [`ProcessSyntaxChecker`] running a lint
//!    command) confirms the snippet parses.
//! 4. A [`HostEvaluator`] executes the snippet and returns a typed [`Value`].
//!
//! Failures surface as an [`EvaluationError`] whose [`FailureKind`] tells the
//! caller which stage rejected the snippet.
//!
//! This is a gate, not a sandbox: permitted callables keep every side effect
//! they normally have.
//!
//! # Example
//!
//! ```rust,no_run
//! use snipgate::{
//!     Evaluator, Expression, HostError, HostEvaluator, InMemoryRegistry,
//!     ProcessCommand, ProcessSyntaxChecker, Value,
//! };
//!
//! struct Calculator;
//!
//! impl HostEvaluator for Calculator {
//!     fn execute(&self, _code: &str) -> Result<Value, HostError> {
//!         Ok(Value::Integer(2))
//!     }
//! }
//!
//! let registry = InMemoryRegistry::new().with_keywords(["new", "return"]);
//! let checker = ProcessSyntaxChecker::new(ProcessCommand::new("php").arg("-l"))
//!     .with_prologue("<?php ");
//! let evaluator = Evaluator::new(registry, checker, Calculator);
//!
//! let expression = Expression::new("return 1 + 1;").with_allowed_keywords(["return"]);
//! assert!(expression.returns_integer(&evaluator));
//! ```

pub mod error;
pub mod evaluator;
pub mod expression;
pub mod process;
pub mod registry;
pub mod scanner;
pub mod syntax;
pub mod value;

#[cfg(test)]
mod tests;

pub use self::error::{EvaluationError, FailureKind};
pub use self::evaluator::{Evaluator, HostError, HostEvaluator};
pub use self::expression::Expression;
pub use self::process::{ProcessCommand, ProcessError, ProcessOutput, run_piped};
pub use self::registry::{
    CapabilityRegistry, CapabilitySnapshot, Category, InMemoryRegistry, RegistryError,
};
pub use self::scanner::{ForbiddenSets, ScanError, TokenPattern, Violation, scan};
pub use self::syntax::{CheckError, ProcessSyntaxChecker, SyntaxChecker};
pub use self::value::{Value, ValueKind};
