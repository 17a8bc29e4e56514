//! Staged validation and execution of expressions.
//!
//! [`Evaluator::evaluate`] drives the gate: it takes a fresh capability
//! snapshot, derives the forbidden sets from the expression's allow-lists,
//! scans the snippet, checks its syntax, and only then hands it to the
//! [`HostEvaluator`]. A stage that fails stops the pipeline; nothing reaches
//! the host unless both the scan and the syntax check pass.

use thiserror::Error;
use tracing::debug;

use crate::error::EvaluationError;
use crate::expression::Expression;
use crate::registry::{CapabilityRegistry, Category};
use crate::scanner::{ForbiddenSets, scan};
use crate::syntax::SyntaxChecker;
use crate::value::Value;

/// Tracing target for evaluator stages.
const EVALUATOR_TARGET: &str = "snipgate::evaluator";

/// Errors raised by the host while executing a snippet.
#[derive(Debug, Error)]
pub enum HostError {
    /// The snippet raised an error or exception.
    #[error("snippet raised: {message}")]
    Raised {
        /// Error reported by the host.
        message: String,
    },

    /// The host interpreter could not be launched.
    #[error("host interpreter is unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The host ran the snippet but its result could not be read back.
    #[error("host produced an unreadable result: {message}")]
    Protocol {
        /// Description of the malformed output.
        message: String,
    },
}

/// Executes validated snippets in the embedding environment.
pub trait HostEvaluator {
    /// Runs `code` and returns the value it produces.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Raised`] when the snippet fails at runtime,
    /// [`HostError::Unavailable`] when the interpreter cannot be reached and
    /// [`HostError::Protocol`] when its result cannot be decoded.
    fn execute(&self, code: &str) -> Result<Value, HostError>;
}

impl<T: HostEvaluator + ?Sized> HostEvaluator for &T {
    fn execute(&self, code: &str) -> Result<Value, HostError> {
        (**self).execute(code)
    }
}

/// Gatekeeper wiring a registry, a syntax checker and a host together.
///
/// # Example
///
/// ```ignore
/// let evaluator = Evaluator::new(registry, checker, host);
/// let expression = Expression::new("return 1 + 1;").with_allowed_keywords(["return"]);
/// assert_eq!(expression.evaluate(&evaluator)?, Value::Integer(2));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator<R, C, H> {
    registry: R,
    checker: C,
    host: H,
}

impl<R, C, H> Evaluator<R, C, H>
where
    R: CapabilityRegistry,
    C: SyntaxChecker,
    H: HostEvaluator,
{
    /// Creates an evaluator from its three collaborators.
    pub const fn new(registry: R, checker: C, host: H) -> Self {
        Self {
            registry,
            checker,
            host,
        }
    }

    /// Returns the capability registry.
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Returns the capability registry mutably, so host definitions can be
    /// added between evaluations.
    pub const fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// Returns the syntax checker.
    pub const fn checker(&self) -> &C {
        &self.checker
    }

    /// Returns the host evaluator.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Validates and executes `expression`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::NotSafe`] when a forbidden identifier is
    /// found, [`EvaluationError::Syntax`] when the checker rejects the
    /// snippet, [`EvaluationError::Runtime`] when execution raises, and
    /// [`EvaluationError::Fatal`] when any collaborator is unusable.
    pub fn evaluate(&self, expression: &Expression) -> Result<Value, EvaluationError> {
        let code = expression.code();
        let snapshot = self.registry.snapshot()?;
        let forbidden = ForbiddenSets::new(
            snapshot.forbidden(Category::Keyword, expression.allowed(Category::Keyword)),
            snapshot.forbidden(Category::Callable, expression.allowed(Category::Callable)),
            snapshot.forbidden(Category::TypeName, expression.allowed(Category::TypeName)),
        );
        debug!(
            target: EVALUATOR_TARGET,
            forbidden = forbidden.len(),
            code_bytes = code.len(),
            "computed forbidden identifiers"
        );

        if let Some(violation) = scan(code, &forbidden)? {
            debug!(target: EVALUATOR_TARGET, %violation, "rejecting unsafe expression");
            return Err(EvaluationError::NotSafe { violation });
        }

        self.checker.check(code)?;
        debug!(target: EVALUATOR_TARGET, "syntax check passed, executing");

        let value = self.host.execute(code)?;
        debug!(target: EVALUATOR_TARGET, kind = %value.kind(), "expression evaluated");
        Ok(value)
    }
}
