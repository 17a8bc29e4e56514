//! Failure taxonomy of an evaluation.
//!
//! Every stage of the pipeline fails fast into one [`EvaluationError`]
//! variant. The variants map one-to-one onto the [`FailureKind`] tags so
//! callers can branch on the kind without matching on payloads.

use std::fmt;

use thiserror::Error;

use crate::evaluator::HostError;
use crate::registry::RegistryError;
use crate::scanner::{ScanError, Violation};
use crate::syntax::CheckError;

/// Errors arising from evaluating an expression.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The snippet references an identifier outside its allow-lists.
    #[error("expression is not safe: found forbidden {violation}")]
    NotSafe {
        /// First forbidden identifier found by the scanner.
        violation: Violation,
    },

    /// The snippet is syntactically malformed.
    #[error("expression has a syntax error: {}", diagnostic.trim_end())]
    Syntax {
        /// Diagnostic text produced by the syntax checker.
        diagnostic: String,
    },

    /// The environment could not carry out the evaluation.
    #[error("evaluation failed fatally: {message}")]
    Fatal {
        /// Description of the environment defect.
        message: String,
    },

    /// The snippet raised an error while executing.
    #[error("expression raised an error: {}", message.trim_end())]
    Runtime {
        /// Error reported by the host evaluator.
        message: String,
    },
}

impl EvaluationError {
    /// Returns the failure kind tag.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotSafe { .. } => FailureKind::NotSafe,
            Self::Syntax { .. } => FailureKind::SyntaxError,
            Self::Fatal { .. } => FailureKind::ExecutionFatal,
            Self::Runtime { .. } => FailureKind::RuntimeError,
        }
    }
}

impl From<RegistryError> for EvaluationError {
    fn from(error: RegistryError) -> Self {
        Self::Fatal {
            message: error.to_string(),
        }
    }
}

impl From<ScanError> for EvaluationError {
    fn from(error: ScanError) -> Self {
        Self::Fatal {
            message: error.to_string(),
        }
    }
}

impl From<CheckError> for EvaluationError {
    fn from(error: CheckError) -> Self {
        match error {
            CheckError::Malformed { diagnostic } => Self::Syntax { diagnostic },
            other => Self::Fatal {
                message: other.to_string(),
            },
        }
    }
}

impl From<HostError> for EvaluationError {
    fn from(error: HostError) -> Self {
        match error {
            HostError::Raised { message } => Self::Runtime { message },
            other @ (HostError::Unavailable { .. } | HostError::Protocol { .. }) => Self::Fatal {
                message: other.to_string(),
            },
        }
    }
}

/// Classification of an evaluation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A forbidden identifier was found.
    NotSafe,
    /// The syntax checker rejected the snippet.
    SyntaxError,
    /// The checker, registry or interpreter was unusable.
    ExecutionFatal,
    /// The snippet raised during execution.
    RuntimeError,
}

impl FailureKind {
    /// Returns the snake-case name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotSafe => "not_safe",
            Self::SyntaxError => "syntax_error",
            Self::ExecutionFatal => "execution_fatal",
            Self::RuntimeError => "runtime_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
