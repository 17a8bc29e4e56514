//! Snippets paired with the capabilities they may use.

use std::collections::BTreeSet;

use crate::error::EvaluationError;
use crate::evaluator::{Evaluator, HostEvaluator};
use crate::registry::{CapabilityRegistry, Category};
use crate::syntax::SyntaxChecker;
use crate::value::{Value, ValueKind};

/// A code snippet and its allow-lists.
///
/// Every allow-list starts empty, so a fresh expression may use nothing the
/// registry knows about. Setters replace a list wholesale; calling one twice
/// leaves only the second list in effect.
///
/// # Example
///
/// ```ignore
/// let expression = Expression::new("$test = new Test; return $test->foobar();")
///     .with_allowed_keywords(["new", "return"])
///     .with_allowed_functions(["foobar"])
///     .with_allowed_class_names(["Test"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    code: String,
    allowed_keywords: BTreeSet<String>,
    allowed_callables: BTreeSet<String>,
    allowed_type_names: BTreeSet<String>,
}

fn collect<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

impl Expression {
    /// Creates an expression with empty allow-lists. The code is stored
    /// verbatim.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            allowed_keywords: BTreeSet::new(),
            allowed_callables: BTreeSet::new(),
            allowed_type_names: BTreeSet::new(),
        }
    }

    /// Returns the snippet.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the allow-list of one category.
    #[must_use]
    pub const fn allowed(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Keyword => &self.allowed_keywords,
            Category::Callable => &self.allowed_callables,
            Category::TypeName => &self.allowed_type_names,
        }
    }

    /// Returns the allowed keywords.
    #[must_use]
    pub const fn allowed_keywords(&self) -> &BTreeSet<String> {
        &self.allowed_keywords
    }

    /// Returns the allowed function names.
    #[must_use]
    pub const fn allowed_functions(&self) -> &BTreeSet<String> {
        &self.allowed_callables
    }

    /// Returns the allowed class names.
    #[must_use]
    pub const fn allowed_class_names(&self) -> &BTreeSet<String> {
        &self.allowed_type_names
    }

    /// Replaces the allowed keywords.
    pub fn set_allowed_keywords<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_keywords = collect(names);
    }

    /// Replaces the allowed function names.
    pub fn set_allowed_functions<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_callables = collect(names);
    }

    /// Replaces the allowed class names.
    pub fn set_allowed_class_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_type_names = collect(names);
    }

    /// Builder form of [`Self::set_allowed_keywords`].
    #[must_use]
    pub fn with_allowed_keywords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_allowed_keywords(names);
        self
    }

    /// Builder form of [`Self::set_allowed_functions`].
    #[must_use]
    pub fn with_allowed_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_allowed_functions(names);
        self
    }

    /// Builder form of [`Self::set_allowed_class_names`].
    #[must_use]
    pub fn with_allowed_class_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_allowed_class_names(names);
        self
    }

    /// Validates and executes the expression.
    ///
    /// # Errors
    ///
    /// See [`Evaluator::evaluate`].
    pub fn evaluate<R, C, H>(&self, evaluator: &Evaluator<R, C, H>) -> Result<Value, EvaluationError>
    where
        R: CapabilityRegistry,
        C: SyntaxChecker,
        H: HostEvaluator,
    {
        evaluator.evaluate(self)
    }

    /// Returns `true` when the expression evaluates to a boolean.
    ///
    /// Each predicate runs the whole pipeline, including execution; any
    /// failure reads as `false`.
    pub fn returns_boolean<R, C, H>(&self, evaluator: &Evaluator<R, C, H>) -> bool
    where
        R: CapabilityRegistry,
        C: SyntaxChecker,
        H: HostEvaluator,
    {
        self.returns(evaluator, ValueKind::Boolean)
    }

    /// Returns `true` when the expression evaluates to a float.
    pub fn returns_float<R, C, H>(&self, evaluator: &Evaluator<R, C, H>) -> bool
    where
        R: CapabilityRegistry,
        C: SyntaxChecker,
        H: HostEvaluator,
    {
        self.returns(evaluator, ValueKind::Float)
    }

    /// Returns `true` when the expression evaluates to an integer.
    pub fn returns_integer<R, C, H>(&self, evaluator: &Evaluator<R, C, H>) -> bool
    where
        R: CapabilityRegistry,
        C: SyntaxChecker,
        H: HostEvaluator,
    {
        self.returns(evaluator, ValueKind::Integer)
    }

    /// Returns `true` when the expression evaluates to a string.
    pub fn returns_string<R, C, H>(&self, evaluator: &Evaluator<R, C, H>) -> bool
    where
        R: CapabilityRegistry,
        C: SyntaxChecker,
        H: HostEvaluator,
    {
        self.returns(evaluator, ValueKind::String)
    }

    fn returns<R, C, H>(&self, evaluator: &Evaluator<R, C, H>, expected: ValueKind) -> bool
    where
        R: CapabilityRegistry,
        C: SyntaxChecker,
        H: HostEvaluator,
    {
        self.evaluate(evaluator)
            .is_ok_and(|value| value.kind() == expected)
    }
}
