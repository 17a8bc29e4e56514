//! Crate-level integration and BDD tests.

use std::cell::Cell;

use crate::error::FailureKind;
use crate::evaluator::{Evaluator, HostError, HostEvaluator};
use crate::expression::Expression;
use crate::registry::InMemoryRegistry;
use crate::syntax::{CheckError, SyntaxChecker};
use crate::value::Value;


/// Rejects snippets with unbalanced braces, or everything when `missing`.
#[derive(Default)]
struct BraceChecker {
    missing: bool,
    calls: Cell<usize>,
}

impl SyntaxChecker for BraceChecker {
    fn check(&self, code: &str) -> Result<(), CheckError> {
        self.calls.set(self.calls.get() + 1);
        if self.missing {
            return Err(CheckError::Unavailable {
                program: "/nonexistent/php".into(),
                source: std::sync::Arc::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
            });
        }
        let open = code.matches('{').count();
        let close = code.matches('}').count();
        if open == close {
            Ok(())
        } else {
            Err(CheckError::Malformed {
                diagnostic: "Parse error: unexpected end of file".into(),
            })
        }
    }
}

/// Returns a canned value and counts invocations.
struct CannedHost {
    value: Value,
    calls: Cell<usize>,
}

impl Default for CannedHost {
    fn default() -> Self {
        Self {
            value: Value::Null,
            calls: Cell::new(0),
        }
    }
}

impl HostEvaluator for CannedHost {
    fn execute(&self, _code: &str) -> Result<Value, HostError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.value.clone())
    }
}

fn php_like_registry() -> InMemoryRegistry {
    InMemoryRegistry::new()
        .with_keywords(["echo", "exit", "if", "new", "return", "unset"])
        .with_callables(["exec", "strlen", "system"])
        .with_type_names(["Directory", "Exception"])
}

#[test]
fn end_to_end_with_stub_collaborators() {
    let registry = php_like_registry();
    let checker = BraceChecker::default();
    let host = CannedHost {
        value: Value::Integer(2),
        ..CannedHost::default()
    };
    let evaluator = Evaluator::new(&registry, &checker, &host);

    let expression = Expression::new("return 1 + 1;").with_allowed_keywords(["return"]);
    assert_eq!(expression.evaluate(&evaluator).expect("evaluates"), Value::Integer(2));
    assert!(expression.returns_integer(&evaluator));
    assert_eq!(host.calls.get(), 2);
    assert_eq!(checker.calls.get(), 2);

    let denied = Expression::new("return 1 + 1;");
    let err = denied.evaluate(&evaluator).expect_err("not safe");
    assert_eq!(err.kind(), FailureKind::NotSafe);
    assert_eq!(host.calls.get(), 2);
}
