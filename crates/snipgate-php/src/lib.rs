//! PHP binding for the `snipgate` safety gate.
//!
//! The crate drives a PHP interpreter as a subprocess and plugs it into the
//! three seams the gate needs:
//!
//! - [`PhpEnvironment`] enumerates PHP's keywords, the functions and types
//!   known once the host prelude has loaded, and executes validated snippets;
//! - [`php_lint`] checks syntax with `php -l`.
//!
//! ```rust,no_run
//! use snipgate::Expression;
//! use snipgate_php::PhpEnvironment;
//!
//! let environment = PhpEnvironment::new("php");
//! let expression = Expression::new("return 1 + 1;").with_allowed_keywords(["return"]);
//! assert!(expression.returns_integer(&environment.evaluator()));
//! ```

pub mod environment;
pub mod keywords;
pub mod lint;

pub use self::environment::{PhpEnvironment, PreludeError};
pub use self::keywords::{PHP_KEYWORDS, keyword_set};
pub use self::lint::{PHP_PROLOGUE, php_lint};
