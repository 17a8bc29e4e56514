//! Pattern-based detection of forbidden identifiers.
//!
//! The scanner is a lexical safety gate, not a tokenizer. Each forbidden
//! identifier is turned into a regular expression and matched against the raw
//! snippet text:
//!
//! - keywords and type names use the bare pattern `\s?IDENT\s*\(?`
//! - callables use the call pattern `\s?IDENT\s*\(`
//!
//! Because the leading whitespace is optional, the bare pattern matches any
//! occurrence of the identifier, including inside a longer identifier or a
//! string literal (`"format"` trips the keyword `for`). The call pattern only
//! matches identifiers directly followed by an opening parenthesis, so a
//! callable referenced without being called (passed as a string to another
//! function, say) goes unnoticed. Matching is case-sensitive while PHP
//! resolves functions and classes case-insensitively, so `StrLen('x')` or
//! `new test` slips past a forbidden `strlen` or `Test`; PHP reports user
//! functions in lower case, which makes mixed-case calls to them invisible
//! too. Callers rely on these exact semantics;
//! tightening them changes which snippets are accepted.
//!
//! Categories are visited in [`Category::SCAN_ORDER`] and identifiers in
//! sorted order; the first match stops the scan.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::registry::Category;

/// Tracing target for scanner operations.
const SCANNER_TARGET: &str = "snipgate::scanner";

/// A forbidden identifier found in a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    category: Category,
    identifier: String,
}

impl Violation {
    /// Creates a violation record.
    #[must_use]
    pub fn new(category: Category, identifier: impl Into<String>) -> Self {
        Self {
            category,
            identifier: identifier.into(),
        }
    }

    /// Category of the offending identifier.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// The offending identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.category, self.identifier)
    }
}

/// Identifiers the snippet must not reference, per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenSets {
    keywords: BTreeSet<String>,
    callables: BTreeSet<String>,
    type_names: BTreeSet<String>,
}

impl ForbiddenSets {
    /// Creates forbidden sets from the three categories.
    #[must_use]
    pub const fn new(
        keywords: BTreeSet<String>,
        callables: BTreeSet<String>,
        type_names: BTreeSet<String>,
    ) -> Self {
        Self {
            keywords,
            callables,
            type_names,
        }
    }

    /// Returns the forbidden identifiers of one category.
    #[must_use]
    pub const fn get(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Keyword => &self.keywords,
            Category::Callable => &self.callables,
            Category::TypeName => &self.type_names,
        }
    }

    /// Total number of forbidden identifiers across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len() + self.callables.len() + self.type_names.len()
    }

    /// Returns `true` when nothing is forbidden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pattern could not be compiled for an identifier.
#[derive(Debug, Error)]
#[error("failed to build scan pattern for {category} \"{identifier}\": {source}")]
pub struct ScanError {
    category: Category,
    identifier: String,
    #[source]
    source: regex::Error,
}

impl ScanError {
    /// Identifier whose pattern failed to compile.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Compiled matcher for a single forbidden identifier.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    regex: Regex,
}

impl TokenPattern {
    /// Compiles the pattern used for `identifier` in `category`.
    ///
    /// The identifier is escaped, so names containing regex metacharacters
    /// (namespaced type names such as `App\Model`) match literally.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the regular expression cannot be built.
    pub fn compile(category: Category, identifier: &str) -> Result<Self, ScanError> {
        let escaped = regex::escape(identifier);
        let pattern = match category {
            Category::Keyword | Category::TypeName => format!(r"\s?{escaped}\s*\(?"),
            Category::Callable => format!(r"\s?{escaped}\s*\("),
        };
        let regex = Regex::new(&pattern).map_err(|source| ScanError {
            category,
            identifier: identifier.to_owned(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// Returns `true` when the pattern occurs anywhere in `code`.
    #[must_use]
    pub fn is_match(&self, code: &str) -> bool {
        self.regex.is_match(code)
    }

    /// Returns the regular expression source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Scans `code` for the first forbidden identifier.
///
/// Returns `Ok(None)` when the snippet is clear. Empty identifiers are
/// skipped: they cannot name anything a snippet could reference.
///
/// # Errors
///
/// Returns a [`ScanError`] if a pattern cannot be compiled.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use snipgate::{Category, ForbiddenSets, scan};
///
/// let keywords = BTreeSet::from(["return".to_owned()]);
/// let forbidden = ForbiddenSets::new(keywords, BTreeSet::new(), BTreeSet::new());
/// let violation = scan("return 1 + 1;", &forbidden).unwrap().unwrap();
/// assert_eq!(violation.category(), Category::Keyword);
/// assert_eq!(violation.identifier(), "return");
/// ```
pub fn scan(code: &str, forbidden: &ForbiddenSets) -> Result<Option<Violation>, ScanError> {
    for category in Category::SCAN_ORDER {
        for identifier in forbidden.get(category) {
            // Every pattern requires the literal identifier, so absent names
            // never need a compiled regex.
            if identifier.is_empty() || !code.contains(identifier.as_str()) {
                continue;
            }
            if TokenPattern::compile(category, identifier)?.is_match(code) {
                debug!(
                    target: SCANNER_TARGET,
                    %category,
                    identifier = identifier.as_str(),
                    "forbidden identifier found"
                );
                return Ok(Some(Violation::new(category, identifier.as_str())));
            }
        }
    }
    debug!(
        target: SCANNER_TARGET,
        forbidden = forbidden.len(),
        "snippet is clear"
    );
    Ok(None)
}
