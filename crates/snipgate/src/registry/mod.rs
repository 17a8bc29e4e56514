//! Capability universes and their difference against allow-lists.
//!
//! A [`CapabilityRegistry`] enumerates every keyword, callable and type name
//! the embedding environment knows about. The evaluator asks for a fresh
//! [`CapabilitySnapshot`] on every evaluation, because host code loaded
//! between evaluations can introduce new callables and types; the snapshot is
//! never cached.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Category of identifier guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Reserved words and language constructs.
    Keyword,
    /// Function and method names.
    Callable,
    /// Class, interface and other type names.
    TypeName,
}

impl Category {
    /// Order in which the scanner visits categories.
    pub const SCAN_ORDER: [Self; 3] = [Self::TypeName, Self::Keyword, Self::Callable];

    /// Returns the human-readable name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Callable => "callable",
            Self::TypeName => "type name",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when a registry cannot enumerate its universe.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The introspection mechanism could not be reached at all.
    #[error("capability introspection is unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// Introspection ran but produced unusable output.
    #[error("capability introspection failed: {message}")]
    Introspection {
        /// Description of the failure.
        message: String,
    },
}

/// Point-in-time enumeration of every known identifier, per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySnapshot {
    keywords: BTreeSet<String>,
    callables: BTreeSet<String>,
    type_names: BTreeSet<String>,
}

impl CapabilitySnapshot {
    /// Creates a snapshot from the three universes.
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

    /// Returns the universe of one category.
    #[must_use]
    pub const fn universe(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Keyword => &self.keywords,
            Category::Callable => &self.callables,
            Category::TypeName => &self.type_names,
        }
    }

    /// Returns the identifiers of `category` that are not in `allowed`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use snipgate::{CapabilitySnapshot, Category};
    ///
    /// let keywords = BTreeSet::from(["new".to_owned(), "return".to_owned()]);
    /// let snapshot = CapabilitySnapshot::new(keywords, BTreeSet::new(), BTreeSet::new());
    /// let allowed = BTreeSet::from(["return".to_owned()]);
    /// let forbidden = snapshot.forbidden(Category::Keyword, &allowed);
    /// assert_eq!(forbidden, BTreeSet::from(["new".to_owned()]));
    /// ```
    #[must_use]
    pub fn forbidden(&self, category: Category, allowed: &BTreeSet<String>) -> BTreeSet<String> {
        self.universe(category)
            .difference(allowed)
            .cloned()
            .collect()
    }
}

/// Source of the identifier universes known to the embedding environment.
///
/// Implementations must reflect the environment's current state on every
/// call rather than a copy frozen at construction time.
pub trait CapabilityRegistry {
    /// Returns every reserved word and control construct of the language.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when the universe cannot be enumerated.
    fn keywords(&self) -> Result<BTreeSet<String>, RegistryError>;

    /// Returns every callable currently known, builtin or host-defined.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when the universe cannot be enumerated.
    fn callables(&self) -> Result<BTreeSet<String>, RegistryError>;

    /// Returns every type name currently declared.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when the universe cannot be enumerated.
    fn type_names(&self) -> Result<BTreeSet<String>, RegistryError>;

    /// Captures all three universes at once.
    ///
    /// Override this when one round trip can produce every category.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when any universe cannot be enumerated.
    fn snapshot(&self) -> Result<CapabilitySnapshot, RegistryError> {
        Ok(CapabilitySnapshot::new(
            self.keywords()?,
            self.callables()?,
            self.type_names()?,
        ))
    }
}

impl<T: CapabilityRegistry + ?Sized> CapabilityRegistry for &T {
    fn keywords(&self) -> Result<BTreeSet<String>, RegistryError> {
        (**self).keywords()
    }

    fn callables(&self) -> Result<BTreeSet<String>, RegistryError> {
        (**self).callables()
    }

    fn type_names(&self) -> Result<BTreeSet<String>, RegistryError> {
        (**self).type_names()
    }

    fn snapshot(&self) -> Result<CapabilitySnapshot, RegistryError> {
        (**self).snapshot()
    }
}

/// Registry backed by explicit in-memory tables.
///
/// Identifiers can be defined between evaluations, mirroring a host program
/// that loads more code as it runs.
///
/// # Example
///
/// ```
/// use snipgate::{CapabilityRegistry, InMemoryRegistry};
///
/// let mut registry = InMemoryRegistry::new().with_keywords(["return", "new"]);
/// registry.define_callable("strlen");
/// assert!(registry.callables().unwrap().contains("strlen"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryRegistry {
    keywords: BTreeSet<String>,
    callables: BTreeSet<String>,
    type_names: BTreeSet<String>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds keywords, returning the registry for chaining.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds callables, returning the registry for chaining.
    #[must_use]
    pub fn with_callables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.callables.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds type names, returning the registry for chaining.
    #[must_use]
    pub fn with_type_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Defines a keyword. Returns `false` if it was already known.
    pub fn define_keyword(&mut self, name: impl Into<String>) -> bool {
        self.keywords.insert(name.into())
    }

    /// Defines a callable. Returns `false` if it was already known.
    pub fn define_callable(&mut self, name: impl Into<String>) -> bool {
        self.callables.insert(name.into())
    }

    /// Defines a type name. Returns `false` if it was already known.
    pub fn define_type_name(&mut self, name: impl Into<String>) -> bool {
        self.type_names.insert(name.into())
    }
}

impl CapabilityRegistry for InMemoryRegistry {
    fn keywords(&self) -> Result<BTreeSet<String>, RegistryError> {
        Ok(self.keywords.clone())
    }

    fn callables(&self) -> Result<BTreeSet<String>, RegistryError> {
        Ok(self.callables.clone())
    }

    fn type_names(&self) -> Result<BTreeSet<String>, RegistryError> {
        Ok(self.type_names.clone())
    }
}
