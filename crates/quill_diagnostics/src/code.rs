//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subsystem a diagnostic code belongs to, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Request evaluation problems such as cycles, prefixed with `Q`.
    Request,
    /// Dependency-graph file problems, prefixed with `G`.
    Graph,
    /// Dependency-verifier findings, prefixed with `V`.
    Verify,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Request => 'Q',
            Category::Graph => 'G',
            Category::Verify => 'V',
        }
    }
}

/// A category prefix plus a number, displayed as e.g. `V003`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// A request transitively depends on itself.
    pub const REQUEST_CYCLE: Self = Self::new(Category::Request, 1);
    /// A request reported a failure.
    pub const REQUEST_FAILED: Self = Self::new(Category::Request, 2);

    /// The dependency graph could not be written.
    pub const GRAPH_WRITE_FAILED: Self = Self::new(Category::Graph, 1);
    /// The dependency graph could not be read back.
    pub const GRAPH_READ_FAILED: Self = Self::new(Category::Graph, 2);

    /// An `expected-*` annotation is missing `{{` or `}}`.
    pub const MALFORMED_EXPECTATION: Self = Self::new(Category::Verify, 1);
    /// An expectation names a dependency that was not recorded.
    pub const MISSING_DEPENDENCY: Self = Self::new(Category::Verify, 2);
    /// A dependency was recorded with the wrong cascading-ness.
    pub const CASCADE_MISMATCH: Self = Self::new(Category::Verify, 3);
    /// A dependency exists despite an `expected-no-dependency`.
    pub const FORBIDDEN_DEPENDENCY: Self = Self::new(Category::Verify, 4);
    /// A recorded dependency has no matching expectation.
    pub const UNDECLARED_DEPENDENCY: Self = Self::new(Category::Verify, 5);
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
