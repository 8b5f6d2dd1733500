//! The vocabulary naming facts in the dependency graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What sort of fact a [`DependencyKey`] names.
///
/// Discriminants are persisted in a 3-bit field, so the order is part of the
/// graph file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    /// A name visible at module scope.
    TopLevel = 0,
    /// A nominal type, named by its context.
    Nominal = 1,
    /// Any member of a nominal type; the name is empty.
    PotentialMember = 2,
    /// A specific member of a nominal type.
    Member = 3,
    /// A member found through dynamic (`AnyObject`) lookup.
    DynamicLookup = 4,
    /// A file outside the compilation unit, named by path.
    ExternalDepend = 5,
    /// The source file itself.
    SourceFileProvide = 6,
}

impl NodeKind {
    /// Every kind, in discriminant order.
    pub const ALL: [NodeKind; 7] = [
        NodeKind::TopLevel,
        NodeKind::Nominal,
        NodeKind::PotentialMember,
        NodeKind::Member,
        NodeKind::DynamicLookup,
        NodeKind::ExternalDepend,
        NodeKind::SourceFileProvide,
    ];

    /// Decodes a persisted discriminant.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    /// Short lowercase label used in dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::TopLevel => "top-level",
            NodeKind::Nominal => "nominal",
            NodeKind::PotentialMember => "potential-member",
            NodeKind::Member => "member",
            NodeKind::DynamicLookup => "dynamic-lookup",
            NodeKind::ExternalDepend => "external",
            NodeKind::SourceFileProvide => "source-file",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which facet of a declaration a fact is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DeclAspect {
    /// What other files can observe.
    Interface = 0,
    /// The body only.
    Implementation = 1,
}

impl DeclAspect {
    /// Decodes a persisted discriminant.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(DeclAspect::Interface),
            1 => Some(DeclAspect::Implementation),
            _ => None,
        }
    }

    /// The aspect a use depends on: cascading uses reach through interfaces.
    pub fn for_use(cascades: bool) -> Self {
        if cascades {
            DeclAspect::Interface
        } else {
            DeclAspect::Implementation
        }
    }
}

impl fmt::Display for DeclAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclAspect::Interface => f.write_str("interface"),
            DeclAspect::Implementation => f.write_str("implementation"),
        }
    }
}

/// Identifies one fact in the dependency graph.
///
/// `context` is the enclosing nominal type for member-like kinds and empty
/// otherwise; `name` is empty for nominal and potential-member keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyKey {
    /// The fact's kind.
    pub kind: NodeKind,
    /// The facet of the declaration.
    pub aspect: DeclAspect,
    /// Enclosing type, or empty.
    pub context: String,
    /// The name, or empty.
    pub name: String,
}

impl DependencyKey {
    /// Creates a key from its parts.
    pub fn new(
        kind: NodeKind,
        aspect: DeclAspect,
        context: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            aspect,
            context: context.into(),
            name: name.into(),
        }
    }

    /// A module-scope name.
    pub fn top_level(aspect: DeclAspect, name: impl Into<String>) -> Self {
        Self::new(NodeKind::TopLevel, aspect, "", name)
    }

    /// Any member of `context`.
    pub fn potential_member(aspect: DeclAspect, context: impl Into<String>) -> Self {
        Self::new(NodeKind::PotentialMember, aspect, context, "")
    }

    /// The member `name` of `context`.
    pub fn member(aspect: DeclAspect, context: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Member, aspect, context, name)
    }

    /// A dynamically looked-up member.
    pub fn dynamic_lookup(aspect: DeclAspect, name: impl Into<String>) -> Self {
        Self::new(NodeKind::DynamicLookup, aspect, "", name)
    }

    /// The source file named `swift_deps`.
    pub fn source_file(aspect: DeclAspect, swift_deps: impl Into<String>) -> Self {
        Self::new(NodeKind::SourceFileProvide, aspect, "", swift_deps)
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.aspect, self.kind)?;
        match (self.context.is_empty(), self.name.is_empty()) {
            (true, true) => Ok(()),
            (true, false) => write!(f, " {}", self.name),
            (false, true) => write!(f, " {}", self.context),
            (false, false) => write!(f, " {}.{}", self.context, self.name),
        }
    }
}
