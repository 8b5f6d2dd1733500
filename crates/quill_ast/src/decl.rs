//! Declarations and their classification.

use crate::ids::DeclId;
use quill_common::{impl_stable_hash_as, Ident};
use quill_source::FileId;
use serde::{Deserialize, Serialize};

/// What sort of declaration a [`Decl`] is.
///
/// The discriminant is folded into stable paths, so existing values must
/// never be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DeclKind {
    /// A module; the root of every lexical chain.
    Module = 0,
    /// An `enum` type.
    Enum = 1,
    /// A `struct` type.
    Struct = 2,
    /// A `class` type.
    Class = 3,
    /// A `protocol`.
    Protocol = 4,
    /// An `extension` of a named type.
    Extension = 5,
    /// Statements at file scope.
    TopLevelCode = 6,
    /// A `#if` block.
    IfConfig = 7,
    /// An opaque result type.
    OpaqueType = 8,
    /// A `typealias`.
    TypeAlias = 9,
    /// A generic parameter.
    GenericTypeParam = 10,
    /// An `associatedtype` requirement.
    AssociatedType = 11,
    /// A stored or computed variable.
    Var = 12,
    /// A function parameter.
    Param = 13,
    /// A `subscript`.
    Subscript = 14,
    /// An `init`.
    Constructor = 15,
    /// A `deinit`.
    Destructor = 16,
    /// A `func`.
    Func = 17,
    /// A getter, setter, or observer of a property.
    Accessor = 18,
    /// One `case` of an enum.
    EnumElement = 19,
    /// An `import`.
    Import = 20,
    /// `#warning` or `#error`.
    PoundDiagnostic = 21,
    /// A `precedencegroup`.
    PrecedenceGroup = 22,
    /// A placeholder for a member that could not be deserialized.
    MissingMember = 23,
    /// A `let`/`var` pattern binding.
    PatternBinding = 24,
    /// A `case` line grouping enum elements.
    EnumCase = 25,
    /// An `infix operator`.
    InfixOperator = 26,
    /// A `prefix operator`.
    PrefixOperator = 27,
    /// A `postfix operator`.
    PostfixOperator = 28,
}

impl_stable_hash_as!(DeclKind => u8);

impl DeclKind {
    /// Named types that can own members and be extended.
    pub fn is_nominal(self) -> bool {
        matches!(
            self,
            DeclKind::Enum | DeclKind::Struct | DeclKind::Class | DeclKind::Protocol
        )
    }

    /// Kinds whose name is visible to unqualified lookup.
    pub fn is_value_or_type(self) -> bool {
        !matches!(
            self,
            DeclKind::Module
                | DeclKind::Extension
                | DeclKind::TopLevelCode
                | DeclKind::IfConfig
                | DeclKind::Import
                | DeclKind::PoundDiagnostic
                | DeclKind::PatternBinding
                | DeclKind::EnumCase
                | DeclKind::MissingMember
        )
    }
}

/// Formal access level, ordered from most to least restrictive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessLevel {
    /// Visible within the enclosing declaration.
    Private,
    /// Visible within the file.
    FilePrivate,
    /// Visible within the module.
    #[default]
    Internal,
    /// Visible to importers.
    Public,
    /// Visible and overridable by importers.
    Open,
}

/// Which accessor of a property an [`DeclKind::Accessor`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AccessorKind {
    /// `get`
    Get = 0,
    /// `set`
    Set = 1,
    /// `willSet`
    WillSet = 2,
    /// `didSet`
    DidSet = 3,
    /// `_read`
    Read = 4,
    /// `_modify`
    Modify = 5,
}

impl_stable_hash_as!(AccessorKind => u8);

/// Attributes that requests inspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclAttr {
    /// The class was deserialized without all of its designated initializers.
    HasMissingDesignatedInitializers,
    /// A `convenience init`; every other initializer is designated.
    Convenience,
    /// Exposed to dynamic (`AnyObject`) lookup.
    ObjC,
}

/// One declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Decl {
    /// The declaration's kind.
    pub kind: DeclKind,
    /// Declared name. For extensions, the name of the extended type.
    pub name: Ident,
    /// Lexically enclosing declaration; `None` only for modules.
    pub parent: Option<DeclId>,
    /// The file the declaration is written in; `None` for modules.
    pub file: Option<FileId>,
    /// Formal access level.
    pub access: AccessLevel,
    /// Set only for [`DeclKind::Accessor`].
    pub accessor_kind: Option<AccessorKind>,
    /// Separates overloads that share a name, e.g. by parameter count.
    pub discriminator: u32,
    /// Type names in the inheritance clause, in source order.
    pub inherited: Vec<Ident>,
    /// Attributes written on the declaration.
    pub attrs: Vec<DeclAttr>,
    /// Directly nested declarations, in source order.
    pub members: Vec<DeclId>,
}

impl Decl {
    /// A declaration with default access and no members.
    pub fn new(kind: DeclKind, name: Ident, parent: Option<DeclId>, file: Option<FileId>) -> Self {
        Self {
            kind,
            name,
            parent,
            file,
            access: AccessLevel::default(),
            accessor_kind: None,
            discriminator: 0,
            inherited: Vec::new(),
            attrs: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Whether `attr` is written on this declaration.
    pub fn has_attr(&self, attr: DeclAttr) -> bool {
        self.attrs.contains(&attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_common::stable_hash_of;

    #[test]
    fn access_ordering() {
        assert!(AccessLevel::Private < AccessLevel::FilePrivate);
        assert!(AccessLevel::FilePrivate < AccessLevel::Internal);
        assert!(AccessLevel::Public < AccessLevel::Open);
        assert_eq!(AccessLevel::default(), AccessLevel::Internal);
    }

    #[test]
    fn nominal_kinds() {
        assert!(DeclKind::Class.is_nominal());
        assert!(DeclKind::Protocol.is_nominal());
        assert!(!DeclKind::Extension.is_nominal());
        assert!(!DeclKind::Func.is_nominal());
    }

    #[test]
    fn extensions_are_not_looked_up_by_name() {
        assert!(!DeclKind::Extension.is_value_or_type());
        assert!(DeclKind::Struct.is_value_or_type());
        assert!(DeclKind::Func.is_value_or_type());
    }

    #[test]
    fn kinds_hash_through_discriminant() {
        assert_eq!(stable_hash_of(&DeclKind::Accessor), stable_hash_of(&18u8));
        assert_eq!(stable_hash_of(&AccessorKind::Set), stable_hash_of(&1u8));
    }

    #[test]
    fn attrs() {
        let mut decl = Decl::new(DeclKind::Class, Ident::from_raw(0), None, None);
        assert!(!decl.has_attr(DeclAttr::ObjC));
        decl.attrs.push(DeclAttr::ObjC);
        assert!(decl.has_attr(DeclAttr::ObjC));
    }
}
