//! The built-in requests, grouped by zone.

pub mod ast;
pub mod frontend;
pub mod name_lookup;

use crate::registry::{RequestRegistry, RequestZone, Zone};
use quill_common::QuillResult;

pub use ast::StablePathRequest;
pub use frontend::ProvidesForFileRequest;
pub use name_lookup::{
    AnyObjectLookupRequest, DirectLookupRequest, ExtendedNominalRequest, GetDestructorRequest,
    HasMissingDesignatedInitializersRequest, InheritedProtocolsRequest, LookupInModuleRequest,
    SuperclassDeclRequest, UnqualifiedLookupRequest,
};

/// Declaration identity requests.
pub fn ast_zone() -> RequestZone {
    RequestZone::new(Zone::Ast).register::<StablePathRequest>()
}

/// Name lookup requests.
pub fn name_lookup_zone() -> RequestZone {
    RequestZone::new(Zone::NameLookup)
        .register::<UnqualifiedLookupRequest>()
        .register::<DirectLookupRequest>()
        .register::<LookupInModuleRequest>()
        .register::<AnyObjectLookupRequest>()
        .register::<InheritedProtocolsRequest>()
        .register::<SuperclassDeclRequest>()
        .register::<ExtendedNominalRequest>()
        .register::<GetDestructorRequest>()
        .register::<HasMissingDesignatedInitializersRequest>()
}

/// Driver-facing requests.
pub fn frontend_zone() -> RequestZone {
    RequestZone::new(Zone::FrontendTool).register::<ProvidesForFileRequest>()
}

/// A registry with every built-in zone installed.
pub fn builtin_registry() -> QuillResult<RequestRegistry> {
    RequestRegistry::new()
        .with_zone(ast_zone())?
        .with_zone(name_lookup_zone())?
        .with_zone(frontend_zone())
}
