//! Name lookup requests.
//!
//! Lookups are where a file starts depending on names declared elsewhere, so
//! most requests here are sinks: after producing their result they record the
//! name they looked up in the tracker of the active source file.

use crate::error::RequestError;
use crate::evaluator::Evaluator;
use crate::request::{ActiveSource, CacheKind, DependencySink, DependencySource, Request};
use crate::requests::ast::StablePathRequest;
use quill_ast::{AccessLevel, AstContext, Decl, DeclAttr, DeclId, DeclKind};
use quill_common::{Ident, StablePathId};
use std::sync::Arc;

fn lookup_decl<'a>(ast: &'a AstContext, id: DeclId, request: &'static str) -> Result<&'a Decl, RequestError> {
    ast.try_decl(id).ok_or_else(|| RequestError::Failed {
        request,
        message: format!("unknown declaration {id:?}"),
    })
}

/// Nominal types named `name` at the top level of `decl`'s module.
fn resolve_in_module(ast: &AstContext, decl: DeclId, name: Ident) -> impl Iterator<Item = DeclId> + '_ {
    ast.module_of(decl)
        .map(|module| ast.members_named(module, name))
        .unwrap_or_default()
        .into_iter()
        .filter(move |&candidate| ast[candidate].kind.is_nominal())
}

/// The active source's file, falling back to the file `decl` is written in.
fn active_or_decl_file(ev: &Evaluator, decl: DeclId) -> Option<quill_source::FileId> {
    ev.active_source()
        .map(|source| source.file)
        .or_else(|| ev.ast().try_decl(decl).and_then(|d| d.file))
}

/// Resolves `name` by walking outward from `context` through its lexical
/// parents; the innermost scope with a match wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnqualifiedLookupRequest {
    /// Where the lookup starts.
    pub context: DeclId,
    /// The name being looked up.
    pub name: Ident,
    /// The use cannot affect the file's interface.
    pub known_private: bool,
}

impl Request for UnqualifiedLookupRequest {
    type Output = Vec<DeclId>;
    const NAME: &'static str = "UnqualifiedLookupRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Vec<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        let mut scope = Some(lookup_decl(&ast, self.context, Self::NAME)?);
        let mut current = Some(self.context);
        while let (Some(id), Some(decl)) = (current, scope) {
            let found = ast.members_named(id, self.name);
            if !found.is_empty() {
                return Ok(found);
            }
            current = decl.parent;
            scope = current.and_then(|parent| ast.try_decl(parent));
        }
        Ok(Vec::new())
    }

    fn as_source(&self) -> Option<&dyn DependencySource> {
        Some(self)
    }

    fn as_sink(&self) -> Option<&dyn DependencySink<Vec<DeclId>>> {
        Some(self)
    }
}

impl DependencySource for UnqualifiedLookupRequest {
    fn read_dependency_source(&self, ev: &Evaluator) -> Option<ActiveSource> {
        let file = ev.ast().try_decl(self.context)?.file?;
        Some(ActiveSource {
            file,
            cascades: !self.known_private,
        })
    }
}

impl DependencySink<Vec<DeclId>> for UnqualifiedLookupRequest {
    fn write_dependency_sink(&self, ev: &mut Evaluator, _value: &Vec<DeclId>) {
        let ast = Arc::clone(ev.ast());
        let cascades = ev.is_active_source_cascading();
        if let Some(tracker) = ev.active_tracker() {
            tracker.add_top_level_name(ast.interner().text(self.name), cascades);
        }
    }
}

/// Members of a nominal type named `name`, including those added by
/// extensions in the same module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DirectLookupRequest {
    /// The type being searched.
    pub context: DeclId,
    /// The member name.
    pub name: Ident,
}

impl Request for DirectLookupRequest {
    type Output = Vec<DeclId>;
    const NAME: &'static str = "DirectLookupRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Vec<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        let context = lookup_decl(&ast, self.context, Self::NAME)?;
        let mut found = ast.members_named(self.context, self.name);
        if context.kind.is_nominal() {
            if let Some(module) = ast.module_of(self.context) {
                for ext in ast.members_of_kind(module, DeclKind::Extension) {
                    if ast[ext].name == context.name {
                        found.extend(ast.members_named(ext, self.name));
                    }
                }
            }
        }
        Ok(found)
    }

    fn as_sink(&self) -> Option<&dyn DependencySink<Vec<DeclId>>> {
        Some(self)
    }
}

impl DependencySink<Vec<DeclId>> for DirectLookupRequest {
    fn write_dependency_sink(&self, ev: &mut Evaluator, _value: &Vec<DeclId>) {
        let ast = Arc::clone(ev.ast());
        let cascades = ev.is_active_source_cascading();
        if let Some(tracker) = ev.active_tracker() {
            tracker.add_used_member(ast.name(self.context), ast.interner().text(self.name), cascades);
        }
    }
}

/// Top-level declarations of a module named `name`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LookupInModuleRequest {
    /// The module searched.
    pub module: DeclId,
    /// The name being looked up.
    pub name: Ident,
}

impl Request for LookupInModuleRequest {
    type Output = Vec<DeclId>;
    const NAME: &'static str = "LookupInModuleRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Vec<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        lookup_decl(&ast, self.module, Self::NAME)?;
        Ok(ast.members_named(self.module, self.name))
    }

    fn as_sink(&self) -> Option<&dyn DependencySink<Vec<DeclId>>> {
        Some(self)
    }
}

impl DependencySink<Vec<DeclId>> for LookupInModuleRequest {
    fn write_dependency_sink(&self, ev: &mut Evaluator, _value: &Vec<DeclId>) {
        let Some(source) = ev.active_source() else {
            return;
        };
        let ast = Arc::clone(ev.ast());
        // Lookups into other modules are covered by their interface files.
        if ast.module_of_file(source.file) != Some(self.module) {
            return;
        }
        if let Some(tracker) = ev.active_tracker() {
            tracker.add_top_level_name(ast.interner().text(self.name), source.cascades);
        }
    }
}

/// Dynamic member lookup through `AnyObject`: every `@objc` member named
/// `name` of any class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnyObjectLookupRequest {
    /// The use site.
    pub context: DeclId,
    /// The member name.
    pub name: Ident,
}

impl Request for AnyObjectLookupRequest {
    type Output = Vec<DeclId>;
    const NAME: &'static str = "AnyObjectLookupRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Vec<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        lookup_decl(&ast, self.context, Self::NAME)?;
        let mut found = Vec::new();
        for (_, decl) in ast.decls().filter(|(_, d)| d.kind == DeclKind::Class) {
            for &member in &decl.members {
                let m = &ast[member];
                if m.name == self.name && m.has_attr(DeclAttr::ObjC) {
                    found.push(member);
                }
            }
        }
        Ok(found)
    }

    fn as_sink(&self) -> Option<&dyn DependencySink<Vec<DeclId>>> {
        Some(self)
    }
}

impl DependencySink<Vec<DeclId>> for AnyObjectLookupRequest {
    fn write_dependency_sink(&self, ev: &mut Evaluator, _value: &Vec<DeclId>) {
        let ast = Arc::clone(ev.ast());
        let cascades = ev.is_active_source_cascading();
        if let Some(tracker) = ev.active_tracker() {
            tracker.add_dynamic_lookup_name(ast.interner().text(self.name), cascades);
        }
    }
}

/// Protocols named in a protocol's inheritance clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InheritedProtocolsRequest(pub DeclId);

impl Request for InheritedProtocolsRequest {
    type Output = Vec<DeclId>;
    const NAME: &'static str = "InheritedProtocolsRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Vec<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        let decl = lookup_decl(&ast, self.0, Self::NAME)?;
        let mut protocols = Vec::new();
        for &name in &decl.inherited {
            protocols.extend(resolve_in_module(&ast, self.0, name).filter(|&p| ast[p].kind == DeclKind::Protocol));
        }
        Ok(protocols)
    }

    fn as_source(&self) -> Option<&dyn DependencySource> {
        Some(self)
    }

    fn as_sink(&self) -> Option<&dyn DependencySink<Vec<DeclId>>> {
        Some(self)
    }
}

impl DependencySource for InheritedProtocolsRequest {
    fn read_dependency_source(&self, ev: &Evaluator) -> Option<ActiveSource> {
        let access = ev.ast().try_decl(self.0)?.access;
        Some(ActiveSource {
            file: active_or_decl_file(ev, self.0)?,
            cascades: access > AccessLevel::FilePrivate,
        })
    }
}

impl DependencySink<Vec<DeclId>> for InheritedProtocolsRequest {
    fn write_dependency_sink(&self, ev: &mut Evaluator, value: &Vec<DeclId>) {
        let ast = Arc::clone(ev.ast());
        let cascades = ev.is_active_source_cascading();
        if let Some(tracker) = ev.active_tracker() {
            for &parent in value {
                tracker.add_used_member(ast.name(parent), "", cascades);
            }
        }
    }
}

/// The class named first in a class's inheritance clause, if any.
///
/// Results live in a side table keyed by the class's stable path, so the
/// answer survives for as long as the declaration's identity does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SuperclassDeclRequest(pub DeclId);

impl Request for SuperclassDeclRequest {
    type Output = Option<DeclId>;
    const NAME: &'static str = "SuperclassDeclRequest";
    const CACHING: CacheKind = CacheKind::SeparatelyCached;

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Option<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        let decl = lookup_decl(&ast, self.0, Self::NAME)?;
        let known_private = decl.access <= AccessLevel::FilePrivate;
        for &name in &decl.inherited {
            let found = ev.evaluate(UnqualifiedLookupRequest {
                context: self.0,
                name,
                known_private,
            })?;
            if let Some(class) = found.into_iter().find(|&c| ast[c].kind == DeclKind::Class) {
                return Ok(Some(class));
            }
        }
        Ok(None)
    }

    fn separate_cache_key(&self, ev: &mut Evaluator) -> Option<StablePathId> {
        ev.evaluate(StablePathRequest(self.0)).ok().map(|path| path.fingerprint())
    }
}

/// The nominal type an extension extends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExtendedNominalRequest(pub DeclId);

impl Request for ExtendedNominalRequest {
    type Output = Option<DeclId>;
    const NAME: &'static str = "ExtendedNominalRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Option<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        let ext = lookup_decl(&ast, self.0, Self::NAME)?;
        if ext.kind != DeclKind::Extension {
            return Err(RequestError::Failed {
                request: Self::NAME,
                message: format!("{:?} is a {:?}, not an extension", self.0, ext.kind),
            });
        }
        let nominal = resolve_in_module(&ast, self.0, ext.name).next();
        Ok(nominal)
    }

    fn as_sink(&self) -> Option<&dyn DependencySink<Option<DeclId>>> {
        Some(self)
    }
}

impl DependencySink<Option<DeclId>> for ExtendedNominalRequest {
    fn write_dependency_sink(&self, ev: &mut Evaluator, value: &Option<DeclId>) {
        let Some(nominal) = *value else {
            return;
        };
        let Some(source) = ev.active_source() else {
            return;
        };
        let ast = Arc::clone(ev.ast());
        if ast[nominal].file != Some(source.file) {
            return;
        }
        if let Some(tracker) = ev.active_tracker() {
            tracker.add_used_member(ast.name(nominal), "", source.cascades);
        }
    }
}

/// A class's `deinit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GetDestructorRequest(pub DeclId);

impl Request for GetDestructorRequest {
    type Output = Option<DeclId>;
    const NAME: &'static str = "GetDestructorRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Option<DeclId>, RequestError> {
        let ast = Arc::clone(ev.ast());
        lookup_decl(&ast, self.0, Self::NAME)?;
        Ok(ast.members_of_kind(self.0, DeclKind::Destructor).into_iter().next())
    }

    fn as_source(&self) -> Option<&dyn DependencySource> {
        Some(self)
    }
}

impl DependencySource for GetDestructorRequest {
    fn read_dependency_source(&self, ev: &Evaluator) -> Option<ActiveSource> {
        Some(ActiveSource {
            file: active_or_decl_file(ev, self.0)?,
            cascades: false,
        })
    }
}

/// Whether a public class has designated initializers that importers cannot
/// see, which stops them from inheriting its convenience initializers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HasMissingDesignatedInitializersRequest(pub DeclId);

impl Request for HasMissingDesignatedInitializersRequest {
    type Output = bool;
    const NAME: &'static str = "HasMissingDesignatedInitializersRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<bool, RequestError> {
        let ast = Arc::clone(ev.ast());
        let class = lookup_decl(&ast, self.0, Self::NAME)?;
        if class.has_attr(DeclAttr::HasMissingDesignatedInitializers) {
            return Ok(true);
        }
        if class.access < AccessLevel::Public {
            return Ok(false);
        }
        Ok(ast
            .members_of_kind(self.0, DeclKind::Constructor)
            .into_iter()
            .map(|init| &ast[init])
            .any(|init| !init.has_attr(DeclAttr::Convenience) && init.access < AccessLevel::Public))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RequestRegistry;
    use crate::requests::{ast_zone, name_lookup_zone};
    use quill_depgraph::{DependencyCollector, NodeKind};
    use quill_source::FileId;

    const A: FileId = FileId::from_raw(0);
    const B: FileId = FileId::from_raw(1);

    struct Fixture {
        ast: AstContext,
        module: DeclId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut ast = AstContext::new();
            let module = ast.add_module("Main");
            ast.add_file(A, module);
            ast.add_file(B, module);
            Self { ast, module }
        }

        fn evaluator(self) -> Evaluator {
            let lookups = name_lookup_zone()
                .register::<WithSource<DirectLookupRequest>>()
                .register::<WithSource<LookupInModuleRequest>>()
                .register::<WithSource<AnyObjectLookupRequest>>()
                .register::<WithSource<ExtendedNominalRequest>>();
            let registry = RequestRegistry::new()
                .with_zone(ast_zone())
                .and_then(|r| r.with_zone(lookups))
                .unwrap();
            Evaluator::new(registry, Arc::new(self.ast))
        }
    }

    fn uses(collector: &DependencyCollector, file: FileId) -> Vec<(NodeKind, String, String, bool)> {
        let mut out = Vec::new();
        if let Some(tracker) = collector.tracker(file) {
            tracker.enumerate_all_uses(|kind, context, name, cascades| {
                out.push((kind, context.to_string(), name.to_string(), cascades));
            });
        }
        out
    }

    fn entry(kind: NodeKind, context: &str, name: &str, cascades: bool) -> (NodeKind, String, String, bool) {
        (kind, context.to_string(), name.to_string(), cascades)
    }

    #[test]
    fn unqualified_lookup_walks_outward() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_top_level(A, DeclKind::Struct, "Foo");
        let method = fx.ast.add_member(foo, DeclKind::Func, "run");
        let helper = fx.ast.add_top_level(B, DeclKind::Func, "helper");
        let name = fx.ast.intern("helper");
        let mut ev = fx.evaluator();

        let found = ev
            .evaluate(UnqualifiedLookupRequest {
                context: method,
                name,
                known_private: false,
            })
            .unwrap();
        assert_eq!(found, vec![helper]);

        let collector = ev.take_trackers();
        assert_eq!(uses(&collector, A), vec![entry(NodeKind::TopLevel, "", "helper", true)]);
        assert!(collector.tracker(B).is_none());
    }

    #[test]
    fn known_private_lookup_does_not_cascade() {
        let mut fx = Fixture::new();
        let user = fx.ast.add_top_level(A, DeclKind::Func, "user");
        let name = fx.ast.intern("Missing");
        let mut ev = fx.evaluator();
        let found = ev
            .evaluate(UnqualifiedLookupRequest {
                context: user,
                name,
                known_private: true,
            })
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(
            uses(ev.collector(), A),
            vec![entry(NodeKind::TopLevel, "", "Missing", false)]
        );
    }

    #[test]
    fn direct_lookup_sees_extensions() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_top_level(A, DeclKind::Struct, "Foo");
        let a = fx.ast.add_member(foo, DeclKind::Func, "go");
        let ext = fx.ast.add_top_level(B, DeclKind::Extension, "Foo");
        let b = fx.ast.add_member(ext, DeclKind::Func, "go");
        let user = fx.ast.add_top_level(B, DeclKind::Func, "user");
        let name = fx.ast.intern("go");
        let mut ev = fx.evaluator();

        let found = ev
            .evaluate(WithSource {
                context: user,
                inner: DirectLookupRequest { context: foo, name },
            })
            .unwrap();
        assert_eq!(found, vec![a, b]);
        assert_eq!(uses(ev.collector(), B), vec![
            entry(NodeKind::Nominal, "Foo", "", true),
            entry(NodeKind::Member, "Foo", "go", true),
        ]);
    }

    #[test]
    fn direct_lookup_without_source_records_nothing() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_top_level(A, DeclKind::Struct, "Foo");
        let name = fx.ast.intern("go");
        let mut ev = fx.evaluator();
        assert!(ev.evaluate(DirectLookupRequest { context: foo, name }).unwrap().is_empty());
        assert!(ev.collector().is_empty());
    }

    #[test]
    fn lookup_in_module_records_only_for_own_module() {
        let mut fx = Fixture::new();
        let other = fx.ast.add_module("Other");
        let main = fx.module;
        let user = fx.ast.add_top_level(A, DeclKind::Func, "user");
        let name = fx.ast.intern("Thing");
        let mut ev = fx.evaluator();

        // Uncached outer request providing the active source.
        ev.evaluate(WithSource {
            context: user,
            inner: LookupInModuleRequest { module: other, name },
        })
        .unwrap();
        assert!(uses(ev.collector(), A).is_empty());

        ev.evaluate(WithSource {
            context: user,
            inner: LookupInModuleRequest { module: main, name },
        })
        .unwrap();
        assert_eq!(uses(ev.collector(), A), vec![entry(NodeKind::TopLevel, "", "Thing", true)]);
    }

    #[test]
    fn any_object_lookup_finds_objc_members() {
        let mut fx = Fixture::new();
        let c = fx.ast.add_top_level(A, DeclKind::Class, "C");
        let objc = fx.ast.add_member(c, DeclKind::Func, "ping");
        fx.ast.decl_mut(objc).attrs.push(DeclAttr::ObjC);
        fx.ast.add_member(c, DeclKind::Func, "ping");
        let s = fx.ast.add_top_level(A, DeclKind::Struct, "S");
        fx.ast.add_member(s, DeclKind::Func, "ping");
        let user = fx.ast.add_top_level(B, DeclKind::Func, "user");
        let name = fx.ast.intern("ping");
        let mut ev = fx.evaluator();

        let found = ev
            .evaluate(WithSource {
                context: user,
                inner: AnyObjectLookupRequest { context: user, name },
            })
            .unwrap();
        assert_eq!(found, vec![objc]);
        assert_eq!(uses(ev.collector(), B), vec![entry(NodeKind::DynamicLookup, "", "ping", true)]);
    }

    #[test]
    fn inherited_protocols_cascade_with_access() {
        let mut fx = Fixture::new();
        let p = fx.ast.add_top_level(A, DeclKind::Protocol, "P");
        let public = fx.ast.add_top_level(B, DeclKind::Protocol, "Q");
        let private = fx.ast.add_top_level(B, DeclKind::Protocol, "R");
        let p_name = fx.ast.intern("P");
        fx.ast.decl_mut(public).access = AccessLevel::Public;
        fx.ast.decl_mut(public).inherited.push(p_name);
        fx.ast.decl_mut(private).access = AccessLevel::FilePrivate;
        fx.ast.decl_mut(private).inherited.push(p_name);
        let mut ev = fx.evaluator();

        assert_eq!(ev.evaluate(InheritedProtocolsRequest(public)).unwrap(), vec![p]);
        assert_eq!(uses(ev.collector(), B), vec![
            entry(NodeKind::Nominal, "P", "", true),
            entry(NodeKind::PotentialMember, "P", "", true),
        ]);

        ev.take_trackers();
        assert_eq!(ev.evaluate(InheritedProtocolsRequest(private)).unwrap(), vec![p]);
        assert_eq!(uses(ev.collector(), B), vec![
            entry(NodeKind::Nominal, "P", "", false),
            entry(NodeKind::PotentialMember, "P", "", false),
        ]);
    }

    #[test]
    fn superclass_is_separately_cached() {
        let mut fx = Fixture::new();
        let base = fx.ast.add_top_level(A, DeclKind::Class, "Base");
        let derived = fx.ast.add_top_level(B, DeclKind::Class, "Derived");
        let base_name = fx.ast.intern("Base");
        fx.ast.decl_mut(derived).inherited.push(base_name);
        let mut ev = fx.evaluator();

        assert_eq!(ev.evaluate(SuperclassDeclRequest(derived)).unwrap(), Some(base));
        assert_eq!(ev.evaluate(SuperclassDeclRequest(derived)).unwrap(), Some(base));
        assert_eq!(ev.evaluate(SuperclassDeclRequest(base)).unwrap(), None);

        let stats = ev.statistics()["SuperclassDeclRequest"];
        assert_eq!(stats.evaluated, 2);
        assert_eq!(stats.cache_hits, 1);
        assert!(!ev.is_cached(&SuperclassDeclRequest(derived)));
        assert_eq!(uses(ev.collector(), B), vec![entry(NodeKind::TopLevel, "", "Base", true)]);
    }

    #[test]
    fn extended_nominal_records_same_file_only() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_top_level(A, DeclKind::Struct, "Foo");
        let ext_a = fx.ast.add_top_level(A, DeclKind::Extension, "Foo");
        let ext_b = fx.ast.add_top_level(B, DeclKind::Extension, "Foo");
        let user_a = fx.ast.add_top_level(A, DeclKind::Func, "a");
        let user_b = fx.ast.add_top_level(B, DeclKind::Func, "b");
        let mut ev = fx.evaluator();

        ev.evaluate(WithSource {
            context: user_b,
            inner: ExtendedNominalRequest(ext_b),
        })
        .unwrap();
        assert!(uses(ev.collector(), B).is_empty());

        let found = ev
            .evaluate(WithSource {
                context: user_a,
                inner: ExtendedNominalRequest(ext_a),
            })
            .unwrap();
        assert_eq!(found, Some(foo));
        assert_eq!(uses(ev.collector(), A), vec![
            entry(NodeKind::Nominal, "Foo", "", true),
            entry(NodeKind::PotentialMember, "Foo", "", true),
        ]);
    }

    #[test]
    fn extended_nominal_rejects_non_extensions() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_top_level(A, DeclKind::Struct, "Foo");
        let mut ev = fx.evaluator();
        let err = ev.evaluate(ExtendedNominalRequest(foo)).unwrap_err();
        assert!(err.to_string().contains("not an extension"));
    }

    #[test]
    fn destructor_source_never_cascades() {
        let mut fx = Fixture::new();
        let c = fx.ast.add_top_level(A, DeclKind::Class, "C");
        let deinit = fx.ast.add_member(c, DeclKind::Destructor, "deinit");
        let mut ev = fx.evaluator();
        assert_eq!(ev.evaluate(GetDestructorRequest(c)).unwrap(), Some(deinit));
        assert!(ev.active_source().is_none());
    }

    #[test]
    fn missing_designated_initializers() {
        let mut fx = Fixture::new();
        let marked = fx.ast.add_top_level(A, DeclKind::Class, "Marked");
        fx.ast.decl_mut(marked).attrs.push(DeclAttr::HasMissingDesignatedInitializers);

        let internal = fx.ast.add_top_level(A, DeclKind::Class, "Internal");
        let hidden = fx.ast.add_member(internal, DeclKind::Constructor, "init");
        fx.ast.decl_mut(hidden).access = AccessLevel::Private;

        let open = fx.ast.add_top_level(A, DeclKind::Class, "Open");
        fx.ast.decl_mut(open).access = AccessLevel::Open;
        let init = fx.ast.add_member(open, DeclKind::Constructor, "init");
        fx.ast.decl_mut(init).access = AccessLevel::Public;
        let convenience = fx.ast.add_member(open, DeclKind::Constructor, "init");
        fx.ast.decl_mut(convenience).attrs.push(DeclAttr::Convenience);

        let public = fx.ast.add_top_level(A, DeclKind::Class, "Public");
        fx.ast.decl_mut(public).access = AccessLevel::Public;
        fx.ast.add_member(public, DeclKind::Constructor, "init");

        let mut ev = fx.evaluator();
        assert!(ev.evaluate(HasMissingDesignatedInitializersRequest(marked)).unwrap());
        assert!(!ev.evaluate(HasMissingDesignatedInitializersRequest(internal)).unwrap());
        assert!(!ev.evaluate(HasMissingDesignatedInitializersRequest(open)).unwrap());
        assert!(ev.evaluate(HasMissingDesignatedInitializersRequest(public)).unwrap());
    }

    /// Evaluates `inner` under the file of `context`, cascading.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct WithSource<R> {
        context: DeclId,
        inner: R,
    }

    impl<R: Request> Request for WithSource<R> {
        type Output = R::Output;
        const NAME: &'static str = "WithSource";
        const CACHING: CacheKind = CacheKind::Uncached;

        fn evaluate(&self, ev: &mut Evaluator) -> Result<R::Output, RequestError> {
            ev.evaluate(self.inner.clone())
        }

        fn as_source(&self) -> Option<&dyn DependencySource> {
            Some(self)
        }
    }

    impl<R> DependencySource for WithSource<R> {
        fn read_dependency_source(&self, ev: &Evaluator) -> Option<ActiveSource> {
            Some(ActiveSource {
                file: ev.ast().try_decl(self.context)?.file?,
                cascades: true,
            })
        }
    }
}
