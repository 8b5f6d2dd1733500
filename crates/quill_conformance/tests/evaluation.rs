//! Request evaluation over real declarations: cycles through the built-in
//! lookups, and dependency recording on cache hits.

use std::sync::Arc;

use quill_ast::{AstContext, DeclId, DeclKind};
use quill_conformance::Project;
use quill_depgraph::NodeKind;
use quill_diagnostics::DiagnosticCode;
use quill_evaluator::requests::{ast_zone, name_lookup_zone, DirectLookupRequest, SuperclassDeclRequest};
use quill_evaluator::{Evaluator, Request, RequestError, RequestRegistry, RequestZone, Zone};
use quill_source::{FileId, Span};

/// Length of a class's superclass chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ClassDepth(DeclId);

impl Request for ClassDepth {
    type Output = usize;
    const NAME: &'static str = "ClassDepth";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<usize, RequestError> {
        match ev.evaluate(SuperclassDeclRequest(self.0))? {
            Some(superclass) => Ok(ev.evaluate(ClassDepth(superclass))? + 1),
            None => Ok(0),
        }
    }
}

fn evaluator(ast: AstContext) -> Evaluator {
    let registry = RequestRegistry::new()
        .with_zone(ast_zone())
        .and_then(|r| r.with_zone(name_lookup_zone()))
        .and_then(|r| r.with_zone(RequestZone::new(Zone::FrontendTool).register::<ClassDepth>()))
        .unwrap();
    Evaluator::new(registry, Arc::new(ast))
}

/// Classes `names[i]` inheriting from `names[i + 1]`, and the last from
/// `last_parent` when given.
fn class_chain(names: &[&str], last_parent: Option<&str>) -> (AstContext, FileId, Vec<DeclId>) {
    let mut ast = AstContext::new();
    let module = ast.add_module("Main");
    let file = FileId::from_raw(0);
    ast.add_file(file, module);
    let classes: Vec<DeclId> = names
        .iter()
        .map(|name| ast.add_top_level(file, DeclKind::Class, name))
        .collect();
    for (i, &class) in classes.iter().enumerate() {
        let parent = names.get(i + 1).copied().or(last_parent);
        if let Some(parent) = parent {
            let parent = ast.intern(parent);
            ast.decl_mut(class).inherited.push(parent);
        }
    }
    (ast, file, classes)
}

#[test]
fn acyclic_chain_evaluates() {
    let (ast, _, classes) = class_chain(&["C", "B", "A"], None);
    let mut ev = evaluator(ast);
    assert_eq!(ev.evaluate(ClassDepth(classes[0])).unwrap(), 2);
    assert_eq!(ev.evaluate(ClassDepth(classes[1])).unwrap(), 1);
    assert_eq!(ev.statistics()["SuperclassDeclRequest"].evaluated, 3);
}

#[test]
fn inheritance_cycle_is_reported_not_followed() {
    let (ast, file, classes) = class_chain(&["A", "B"], Some("A"));
    let mut ev = evaluator(ast);

    let err = ev.evaluate(ClassDepth(classes[0])).unwrap_err();
    let RequestError::Cycle { ref stack, .. } = err else {
        panic!("expected a cycle, got {err:?}");
    };
    assert_eq!(stack.len(), 2);
    assert!(stack[0].starts_with("ClassDepth"));

    let diag = err.to_diagnostic(Span::DUMMY);
    assert_eq!(diag.code, DiagnosticCode::REQUEST_CYCLE);
    assert_eq!(diag.notes.len(), 2);

    // The failure is not cached; the superclass answers are.
    assert!(ev.evaluate(ClassDepth(classes[0])).unwrap_err().is_cycle());
    let stats = ev.statistics()["SuperclassDeclRequest"];
    assert_eq!(stats.evaluated, 2);
    assert!(stats.cache_hits >= 2);
    assert!(ev.active_source().is_none());

    // Both inheritance clauses were recorded as cascading top-level uses.
    let mut uses = Vec::new();
    ev.collector()
        .tracker(file)
        .unwrap()
        .enumerate_all_uses(|kind, _, name, cascades| {
            if kind == NodeKind::TopLevel {
                uses.push((name.to_string(), cascades));
            }
        });
    assert_eq!(uses, vec![("A".to_string(), true), ("B".to_string(), true)]);
}

#[test]
fn cached_lookup_still_records_for_each_file() {
    let mut project = Project::new("Main");
    let a = project.add_file("a.swift", "");
    let b = project.add_file("b.swift", "");
    let c = project.add_file("c.swift", "");
    let foo = project.ast.add_top_level(a, DeclKind::Struct, "Foo");
    project.ast.add_member(foo, DeclKind::Func, "bar");

    let mut build = project.start_build().unwrap();
    let name = build.ident("bar");
    let lookup = DirectLookupRequest { context: foo, name };
    let first = build.use_in(b, true, lookup).unwrap();
    let second = build.use_in(c, false, lookup).unwrap();
    assert_eq!(first, second);
    assert_eq!(build.evaluator().statistics()["DirectLookupRequest"].cache_hits, 1);

    let output = build.finish();
    let member_uses = |file| {
        let mut found = Vec::new();
        output.collector.tracker(file).unwrap().enumerate_all_uses(|kind, ctx, name, cascades| {
            if kind == NodeKind::Member {
                found.push((format!("{ctx}.{name}"), cascades));
            }
        });
        found
    };
    assert_eq!(member_uses(b), vec![("Foo.bar".to_string(), true)]);
    assert_eq!(member_uses(c), vec![("Foo.bar".to_string(), false)]);
}
