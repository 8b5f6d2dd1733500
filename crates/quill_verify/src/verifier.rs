//! Matching annotations against recorded dependencies.

use crate::error::VerifyError;
use crate::expectation::{parse_expectations, selector_for, Expectation, ExpectationKind, ExpectationScope};
use crate::fixit::{apply_fixits_to_file, collect_replacements};
use crate::obligation::{ObligationKey, ObligationMap};
use quill_depgraph::DependencyCollector;
use quill_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, SuggestedFix};
use quill_source::{FileId, SourceDb, Span};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Outcome of verifying one file.
#[derive(Debug)]
pub struct FileVerification {
    /// The file checked.
    pub file: FileId,
    /// Findings, sorted by location.
    pub diagnostics: Vec<Diagnostic>,
    /// Final state of every recorded dependency.
    pub obligations: ObligationMap,
}

impl FileVerification {
    /// Whether anything was reported.
    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Checks source annotations against the dependencies each file recorded.
pub struct DependencyVerifier<'a> {
    db: &'a SourceDb,
    collector: &'a DependencyCollector,
}

impl<'a> DependencyVerifier<'a> {
    /// Creates a verifier over the files in `db` and the trackers in
    /// `collector`.
    pub fn new(db: &'a SourceDb, collector: &'a DependencyCollector) -> Self {
        Self { db, collector }
    }

    /// Verifies one file. A file with no tracker is checked as if it
    /// recorded nothing.
    pub fn verify_file(&self, file: FileId) -> Result<FileVerification, VerifyError> {
        let source = self.db.try_get_file(file).ok_or(VerifyError::UnknownFile { file })?;
        let (expectations, mut diagnostics) = parse_expectations(file, &source.content);
        let mut obligations = self
            .collector
            .tracker(file)
            .map_or_else(ObligationMap::new, ObligationMap::from_tracker);

        let negatives = match_expectations(&expectations, &mut obligations, &mut diagnostics);
        check_negatives(&negatives, &mut obligations, &mut diagnostics);
        diagnose_unfulfilled(source.end_span(), &obligations, &mut diagnostics);

        debug!(
            file = %source.path.display(),
            expectations = expectations.len(),
            obligations = obligations.len(),
            findings = diagnostics.len(),
            "verified dependencies"
        );

        Ok(FileVerification {
            file,
            diagnostics,
            obligations,
        })
    }

    /// Verifies one file, optionally rewrites it with the suggested fixes,
    /// and emits its findings into `sink` in location order. Returns whether
    /// anything was reported.
    pub fn verify_and_report(&self, file: FileId, auto_fix: bool, sink: &DiagnosticSink) -> Result<bool, VerifyError> {
        let mut result = self.verify_file(file)?;
        if auto_fix {
            let source = self.db.get_file(file);
            apply_fixits_to_file(&source.path, &source.content, &collect_replacements(&result.diagnostics))?;
        }
        result.diagnostics.sort_by_key(|d| d.primary_span);
        let had_error = result.had_error();
        sink.emit_all(result.diagnostics);
        Ok(had_error)
    }
}

/// Verifies `files` in parallel. Returns whether any file had findings.
pub fn verify_dependencies(
    db: &SourceDb,
    collector: &DependencyCollector,
    files: &[FileId],
    auto_fix: bool,
    sink: &DiagnosticSink,
) -> Result<bool, VerifyError> {
    let verifier = DependencyVerifier::new(db, collector);
    let results: Vec<bool> = files
        .par_iter()
        .map(|&file| verifier.verify_and_report(file, auto_fix, sink))
        .collect::<Result<_, _>>()?;
    Ok(results.into_iter().any(|had_error| had_error))
}

fn describe(scope: ExpectationScope) -> &'static str {
    scope.describe().unwrap_or("non-cascading")
}

fn cascade_word(cascades: bool) -> &'static str {
    describe(ExpectationScope::of_use(cascades))
}

/// Settles an obligation for every positive expectation and returns the
/// negative ones keyed by payload.
fn match_expectations<'e>(
    expectations: &'e [Expectation],
    obligations: &mut ObligationMap,
    diagnostics: &mut Vec<Diagnostic>,
) -> HashMap<&'e str, &'e Expectation> {
    let mut negatives = HashMap::new();
    for expectation in expectations {
        let what = match expectation.kind {
            ExpectationKind::Negative => {
                negatives.entry(expectation.payload.as_str()).or_insert(expectation);
                continue;
            }
            ExpectationKind::Member => "member",
            ExpectationKind::PotentialMember => "potential member",
            ExpectationKind::Provides => "provided",
            ExpectationKind::DynamicMember => "dynamic member",
        };

        let key = ObligationKey::new(expectation.payload.as_str(), expectation.kind);
        let at = expectation.payload_span;
        let Some(obligation) = obligations.get_mut(&key) else {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::MISSING_DEPENDENCY,
                format!("expected {what} dependency does not exist: {}", expectation.payload),
                at,
            ));
            continue;
        };
        // Repeated annotations settle the obligation once.
        if !obligation.is_owed() {
            continue;
        }

        let mismatch = match expectation.kind {
            ExpectationKind::Member if obligation.cascades() != expectation.is_cascading() => Some(format!(
                "expected {} dependency; found {} dependency instead",
                cascade_word(expectation.is_cascading()),
                cascade_word(obligation.cascades()),
            )),
            ExpectationKind::PotentialMember if obligation.cascades() != expectation.is_cascading() => Some(format!(
                "expected {} potential member dependency; found {} potential member dependency instead",
                cascade_word(expectation.is_cascading()),
                cascade_word(obligation.cascades()),
            )),
            _ => None,
        };
        match mismatch {
            Some(message) => {
                diagnostics.push(Diagnostic::error(DiagnosticCode::CASCADE_MISMATCH, message, at));
                obligation.fail();
            }
            None => obligation.fulfill(),
        }
    }
    negatives
}

fn check_negatives(
    negatives: &HashMap<&str, &Expectation>,
    obligations: &mut ObligationMap,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if negatives.is_empty() {
        return;
    }
    for (key, obligation) in obligations.iter_mut() {
        if !obligation.is_owed() {
            continue;
        }
        let Some(expectation) = negatives.get(key.name.as_str()) else {
            continue;
        };
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::FORBIDDEN_DEPENDENCY,
            format!("unexpected dependency exists: {}", expectation.payload),
            expectation.payload_span,
        ));
        obligation.fail();
    }
}

/// Reports every obligation no annotation accounted for, each followed by
/// a note whose fix-it adds the missing annotation at `end`.
fn diagnose_unfulfilled(end: Span, obligations: &ObligationMap, diagnostics: &mut Vec<Diagnostic>) {
    for (key, obligation) in obligations.iter().filter(|(_, o)| o.is_owed()) {
        let cascade = describe(obligation.scope);
        let (message, note) = match obligation.kind {
            ExpectationKind::Member => (format!("unexpected {cascade} dependency: {}", key.name), "expect a member dependency"),
            ExpectationKind::DynamicMember => (
                format!("unexpected {cascade} dynamic member dependency: {}", obligation.name),
                "expect a dynamic member dependency",
            ),
            ExpectationKind::PotentialMember => (
                format!("unexpected {cascade} potential member dependency: {}", key.name),
                "expect a potential member",
            ),
            ExpectationKind::Provides => (format!("unexpected provided entity: {}", obligation.name), "expect a provide"),
            ExpectationKind::Negative => continue,
        };
        let Some(selector) = selector_for(obligation.kind, obligation.scope) else {
            continue;
        };

        diagnostics.push(Diagnostic::error(DiagnosticCode::UNDECLARED_DEPENDENCY, message, end));
        diagnostics.push(
            Diagnostic::note(DiagnosticCode::UNDECLARED_DEPENDENCY, note, end).with_fix(SuggestedFix::insert(
                note,
                end,
                format!("// {selector} {{{{{}}}}}", key.name),
            )),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obligation::ObligationState;
    use quill_depgraph::ReferencedNameTracker;
    use quill_diagnostics::Severity;

    struct Fixture {
        db: SourceDb,
        collector: DependencyCollector,
    }

    impl Fixture {
        fn new(text: &str, record: impl FnOnce(&mut ReferencedNameTracker)) -> (Self, FileId) {
            let mut db = SourceDb::new();
            let file = db.add_source("main.swift", text.to_string());
            let mut collector = DependencyCollector::new();
            record(collector.tracker_mut(file));
            (Self { db, collector }, file)
        }

        fn verify(&self, file: FileId) -> FileVerification {
            DependencyVerifier::new(&self.db, &self.collector).verify_file(file).unwrap()
        }
    }

    fn messages(v: &FileVerification) -> Vec<&str> {
        v.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn matching_provide_is_clean() {
        let (fx, file) = Fixture::new("// expected-provides {{foo}}\n", |t| t.add_provide("foo", None));
        let v = fx.verify(file);
        assert!(!v.had_error(), "{:?}", messages(&v));
    }

    #[test]
    fn missing_provide_is_reported() {
        let text = "// expected-provides {{foo}}\n";
        let (fx, file) = Fixture::new(text, |_| {});
        let v = fx.verify(file);
        assert_eq!(messages(&v), vec!["expected provided dependency does not exist: foo"]);
        assert_eq!(v.diagnostics[0].code, DiagnosticCode::MISSING_DEPENDENCY);
        assert_eq!(v.diagnostics[0].primary_span.start, text.find("foo").unwrap() as u32);
    }

    #[test]
    fn cascade_mismatch_fails_obligation() {
        let (fx, file) = Fixture::new("// expected-private-member {{Foo.foo}}\n", |t| {
            t.add_used_member("Foo", "foo", true);
        });
        let v = fx.verify(file);
        assert_eq!(messages(&v), vec!["expected non-cascading dependency; found cascading dependency instead"]);
        let key = ObligationKey::new("Foo.foo", ExpectationKind::Member);
        assert_eq!(v.obligations.get(&key).unwrap().state(), ObligationState::Failed);
    }

    #[test]
    fn potential_member_mismatch() {
        let (fx, file) = Fixture::new("// expected-cascading-conformance {{Proto}}\n", |t| {
            t.add_used_member("Proto", "", false);
        });
        let v = fx.verify(file);
        assert_eq!(
            messages(&v),
            vec!["expected cascading potential member dependency; found non-cascading potential member dependency instead"]
        );
    }

    #[test]
    fn dynamic_members_ignore_cascading() {
        let (fx, file) = Fixture::new("// expected-cascading-dynamic-member {{ping}}\n", |t| {
            t.add_dynamic_lookup_name("ping", false);
        });
        assert!(!fx.verify(file).had_error());
    }

    #[test]
    fn negative_expectation_flags_owed_dependency() {
        let text = "// expected-no-dependency {{Gone}}\n// expected-provides {{Here}}\n";
        let (fx, file) = Fixture::new(text, |t| {
            t.add_provide("Here", None);
            t.add_top_level_name("Gone", false);
        });
        let v = fx.verify(file);
        assert_eq!(messages(&v), vec!["unexpected dependency exists: Gone"]);
        assert_eq!(v.diagnostics[0].code, DiagnosticCode::FORBIDDEN_DEPENDENCY);
        let key = ObligationKey::new("Gone", ExpectationKind::Provides);
        assert_eq!(v.obligations.get(&key).unwrap().state(), ObligationState::Failed);
    }

    #[test]
    fn repeated_annotation_is_harmless() {
        let (fx, file) = Fixture::new("// expected-provides {{A}}\n// expected-provides {{A}}\n", |t| {
            t.add_provide("A", None);
        });
        assert!(!fx.verify(file).had_error());
    }

    #[test]
    fn negative_expectation_without_dependency_is_satisfied() {
        let (fx, file) = Fixture::new("// expected-no-dependency {{Gone}}\n", |_| {});
        assert!(!fx.verify(file).had_error());
    }

    #[test]
    fn unfulfilled_obligations_suggest_annotations() {
        let text = "class A {}\n";
        let (fx, file) = Fixture::new(text, |t| {
            t.add_provide("A", None);
            t.add_used_member("Base", "", false);
            t.add_used_member("Foo", "bar", true);
            t.add_dynamic_lookup_name("ping", true);
        });
        let v = fx.verify(file);
        let errors: Vec<&str> = v
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(errors, vec![
            "unexpected provided entity: A",
            "unexpected non-cascading potential member dependency: Base",
            "unexpected cascading dependency: Foo.bar",
            "unexpected cascading dynamic member dependency: ping",
        ]);

        let fixes: Vec<&str> = v
            .diagnostics
            .iter()
            .filter_map(|d| d.fix.as_ref())
            .map(|f| f.replacements[0].new_text.as_str())
            .collect();
        assert_eq!(fixes, vec![
            "// expected-provides {{A}}",
            "// expected-private-superclass {{Base}}",
            "// expected-cascading-member {{Foo.bar}}",
            "// expected-cascading-dynamic-member {{ping}}",
        ]);
        assert!(v.diagnostics.iter().all(|d| d.primary_span.start == text.len() as u32));
    }

    #[test]
    fn each_error_is_followed_by_its_note() {
        let (fx, file) = Fixture::new("", |t| t.add_provide("A", None));
        let v = fx.verify(file);
        assert_eq!(v.diagnostics.len(), 2);
        assert_eq!(v.diagnostics[0].severity, Severity::Error);
        assert_eq!(v.diagnostics[1].severity, Severity::Note);
        assert_eq!(v.diagnostics[1].message, "expect a provide");
    }

    #[test]
    fn malformed_annotations_are_reported_alongside_matches() {
        let (fx, file) = Fixture::new("// expected-provides A\n// expected-provides {{B}}\n", |t| {
            t.add_provide("B", None);
        });
        let v = fx.verify(file);
        assert_eq!(messages(&v), vec!["expected {{ in expectation"]);
    }

    #[test]
    fn file_without_tracker_checks_against_nothing() {
        let mut db = SourceDb::new();
        let file = db.add_source("a.swift", "// expected-provides {{A}}\n".to_string());
        let collector = DependencyCollector::new();
        let v = DependencyVerifier::new(&db, &collector).verify_file(file).unwrap();
        assert_eq!(messages(&v), vec!["expected provided dependency does not exist: A"]);
    }

    #[test]
    fn unknown_file_is_an_error() {
        let db = SourceDb::new();
        let collector = DependencyCollector::new();
        let err = DependencyVerifier::new(&db, &collector).verify_file(FileId::from_raw(3)).unwrap_err();
        assert!(matches!(err, VerifyError::UnknownFile { .. }));
    }

    #[test]
    fn verify_dependencies_reports_sorted_and_combines_results() {
        let mut db = SourceDb::new();
        let clean = db.add_source("clean.swift", "// expected-provides {{A}}\n".to_string());
        let dirty = db.add_source("dirty.swift", "// expected-provides {{B}}\n// expected-provides {{C}}\n".to_string());
        let mut collector = DependencyCollector::new();
        collector.tracker_mut(clean).add_provide("A", None);

        let sink = DiagnosticSink::new();
        assert!(!verify_dependencies(&db, &collector, &[clean], false, &sink).unwrap());
        assert!(sink.take_all().is_empty());

        assert!(verify_dependencies(&db, &collector, &[clean, dirty], false, &sink).unwrap());
        let reported: Vec<String> = sink.take_all().into_iter().map(|d| d.message).collect();
        assert_eq!(reported, vec![
            "expected provided dependency does not exist: B",
            "expected provided dependency does not exist: C",
        ]);
    }

    #[test]
    fn auto_fix_rewrites_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.swift");
        let text = "let a = 1\n";
        std::fs::write(&path, text).unwrap();

        let mut db = SourceDb::new();
        let file = db.load_file(&path).unwrap();
        let mut collector = DependencyCollector::new();
        collector.tracker_mut(file).add_provide("a", None);
        collector.tracker_mut(file).add_used_member("Int", "", true);

        let sink = DiagnosticSink::new();
        assert!(verify_dependencies(&db, &collector, &[file], true, &sink).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "let a = 1\n// expected-provides {{a}}\n// expected-cascading-superclass {{Int}}\n"
        );

        let mut fixed = SourceDb::new();
        let file = fixed.load_file(&path).unwrap();
        let mut collector2 = DependencyCollector::new();
        collector2.insert(file, collector.tracker(FileId::from_raw(0)).cloned().unwrap());
        assert!(!verify_dependencies(&fixed, &collector2, &[file], false, &sink).unwrap());
    }
}
