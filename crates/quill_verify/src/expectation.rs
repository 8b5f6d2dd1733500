//! `expected-*` annotations written in source comments.
//!
//! An annotation is a selector followed by a payload in double braces:
//!
//! ```text
//! // expected-provides {{Foo}}
//! // expected-cascading-member {{Foo.bar}}
//! // expected-no-dependency {{Baz}}
//! ```

use quill_diagnostics::{Diagnostic, DiagnosticCode};
use quill_source::{FileId, Span};
use std::fmt;

/// What an expectation asserts about the recorded dependencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpectationKind {
    /// The named dependency must not exist.
    Negative,
    /// The file provides the name, or uses it at the top level.
    Provides,
    /// A use of `Type.member`.
    Member,
    /// A use of some member of a type, as from a superclass or conformance.
    PotentialMember,
    /// A dynamic (`AnyObject`) member lookup.
    DynamicMember,
}

/// Whether the expected dependency cascades.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpectationScope {
    /// Not applicable; negative and provides expectations.
    None,
    /// The dependency does not cascade.
    Private,
    /// The dependency cascades.
    Cascading,
}

impl ExpectationScope {
    /// Scope of a recorded use.
    pub fn of_use(cascades: bool) -> Self {
        if cascades {
            ExpectationScope::Cascading
        } else {
            ExpectationScope::Private
        }
    }

    /// `"cascading"` or `"non-cascading"`; `None` has no description.
    pub fn describe(self) -> Option<&'static str> {
        match self {
            ExpectationScope::None => None,
            ExpectationScope::Private => Some("non-cascading"),
            ExpectationScope::Cascading => Some("cascading"),
        }
    }
}

/// Every accepted selector with its scope and kind.
///
/// Parsing matches selectors in this order, and fix-its render the first
/// selector listed for a (kind, scope) pair.
pub const SELECTORS: &[(&str, ExpectationScope, ExpectationKind)] = &[
    ("expected-no-dependency", ExpectationScope::None, ExpectationKind::Negative),
    ("expected-provides", ExpectationScope::None, ExpectationKind::Provides),
    ("expected-private-superclass", ExpectationScope::Private, ExpectationKind::PotentialMember),
    ("expected-cascading-superclass", ExpectationScope::Cascading, ExpectationKind::PotentialMember),
    ("expected-private-conformance", ExpectationScope::Private, ExpectationKind::PotentialMember),
    ("expected-cascading-conformance", ExpectationScope::Cascading, ExpectationKind::PotentialMember),
    ("expected-private-member", ExpectationScope::Private, ExpectationKind::Member),
    ("expected-cascading-member", ExpectationScope::Cascading, ExpectationKind::Member),
    ("expected-private-dynamic-member", ExpectationScope::Private, ExpectationKind::DynamicMember),
    ("expected-cascading-dynamic-member", ExpectationScope::Cascading, ExpectationKind::DynamicMember),
];

/// The selector used to write an expectation of `kind` and `scope`.
pub fn selector_for(kind: ExpectationKind, scope: ExpectationScope) -> Option<&'static str> {
    SELECTORS
        .iter()
        .find(|(_, s, k)| *k == kind && *s == scope)
        .map(|(selector, _, _)| *selector)
}

/// One parsed annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expectation {
    /// What is expected.
    pub kind: ExpectationKind,
    /// Expected cascading-ness.
    pub scope: ExpectationScope,
    /// Text between the braces.
    pub payload: String,
    /// Location of the payload; diagnostics about the expectation point here.
    pub payload_span: Span,
    /// The whole annotation, selector through closing braces.
    pub span: Span,
}

impl Expectation {
    /// Whether a cascading dependency is expected.
    pub fn is_cascading(&self) -> bool {
        self.scope == ExpectationScope::Cascading
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match selector_for(self.kind, self.scope) {
            Some(selector) => write!(f, "{selector} {{{{{}}}}}", self.payload),
            None => write!(f, "{{{{{}}}}}", self.payload),
        }
    }
}

/// Finds every annotation in `text`.
///
/// Occurrences of `expected-` that match no selector are ignored. An
/// annotation without `{{` right after the selector, or without a closing
/// `}}`, is reported and skipped.
pub fn parse_expectations(file: FileId, text: &str) -> (Vec<Expectation>, Vec<Diagnostic>) {
    let mut expectations = Vec::new();
    let mut diagnostics = Vec::new();

    for (start, _) in text.match_indices("expected-") {
        let rest = &text[start..];
        let Some(&(selector, scope, kind)) = SELECTORS.iter().find(|(sel, _, _)| rest.starts_with(sel)) else {
            continue;
        };

        let after_selector = start + selector.len();
        let open = text[after_selector..]
            .find(|c: char| c != ' ' && c != '\t')
            .map_or(text.len(), |skip| after_selector + skip);

        if !text[open..].starts_with("{{") {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::MALFORMED_EXPECTATION,
                "expected {{ in expectation",
                Span::point(file, open as u32),
            ));
            continue;
        }

        let payload_start = open + 2;
        let Some(len) = text[payload_start..].find("}}") else {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::MALFORMED_EXPECTATION,
                "didn't find '}}' to match '{{' in expectation",
                Span::point(file, open as u32),
            ));
            continue;
        };
        let payload_end = payload_start + len;

        expectations.push(Expectation {
            kind,
            scope,
            payload: text[payload_start..payload_end].to_string(),
            payload_span: Span::new(file, payload_start as u32, payload_end as u32),
            span: Span::new(file, start as u32, (payload_end + 2) as u32),
        });
    }

    (expectations, diagnostics)
}
