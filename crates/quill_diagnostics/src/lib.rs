//! Diagnostics for the incremental core: request cycles, graph I/O failures,
//! and dependency-verifier findings.
//!
//! [`Diagnostic`]s carry a severity, a [`DiagnosticCode`], a primary span, and
//! optionally a [`SuggestedFix`]. The thread-safe [`DiagnosticSink`]
//! accumulates them so that one run reports every problem, sorted by source
//! location, and [`TerminalRenderer`] formats them for humans.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;
pub mod suggested_fix;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
pub use suggested_fix::{Replacement, SuggestedFix};
