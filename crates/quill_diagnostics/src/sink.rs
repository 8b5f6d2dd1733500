//! Thread-safe diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects diagnostics from any number of threads.
///
/// The error count is tracked atomically so `has_errors` never locks. It
/// only changes while the list is locked, so it always counts the errors
/// currently held.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // A panic while holding the lock cannot leave the Vec half-pushed.
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        let mut held = self.lock();
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        held.push(diag);
    }

    /// Emits a batch, keeping its internal order.
    pub fn emit_all(&self, diags: impl IntoIterator<Item = Diagnostic>) {
        let diags: Vec<Diagnostic> = diags.into_iter().collect();
        let errors = diags.iter().filter(|d| d.severity.is_error()).count();
        let mut held = self.lock();
        self.error_count.fetch_add(errors, Ordering::Relaxed);
        held.extend(diags);
    }

    /// Returns `true` if the sink holds any error-severity diagnostic.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics the sink holds.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated diagnostics, leaving the sink empty and its
    /// error count at zero.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut held = self.lock();
        self.error_count.store(0, Ordering::Relaxed);
        std::mem::take(&mut *held)
    }

    /// Takes all diagnostics ordered by primary span.
    ///
    /// The sort is stable, so a note emitted right after its error at the
    /// same location stays after it.
    pub fn take_sorted(&self) -> Vec<Diagnostic> {
        let mut all = self.take_all();
        all.sort_by_key(|d| d.primary_span);
        all
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
