//! Applying suggested fixes to source text.

use crate::error::VerifyError;
use quill_diagnostics::{Diagnostic, Replacement};
use quill_source::Span;
use std::path::Path;

/// Every replacement carried by `diagnostics`, in emission order.
pub fn collect_replacements(diagnostics: &[Diagnostic]) -> Vec<Replacement> {
    diagnostics
        .iter()
        .filter_map(|d| d.fix.as_ref())
        .flat_map(|fix| fix.replacements.iter().cloned())
        .collect()
}

/// Rewrites `text` with `replacements` applied.
///
/// Replacements are applied in order of their start offset, shorter first,
/// and each inserted text is followed by a newline. Replacements may touch
/// but not overlap; an insertion point at the start of a replaced range
/// goes before the replacement.
pub fn apply_fixits(text: &str, replacements: &[Replacement]) -> Result<String, VerifyError> {
    let mut sorted: Vec<&Replacement> = replacements.iter().collect();
    sorted.sort_by_key(|r| (r.span.start, r.span.end));

    let inserted: usize = sorted.iter().map(|r| r.new_text.len() + 1).sum();
    let mut out = String::with_capacity(text.len() + inserted);
    let mut last = 0usize;
    let mut previous: Option<Span> = None;
    for r in sorted {
        if let Some(prev) = previous.filter(|prev| prev.overlaps(&r.span)) {
            return Err(VerifyError::OverlappingFixits {
                offset: r.span.start,
                previous_end: prev.end,
            });
        }
        let (start, end) = (r.span.start as usize, r.span.end as usize);
        let out_of_range = || VerifyError::FixitOutOfRange {
            start,
            end,
            len: text.len(),
        };
        let kept = text.get(last..start).ok_or_else(out_of_range)?;
        if text.get(start..end).is_none() {
            return Err(out_of_range());
        }
        out.push_str(kept);
        out.push_str(&r.new_text);
        out.push('\n');
        last = end;
        previous = Some(r.span);
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Applies `replacements` to the file at `path` in place. Does nothing when
/// there are no replacements.
pub fn apply_fixits_to_file(path: &Path, text: &str, replacements: &[Replacement]) -> Result<(), VerifyError> {
    if replacements.is_empty() {
        return Ok(());
    }
    let fixed = apply_fixits(text, replacements)?;
    std::fs::write(path, fixed).map_err(|source| VerifyError::Io {
        path: path.to_path_buf(),
        source,
    })
}
