//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;
use quill_source::SourceDb;

/// Formats a diagnostic for some output target.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format:
///
/// ```text
/// error[V003]: expected cascading dependency; found non-cascading dependency instead
///   --> main.swift:3:4
///    |
///  3 | // expected-cascading-member {{A.b}}
///    |    ^^^^^^^^^^^^^^^^^^^^^^^^^
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// The terminal width for line wrapping.
    pub width: u16,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool, width: u16) -> Self {
        Self { color, width }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let word = diag.severity.as_str();
        let severity = if self.color {
            format!("\x1b[1;{}m{word}\x1b[0m", diag.severity.ansi_color())
        } else {
            word.to_string()
        };
        format!("{severity}[{}]: {}\n", diag.code, diag.message)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = self.header(diag);

        if let Some(loc) = source_db.location(diag.primary_span) {
            out.push_str(&format!("  --> {loc}\n"));

            let file = source_db.get_file(diag.primary_span.file);
            let line_num = loc.line.to_string();
            let padding = " ".repeat(line_num.len());
            let line_content = get_source_line(&file.content, diag.primary_span.start);

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            let span_len = diag.primary_span.len().max(1) as usize;
            let carets = "^".repeat(span_len);
            let col_padding = " ".repeat((loc.column as usize).saturating_sub(1));
            out.push_str(&format!("{padding} | {col_padding}{carets}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        if let Some(fix) = &diag.fix {
            for replacement in &fix.replacements {
                out.push_str(&format!(
                    "   = fix: insert `{}`\n",
                    replacement.new_text.trim_end()
                ));
            }
        }

        out
    }
}

fn get_source_line(content: &str, byte_offset: u32) -> &str {
    let offset = (byte_offset as usize).min(content.len());
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    &content[start..end]
}
