//! The on-disk dependency graph format.
//!
//! A file is the `DDEP` signature followed by one record block:
//!
//! ```text
//! ENTER_SUBBLOCK(4) block-id(vbr8) abbrev-width(vbr4) <align32> length-words(32)
//!   { abbrev(4)=RECORD record-id(vbr6) fields... }*
//! END_BLOCK(4) <align32>
//! ```
//!
//! The first record is always METADATA. IDENTIFIER records follow and define
//! the string table (1-based; index 0 is the empty string). Each
//! MODULE_DEP_GRAPH_NODE may be followed by one FINGERPRINT_NODE. External
//! dependency records may appear anywhere after METADATA. The block must end
//! exactly where its length word says, and nothing may follow it.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::GraphFormatError;
use crate::graph::{ModuleDepGraph, ModuleDepGraphNode};
use crate::key::{DeclAspect, DependencyKey, NodeKind};
use lasso::{Key, Rodeo};
use quill_common::Fingerprint;
use quill_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use quill_source::Span;
use std::path::Path;

/// Leading bytes of every graph file.
pub const SIGNATURE: [u8; 4] = *b"DDEP";

/// Major format version; readers reject any other.
pub const FORMAT_MAJOR: u16 = 1;

/// Minor format version; readers reject any other.
pub const FORMAT_MINOR: u16 = 0;

const ABBREV_WIDTH: u32 = 4;
const END_BLOCK: u64 = 0;
const ENTER_SUBBLOCK: u64 = 1;
const RECORD: u64 = 4;
const RECORD_BLOCK_ID: u64 = 8;

const RECORD_ID_WIDTH: u32 = 6;
const IDENTIFIER_WIDTH: u32 = 13;

/// Record ids within the record block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    /// Format version and producing compiler.
    Metadata = 1,
    /// One graph node.
    ModuleDepGraphNode = 2,
    /// Fingerprint of the preceding node.
    FingerprintNode = 3,
    /// One string-table entry.
    IdentifierNode = 4,
    /// One external dependency path.
    IncrementalExternalDependencyNode = 5,
}

impl RecordKind {
    /// Decodes a record id.
    pub fn from_raw(raw: u64) -> Option<Self> {
        Some(match raw {
            1 => RecordKind::Metadata,
            2 => RecordKind::ModuleDepGraphNode,
            3 => RecordKind::FingerprintNode,
            4 => RecordKind::IdentifierNode,
            5 => RecordKind::IncrementalExternalDependencyNode,
            _ => return None,
        })
    }

    /// Record name as it appears in error messages.
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Metadata => "METADATA",
            RecordKind::ModuleDepGraphNode => "MODULE_DEP_GRAPH_NODE",
            RecordKind::FingerprintNode => "FINGERPRINT_NODE",
            RecordKind::IdentifierNode => "IDENTIFIER_NODE",
            RecordKind::IncrementalExternalDependencyNode => "INCREMENTAL_EXTERNAL_DEPENDENCY_NODE",
        }
    }
}

/// String table built while writing: first use assigns the next id.
struct IdentifierTable {
    rodeo: Rodeo,
}

impl IdentifierTable {
    fn new() -> Self {
        Self {
            rodeo: Rodeo::default(),
        }
    }

    fn intern(&mut self, s: &str) {
        if !s.is_empty() {
            self.rodeo.get_or_intern(s);
        }
    }

    fn id(&self, s: &str) -> u64 {
        if s.is_empty() {
            return 0;
        }
        self.rodeo
            .get(s)
            .map_or(0, |spur| spur.into_usize() as u64 + 1)
    }

    fn strings(&self) -> impl Iterator<Item = &str> {
        self.rodeo.strings()
    }
}

fn begin_record(w: &mut BitWriter, kind: RecordKind) {
    w.fixed(RECORD, ABBREV_WIDTH);
    w.vbr(kind as u64, RECORD_ID_WIDTH);
}

/// Serializes `graph`, tagging it with the producing `compiler_version`.
///
/// The whole file is built in memory so that callers write it in one go.
pub fn write_graph(graph: &ModuleDepGraph, compiler_version: &str) -> Vec<u8> {
    let mut table = IdentifierTable::new();
    graph.for_each_node(|node| {
        if let Some(swift_deps) = &node.swift_deps {
            table.intern(swift_deps);
        }
        table.intern(&node.key.context);
        table.intern(&node.key.name);
    });
    for path in graph.external_dependencies() {
        table.intern(path);
    }

    let mut w = BitWriter::new();
    for byte in SIGNATURE {
        w.fixed(u64::from(byte), 8);
    }
    w.fixed(ENTER_SUBBLOCK, ABBREV_WIDTH);
    w.vbr(RECORD_BLOCK_ID, 8);
    w.vbr(u64::from(ABBREV_WIDTH), 4);
    w.align32();
    let length_at = w.bit_len();
    w.fixed(0, 32);
    let body_start = w.bit_len();

    begin_record(&mut w, RecordKind::Metadata);
    w.fixed(u64::from(FORMAT_MAJOR), 16);
    w.fixed(u64::from(FORMAT_MINOR), 16);
    w.blob(compiler_version.as_bytes());

    for ident in table.strings() {
        begin_record(&mut w, RecordKind::IdentifierNode);
        w.blob(ident.as_bytes());
    }

    graph.for_each_node(|node| {
        begin_record(&mut w, RecordKind::ModuleDepGraphNode);
        w.fixed(node.key.kind as u64, 3);
        w.fixed(node.key.aspect as u64, 1);
        w.vbr(table.id(&node.key.context), IDENTIFIER_WIDTH);
        w.vbr(table.id(&node.key.name), IDENTIFIER_WIDTH);
        w.fixed(u64::from(node.is_provides), 1);
        w.fixed(u64::from(node.swift_deps.is_some()), 1);
        w.vbr(table.id(node.swift_deps.as_deref().unwrap_or("")), IDENTIFIER_WIDTH);

        if let Some(fingerprint) = node.fingerprint {
            begin_record(&mut w, RecordKind::FingerprintNode);
            w.blob(fingerprint.to_string().as_bytes());
        }
    });

    for path in graph.external_dependencies() {
        begin_record(&mut w, RecordKind::IncrementalExternalDependencyNode);
        w.blob(path.as_bytes());
    }

    w.fixed(END_BLOCK, ABBREV_WIDTH);
    w.align32();
    let words = (w.bit_len() - body_start) / 32;
    w.patch_word(length_at, words as u32);
    w.into_bytes()
}

fn read_text<'a>(r: &mut BitReader<'a>) -> Result<&'a str, GraphFormatError> {
    let bit = r.position();
    let data = r.blob()?;
    std::str::from_utf8(data).map_err(|_| GraphFormatError::InvalidUtf8 { bit })
}

fn lookup(identifiers: &[String], index: u64) -> Result<String, GraphFormatError> {
    if index == 0 {
        return Ok(String::new());
    }
    usize::try_from(index - 1)
        .ok()
        .and_then(|i| identifiers.get(i))
        .cloned()
        .ok_or(GraphFormatError::BadIdentifier {
            index,
            count: identifiers.len(),
        })
}

/// Checks the signature and block header. Returns the bit offset the block
/// must end at.
fn read_header(r: &mut BitReader<'_>) -> Result<usize, GraphFormatError> {
    for expected in SIGNATURE {
        if r.fixed(8).map_err(|_| GraphFormatError::BadSignature)? != u64::from(expected) {
            return Err(GraphFormatError::BadSignature);
        }
    }
    let abbrev = r.fixed(ABBREV_WIDTH)?;
    if abbrev != ENTER_SUBBLOCK {
        return Err(GraphFormatError::MissingBlock { found: abbrev });
    }
    let block_id = r.vbr(8)?;
    let width = r.vbr(4)?;
    if block_id != RECORD_BLOCK_ID || width != u64::from(ABBREV_WIDTH) {
        return Err(GraphFormatError::BadBlockHeader { block_id, width });
    }
    r.align32()?;
    let declared = r.fixed(32)?;
    let available = (r.remaining_bits() / 32) as u64;
    if declared > available {
        return Err(GraphFormatError::BadBlockLength { declared, available });
    }
    Ok(r.position() + declared as usize * 32)
}

fn read_node(r: &mut BitReader<'_>, identifiers: &[String]) -> Result<ModuleDepGraphNode, GraphFormatError> {
    let raw_kind = r.fixed(3)?;
    let kind = u8::try_from(raw_kind)
        .ok()
        .and_then(NodeKind::from_raw)
        .ok_or(GraphFormatError::BadNodeKind { raw: raw_kind })?;
    let raw_aspect = r.fixed(1)?;
    let aspect = u8::try_from(raw_aspect)
        .ok()
        .and_then(DeclAspect::from_raw)
        .ok_or(GraphFormatError::BadAspect { raw: raw_aspect })?;
    let context = lookup(identifiers, r.vbr(IDENTIFIER_WIDTH)?)?;
    let name = lookup(identifiers, r.vbr(IDENTIFIER_WIDTH)?)?;
    let is_provides = r.fixed(1)? == 1;
    let has_swift_deps = r.fixed(1)? == 1;
    let swift_deps_id = r.vbr(IDENTIFIER_WIDTH)?;
    let swift_deps = if has_swift_deps {
        Some(lookup(identifiers, swift_deps_id)?)
    } else {
        None
    };
    Ok(ModuleDepGraphNode::new(
        DependencyKey::new(kind, aspect, context, name),
        None,
        swift_deps,
        is_provides,
    ))
}

/// Parses a graph written by [`write_graph`].
///
/// Any structural violation aborts the read; no partial graph is returned.
pub fn read_graph(bytes: &[u8]) -> Result<ModuleDepGraph, GraphFormatError> {
    let mut r = BitReader::new(bytes);
    let block_end = read_header(&mut r)?;

    let mut graph = ModuleDepGraph::new();
    let mut identifiers: Vec<String> = Vec::new();
    let mut current: Option<ModuleDepGraphNode> = None;
    let mut seen_metadata = false;
    let mut seen_node = false;

    loop {
        if r.position() >= block_end {
            return Err(GraphFormatError::BlockOverrun { end_bit: block_end });
        }
        let abbrev = r.fixed(ABBREV_WIDTH)?;
        if abbrev == END_BLOCK {
            r.align32()?;
            break;
        }
        if abbrev != RECORD {
            return Err(GraphFormatError::UnknownAbbreviation { id: abbrev });
        }
        let id = r.vbr(RECORD_ID_WIDTH)?;
        let kind = RecordKind::from_raw(id).ok_or(GraphFormatError::UnknownRecord { id })?;
        if !seen_metadata && kind != RecordKind::Metadata {
            return Err(GraphFormatError::MissingMetadata { found: id });
        }
        let out_of_order = GraphFormatError::UnexpectedRecord { record: kind.name() };

        match kind {
            RecordKind::Metadata => {
                if seen_metadata {
                    return Err(out_of_order);
                }
                let major = r.fixed(16)? as u16;
                let minor = r.fixed(16)? as u16;
                let producer = read_text(&mut r)?;
                if (major, minor) != (FORMAT_MAJOR, FORMAT_MINOR) {
                    return Err(GraphFormatError::VersionMismatch { major, minor });
                }
                tracing::trace!(producer, "reading dependency graph");
                seen_metadata = true;
            }
            RecordKind::IdentifierNode => {
                if seen_node {
                    return Err(out_of_order);
                }
                identifiers.push(read_text(&mut r)?.to_string());
            }
            RecordKind::ModuleDepGraphNode => {
                if let Some(node) = current.take() {
                    graph.add_node(node);
                }
                current = Some(read_node(&mut r, &identifiers)?);
                seen_node = true;
            }
            RecordKind::FingerprintNode => {
                let text = read_text(&mut r)?;
                let node = match current.as_mut() {
                    Some(node) if node.fingerprint.is_none() => node,
                    _ => return Err(out_of_order),
                };
                node.fingerprint = Some(Fingerprint::from_hex(text).ok_or_else(|| {
                    GraphFormatError::BadFingerprint {
                        text: text.to_string(),
                    }
                })?);
            }
            RecordKind::IncrementalExternalDependencyNode => {
                let path = read_text(&mut r)?;
                graph.insert_external_dependency(path);
            }
        }
    }

    if r.position() != block_end {
        return Err(GraphFormatError::BlockEndMismatch {
            expected_bit: block_end,
            found_bit: r.position(),
        });
    }
    if r.remaining_bits() > 0 {
        return Err(GraphFormatError::TrailingData {
            bytes: r.remaining_bits() / 8,
        });
    }

    if let Some(node) = current.take() {
        graph.add_node(node);
    }
    Ok(graph)
}

/// Writes `graph` to `path`, reporting failure through `sink`.
///
/// The file is written with a single call once the full buffer is built.
pub fn write_graph_to_path(
    sink: &DiagnosticSink,
    path: &Path,
    graph: &ModuleDepGraph,
    compiler_version: &str,
) -> bool {
    let bytes = write_graph(graph, compiler_version);
    match std::fs::write(path, &bytes) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote dependency graph");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to write dependency graph");
            sink.emit(Diagnostic::error(
                DiagnosticCode::GRAPH_WRITE_FAILED,
                format!("cannot write dependency graph to {}: {e}", path.display()),
                Span::DUMMY,
            ));
            false
        }
    }
}

/// Reads the graph stored at `path`.
pub fn try_read_graph_from_path(path: &Path) -> Result<ModuleDepGraph, GraphFormatError> {
    let bytes = std::fs::read(path).map_err(|source| GraphFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_graph(&bytes)
}

/// Reads the graph stored at `path` into `graph`.
///
/// Returns `false` and leaves `graph` untouched if the file is missing,
/// from another format version, or malformed.
pub fn read_graph_from_path(path: &Path, graph: &mut ModuleDepGraph) -> bool {
    match try_read_graph_from_path(path) {
        Ok(read) => {
            *graph = read;
            true
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "dependency graph unusable");
            false
        }
    }
}
