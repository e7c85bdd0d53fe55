use opwi_diff::apply_ops;
use opwi_document::{Document, DocumentHeader};
use opwi_types::{ChangeOp, DocumentId, Revision, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{CodecError, CodecResult};
use crate::legacy::{self, LegacyOp};
use crate::record::{CorruptRecord, RecordKind};

const DOC: &str = "DOC:";
const META: &str = "META:";
const REVUSER: &str = "REVUSER:";
const REVTIME: &str = "REVTIME:";
const CHANGES: &str = "CHANGES:";
const BLOCK_START: &str = "REVBLOCK:START";
const BLOCK_END: &str = "REVBLOCK:END";

/// The `META:` record.
#[derive(Serialize, Deserialize)]
#[serde(default)]
struct Meta {
    title: String,
    created_at: String,
    tags: Vec<String>,
    category: String,
    namespace: String,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            title: String::new(),
            created_at: String::new(),
            tags: Vec::new(),
            category: String::new(),
            namespace: "main".into(),
        }
    }
}

/// A decoded document together with everything that had to be skipped.
#[derive(Debug)]
pub struct Decoded {
    pub document: Document,
    pub warnings: Vec<CorruptRecord>,
}

impl Decoded {
    /// Returns `true` if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings for records that are missing from [`Decoded::document`].
    pub fn dropped(&self) -> impl Iterator<Item = &CorruptRecord> {
        self.warnings.iter().filter(|w| w.kind.drops_data())
    }

    /// Returns `true` if re-encoding the document keeps every record.
    pub fn is_lossless(&self) -> bool {
        self.dropped().next().is_none()
    }
}

/// Encoder/decoder for the OPWI line format.
pub struct OpwiCodec;

impl OpwiCodec {
    /// Encode a document. Lines are joined by `\n` with no trailing newline.
    pub fn serialize(document: &Document) -> CodecResult<String> {
        let meta = Meta {
            title: document.title().to_string(),
            created_at: document.created_at().as_str().to_string(),
            tags: document.tags().to_vec(),
            category: document.category().to_string(),
            namespace: document.namespace().to_string(),
        };
        let meta = serde_json::to_string(&meta)
            .map_err(|e| CodecError::Serialization(e.to_string()))?;

        let mut lines = Vec::with_capacity(2 + document.revision_count() * 5);
        lines.push(format!("{DOC}{}", document.doc_id()));
        lines.push(format!("{META}{meta}"));
        for revision in document.revisions() {
            lines.push(format!(
                "{REVUSER}{}:{}",
                revision.author, revision.origin_address
            ));
            lines.push(format!("{REVTIME}{}", revision.timestamp));
            lines.push(BLOCK_START.to_string());
            lines.push(format!("{CHANGES}{}", encode_changes(&revision.ops)?));
            lines.push(BLOCK_END.to_string());
        }
        Ok(lines.join("\n"))
    }

    /// Decode a document, skipping and reporting every record that cannot be
    /// used. Content is rebuilt by replaying the surviving revisions.
    pub fn deserialize(input: &str) -> CodecResult<Decoded> {
        let parsed = Parser::default().run(input);
        let mut warnings = parsed.warnings;

        let doc_id = parsed.doc_id.ok_or(CodecError::MissingHeader)?;
        let meta = parsed.meta.unwrap_or_default();
        let created_at = if meta.created_at.is_empty() {
            parsed
                .blocks
                .iter()
                .find_map(|b| b.timestamp.clone())
                .unwrap_or_else(Timestamp::now)
        } else {
            Timestamp::from_string(meta.created_at)
        };

        let mut content = String::new();
        let mut revisions: Vec<Revision> = Vec::with_capacity(parsed.blocks.len());
        for block in parsed.blocks {
            let ops = match block.changes {
                Changes::Lines(ops) => ops,
                Changes::Legacy(ops) => legacy::upgrade(&content, &ops),
            };
            match apply_ops(&content, &ops) {
                Ok(next) => content = next,
                Err(e) => {
                    warnings.push(CorruptRecord::new(
                        block.line,
                        RecordKind::ReplayFailed,
                        e.to_string(),
                    ));
                    continue;
                }
            }

            let timestamp = block.timestamp.unwrap_or_else(|| created_at.clone());
            if let Some(prev) = revisions.last() {
                if timestamp.is_before(&prev.timestamp) {
                    warnings.push(CorruptRecord::new(
                        block.line,
                        RecordKind::TimestampRegression,
                        format!("{timestamp} is earlier than {}", prev.timestamp),
                    ));
                }
            }
            revisions.push(Revision::new(block.author, block.origin, timestamp, ops));
        }

        for record in &warnings {
            warn!(
                doc_id = %doc_id,
                line = record.line,
                kind = %record.kind,
                detail = %record.detail,
                "skipping corrupt OPWI record"
            );
        }

        let header = DocumentHeader {
            doc_id,
            title: meta.title,
            namespace: meta.namespace,
            created_at,
            tags: meta.tags,
            category: meta.category,
        };
        let document = Document::from_parts(header, revisions)?;
        Ok(Decoded { document, warnings })
    }
}

fn encode_changes(ops: &[ChangeOp]) -> CodecResult<String> {
    let entries: Vec<Value> = ops
        .iter()
        .map(|op| {
            let mut entry = Map::new();
            entry.insert(op.opcode(), Value::String(op.text.clone()));
            Value::Object(entry)
        })
        .collect();
    serde_json::to_string(&entries).map_err(|e| CodecError::Serialization(e.to_string()))
}

enum Changes {
    Lines(Vec<ChangeOp>),
    Legacy(Vec<LegacyOp>),
}

fn decode_changes(payload: &str) -> Result<Changes, String> {
    let entries: Vec<Map<String, Value>> =
        serde_json::from_str(payload).map_err(|e| e.to_string())?;

    let mut lines = Vec::new();
    let mut legacy = Vec::new();
    for (opcode, text) in entries.iter().flat_map(|entry| entry.iter()) {
        let text = text
            .as_str()
            .ok_or_else(|| format!("text of {opcode} is not a string"))?;
        if LegacyOp::is_legacy_opcode(opcode) {
            let op = LegacyOp::parse(opcode, text)
                .ok_or_else(|| format!("invalid opcode: {opcode}"))?;
            legacy.push(op);
        } else {
            lines.push(ChangeOp::from_opcode(opcode, text).map_err(|e| e.to_string())?);
        }
    }

    match (lines.is_empty(), legacy.is_empty()) {
        (false, false) => Err("block mixes legacy and line opcodes".into()),
        (true, false) => Ok(Changes::Legacy(legacy)),
        _ => Ok(Changes::Lines(lines)),
    }
}

/// A `REVUSER` line (plus optional `REVTIME`) awaiting its block.
struct PendingRevision {
    line: usize,
    author: String,
    origin: String,
    timestamp: Option<Timestamp>,
}

struct OpenBlock {
    line: usize,
    revision: Option<PendingRevision>,
    payload: String,
}

/// A complete block, decoded but not yet replayed.
struct RawBlock {
    line: usize,
    author: String,
    origin: String,
    timestamp: Option<Timestamp>,
    changes: Changes,
}

#[derive(Default)]
struct Parser {
    doc_id: Option<DocumentId>,
    meta: Option<Meta>,
    pending: Option<PendingRevision>,
    block: Option<OpenBlock>,
    blocks: Vec<RawBlock>,
    warnings: Vec<CorruptRecord>,
}

impl Parser {
    fn run(mut self, input: &str) -> Self {
        for (index, raw) in input.split('\n').enumerate() {
            let line = raw.trim();
            if !line.is_empty() {
                self.line(index + 1, line);
            }
        }
        if let Some(block) = self.block.take() {
            self.skip(block.line, RecordKind::UnterminatedBlock, "end of input inside block");
        }
        if let Some(pending) = self.pending.take() {
            self.orphan(pending);
        }
        self
    }

    fn line(&mut self, number: usize, line: &str) {
        if let Some(block) = self.block.as_mut() {
            if line == BLOCK_END {
                self.close_block();
                return;
            }
            if let Some(payload) = line.strip_prefix(CHANGES) {
                block.payload.push_str(payload);
                return;
            }
            if !is_known_marker(line) {
                // Continuation of a CHANGES payload split across lines.
                block.payload.push_str(line);
                return;
            }
            let start = block.line;
            self.block = None;
            self.skip(start, RecordKind::UnterminatedBlock, format!("block interrupted by {line:?}"));
        }

        if let Some(id) = line.strip_prefix(DOC) {
            self.header(number, id);
        } else if let Some(json) = line.strip_prefix(META) {
            self.meta(number, json);
        } else if let Some(user) = line.strip_prefix(REVUSER) {
            self.revision_header(number, user);
        } else if let Some(time) = line.strip_prefix(REVTIME) {
            self.revision_time(number, time);
        } else if line == BLOCK_START {
            self.block = Some(OpenBlock {
                line: number,
                revision: self.pending.take(),
                payload: String::new(),
            });
        } else if is_marker_shaped(line) {
            self.skip(number, RecordKind::UnknownMarker, line);
        } else {
            self.skip(number, RecordKind::StrayLine, line);
        }
    }

    fn header(&mut self, number: usize, id: &str) {
        if self.doc_id.is_some() {
            self.skip(number, RecordKind::DuplicateHeader, "second DOC line");
            return;
        }
        match DocumentId::parse(id) {
            Ok(id) => self.doc_id = Some(id),
            Err(e) => self.skip(number, RecordKind::InvalidHeader, e.to_string()),
        }
    }

    fn meta(&mut self, number: usize, json: &str) {
        if self.meta.is_some() {
            self.skip(number, RecordKind::DuplicateHeader, "second META line");
            return;
        }
        match serde_json::from_str::<Meta>(json) {
            Ok(meta) => self.meta = Some(meta),
            Err(e) => self.skip(number, RecordKind::InvalidMeta, e.to_string()),
        }
    }

    fn revision_header(&mut self, number: usize, user: &str) {
        if let Some(previous) = self.pending.take() {
            self.orphan(previous);
        }
        // Split at the first ':' only; IPv6 origins contain more.
        match user.split_once(':') {
            Some((author, origin)) if !author.is_empty() => {
                self.pending = Some(PendingRevision {
                    line: number,
                    author: author.to_string(),
                    origin: origin.to_string(),
                    timestamp: None,
                });
            }
            _ => self.skip(
                number,
                RecordKind::InvalidRevisionHeader,
                format!("expected <author>:<origin>, got {user:?}"),
            ),
        }
    }

    fn revision_time(&mut self, number: usize, time: &str) {
        let Some(pending) = self.pending.as_mut() else {
            self.skip(number, RecordKind::StrayLine, "REVTIME without REVUSER");
            return;
        };
        match Timestamp::parse(time) {
            Ok(ts) if pending.timestamp.is_none() => pending.timestamp = Some(ts),
            Ok(_) => self.skip(number, RecordKind::DuplicateHeader, "second REVTIME line"),
            Err(e) => self.skip(number, RecordKind::InvalidRevisionHeader, e.to_string()),
        }
    }

    fn close_block(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        let Some(revision) = block.revision else {
            self.skip(block.line, RecordKind::MissingRevisionHeader, "block without REVUSER");
            return;
        };
        match decode_changes(&block.payload) {
            Ok(changes) => self.blocks.push(RawBlock {
                line: block.line,
                author: revision.author,
                origin: revision.origin,
                timestamp: revision.timestamp,
                changes,
            }),
            Err(detail) => self.skip(block.line, RecordKind::InvalidChanges, detail),
        }
    }

    fn orphan(&mut self, pending: PendingRevision) {
        self.skip(
            pending.line,
            RecordKind::OrphanRevisionHeader,
            format!("no block follows revision by {}", pending.author),
        );
    }

    fn skip(&mut self, line: usize, kind: RecordKind, detail: impl Into<String>) {
        self.warnings.push(CorruptRecord::new(line, kind, detail));
    }
}

fn is_known_marker(line: &str) -> bool {
    [DOC, META, REVUSER, REVTIME].iter().any(|m| line.starts_with(m))
        || line == BLOCK_START
}

/// `NAME:` with an upper-case ASCII name.
fn is_marker_shaped(line: &str) -> bool {
    line.split_once(':').is_some_and(|(name, _)| {
        !name.is_empty() && name.bytes().all(|b| b.is_ascii_uppercase() || b == b'_')
    })
}
