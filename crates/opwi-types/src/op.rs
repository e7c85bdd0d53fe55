use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of a line edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    /// New lines inserted before `line_index`.
    Insert,
    /// Lines removed starting at `line_index`.
    Delete,
    /// Lines overwritten in place by the same number of new lines.
    Replace,
}

impl OpKind {
    /// The single-character opcode prefix used in the OPWI format.
    pub fn symbol(self) -> char {
        match self {
            Self::Insert => '+',
            Self::Delete => '-',
            Self::Replace => '~',
        }
    }

    /// Inverse of [`OpKind::symbol`].
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Self::Insert),
            '-' => Some(Self::Delete),
            '~' => Some(Self::Replace),
            _ => None,
        }
    }

    /// Number of lines of the base content this kind consumes for a given count.
    pub fn old_span(self, line_count: usize) -> usize {
        match self {
            Self::Insert => 0,
            Self::Delete | Self::Replace => line_count,
        }
    }
}

/// A single typed edit over a range of lines.
///
/// `line_index` always refers to the content *before* the enclosing revision
/// is applied. `text` holds the affected lines joined by `\n`: the new lines
/// for `Insert`/`Replace`, the removed lines for `Delete`. `line_count` is the
/// authoritative number of lines `text` represents (a single empty line is
/// `text == ""` with `line_count == 1`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeOp {
    pub kind: OpKind,
    pub line_index: usize,
    pub line_count: usize,
    pub text: String,
}

impl ChangeOp {
    pub fn new(kind: OpKind, line_index: usize, line_count: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            line_index,
            line_count,
            text: text.into(),
        }
    }

    pub fn insert(line_index: usize, line_count: usize, text: impl Into<String>) -> Self {
        Self::new(OpKind::Insert, line_index, line_count, text)
    }

    pub fn delete(line_index: usize, line_count: usize, text: impl Into<String>) -> Self {
        Self::new(OpKind::Delete, line_index, line_count, text)
    }

    pub fn replace(line_index: usize, line_count: usize, text: impl Into<String>) -> Self {
        Self::new(OpKind::Replace, line_index, line_count, text)
    }

    /// First base-content line index past the range this op consumes.
    /// Saturates at `usize::MAX` for ops decoded from hostile input.
    pub fn old_end(&self) -> usize {
        self.line_index.saturating_add(self.kind.old_span(self.line_count))
    }

    /// Encode the opcode key, e.g. `+1|2`.
    pub fn opcode(&self) -> String {
        format!("{}{}|{}", self.kind.symbol(), self.line_index, self.line_count)
    }

    /// Parse an opcode key (`<+|-|~><line_index>|<line_count>`) and pair it
    /// with its text.
    pub fn from_opcode(opcode: &str, text: impl Into<String>) -> Result<Self, TypeError> {
        let mut chars = opcode.chars();
        let kind = chars
            .next()
            .and_then(OpKind::from_symbol)
            .ok_or_else(|| TypeError::InvalidOpcode(opcode.to_string()))?;
        let (index, count) = chars
            .as_str()
            .split_once('|')
            .ok_or_else(|| TypeError::InvalidOpcode(opcode.to_string()))?;
        let parse = |field: &str| {
            field
                .parse::<usize>()
                .map_err(|_| TypeError::InvalidOpcode(opcode.to_string()))
        };
        Ok(Self::new(kind, parse(index)?, parse(count)?, text))
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode())
    }
}
