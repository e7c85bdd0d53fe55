//! Whole-content opcodes from the first OPWI writers.
//!
//! Those writers recorded every revision as a single three-field opcode that
//! replaces the entire document: `+0|0|<len>` (set), `=0|0|<len>` (set) and
//! `-0|0|<len>` (clear), with `{"=0|0|0": ""}` meaning "no change". The
//! `<len>` field is a character count and carries no information we need.
//! On read they are upgraded to line ops by diffing against the content
//! the chain has produced so far.

use opwi_diff::diff;
use opwi_types::ChangeOp;

/// One legacy whole-content edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LegacyOp {
    /// `+0|0|n` and `=0|0|n`: the document becomes `text`.
    Set(String),
    /// `-0|0|n`: the document becomes empty.
    Clear,
    /// `=0|0|0` with empty text.
    Keep,
}

impl LegacyOp {
    /// Parse a three-field opcode. Returns `None` for anything else,
    /// including current two-field opcodes.
    pub fn parse(opcode: &str, text: &str) -> Option<Self> {
        let mut chars = opcode.chars();
        let symbol = chars.next()?;
        let fields: Vec<&str> = chars.as_str().split('|').collect();
        if fields.len() != 3 || !fields.iter().all(|f| f.parse::<usize>().is_ok()) {
            return None;
        }
        match symbol {
            '=' if fields == ["0", "0", "0"] && text.is_empty() => Some(Self::Keep),
            '+' | '=' => Some(Self::Set(text.to_string())),
            '-' => Some(Self::Clear),
            _ => None,
        }
    }

    /// Returns `true` if `opcode` has the three-field shape.
    pub fn is_legacy_opcode(opcode: &str) -> bool {
        opcode.matches('|').count() == 2
    }
}

/// Turn a block of legacy ops into line ops against `base`.
pub fn upgrade(base: &str, ops: &[LegacyOp]) -> Vec<ChangeOp> {
    let mut content = base;
    for op in ops {
        match op {
            LegacyOp::Set(text) => content = text,
            LegacyOp::Clear => content = "",
            LegacyOp::Keep => {}
        }
    }
    diff(base, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        assert_eq!(
            LegacyOp::parse("+0|0|5", "hello"),
            Some(LegacyOp::Set("hello".into()))
        );
        assert_eq!(
            LegacyOp::parse("=0|0|3", "abc"),
            Some(LegacyOp::Set("abc".into()))
        );
        assert_eq!(LegacyOp::parse("-0|0|3", "abc"), Some(LegacyOp::Clear));
        assert_eq!(LegacyOp::parse("=0|0|0", ""), Some(LegacyOp::Keep));
    }

    #[test]
    fn parse_rejects_other_shapes() {
        assert_eq!(LegacyOp::parse("+0|1", "x"), None);
        assert_eq!(LegacyOp::parse("~0|0|1", "x"), None);
        assert_eq!(LegacyOp::parse("+0|x|1", "x"), None);
        assert_eq!(LegacyOp::parse("", ""), None);
    }

    #[test]
    fn upgrade_set_diffs_against_base() {
        let ops = upgrade("a\nb", &[LegacyOp::Set("a\nc".into())]);
        assert_eq!(ops, vec![ChangeOp::replace(1, 1, "c")]);
    }

    #[test]
    fn upgrade_clear_and_keep() {
        assert_eq!(
            upgrade("a\nb", &[LegacyOp::Clear]),
            vec![ChangeOp::delete(0, 2, "a\nb")]
        );
        assert!(upgrade("a\nb", &[LegacyOp::Keep]).is_empty());
    }

    #[test]
    fn last_set_wins_within_block() {
        let ops = upgrade(
            "",
            &[LegacyOp::Set("first".into()), LegacyOp::Set("second".into())],
        );
        assert_eq!(ops, vec![ChangeOp::insert(0, 1, "second")]);
    }
}
