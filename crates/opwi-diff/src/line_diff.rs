//! Line-level diff producing typed change ops.
//!
//! Uses the `similar` crate (Myers, O(n·d)) for the alignment. Every maximal
//! run of old-only lines becomes one `Delete`, every run of new-only lines one
//! `Insert`, both positioned in old-content coordinates. A delete immediately
//! followed by an insert of the same length collapses into a `Replace`.

use opwi_types::{ChangeOp, OpKind};
use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::lines::{join_lines, split_lines};

/// Compute the ops that transform `old` into `new`.
pub fn diff(old: &str, new: &str) -> Vec<ChangeOp> {
    if old == new {
        return Vec::new();
    }

    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let mut ops = Vec::new();

    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                ops.push(ChangeOp::delete(
                    old_index,
                    old_len,
                    join_lines(&old_lines[old_index..old_index + old_len]),
                ));
            }
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => {
                ops.push(ChangeOp::insert(
                    old_index,
                    new_len,
                    join_lines(&new_lines[new_index..new_index + new_len]),
                ));
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                let inserted = join_lines(&new_lines[new_index..new_index + new_len]);
                if old_len == new_len {
                    ops.push(ChangeOp::replace(old_index, new_len, inserted));
                } else {
                    ops.push(ChangeOp::delete(
                        old_index,
                        old_len,
                        join_lines(&old_lines[old_index..old_index + old_len]),
                    ));
                    ops.push(ChangeOp::insert(old_index + old_len, new_len, inserted));
                }
            }
        }
    }

    ops
}

/// Added/removed line totals for a set of ops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn of(ops: &[ChangeOp]) -> Self {
        ops.iter().fold(Self::default(), |mut stats, op| {
            match op.kind {
                OpKind::Insert => stats.additions += op.line_count,
                OpKind::Delete => stats.deletions += op.line_count,
                OpKind::Replace => {
                    stats.additions += op.line_count;
                    stats.deletions += op.line_count;
                }
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply_ops;
    use proptest::prelude::*;

    #[test]
    fn identical_content_no_ops() {
        assert!(diff("hello\nworld\n", "hello\nworld\n").is_empty());
        assert!(diff("", "").is_empty());
    }

    #[test]
    fn creation_is_single_insert() {
        let ops = diff("", "Hello world");
        assert_eq!(ops, vec![ChangeOp::insert(0, 1, "Hello world")]);
    }

    #[test]
    fn appended_line_is_insert_at_old_end() {
        let ops = diff("Hello world", "Hello world\nSecond line");
        assert_eq!(ops, vec![ChangeOp::insert(1, 1, "Second line")]);
    }

    #[test]
    fn removed_line_keeps_text() {
        let ops = diff("a\nb\nc", "a\nc");
        assert_eq!(ops, vec![ChangeOp::delete(1, 1, "b")]);
    }

    #[test]
    fn same_length_change_is_replace() {
        let ops = diff("a\nb\nc\nd\ne", "a\nb\nX\nd\ne");
        assert_eq!(ops, vec![ChangeOp::replace(2, 1, "X")]);
    }

    #[test]
    fn uneven_change_splits_into_delete_and_insert() {
        let ops = diff("a\nb\nc", "a\nX\nY\nc");
        assert_eq!(
            ops,
            vec![ChangeOp::delete(1, 1, "b"), ChangeOp::insert(2, 2, "X\nY")]
        );
        assert_eq!(apply_ops("a\nb\nc", &ops).unwrap(), "a\nX\nY\nc");
    }

    #[test]
    fn trailing_newline_change_is_visible() {
        let ops = diff("a", "a\n");
        assert!(!ops.is_empty());
        assert_eq!(apply_ops("a", &ops).unwrap(), "a\n");
    }

    #[test]
    fn everything_deleted() {
        let ops = diff("x\ny\n", "");
        assert_eq!(ops, vec![ChangeOp::delete(0, 2, "x\ny\n")]);
        assert_eq!(apply_ops("x\ny\n", &ops).unwrap(), "");
    }

    #[test]
    fn ops_in_document_order() {
        let ops = diff("1\n2\n3\n4\n5\n6", "0\n1\n3\n4\n5\n6\n7");
        let mut cursor = 0;
        for op in &ops {
            assert!(op.line_index >= cursor);
            cursor = op.old_end();
        }
    }

    #[test]
    fn large_documents_stay_fast() {
        let old: String = (0..20_000).map(|i| format!("line {i}\n")).collect();
        let mut new = old.replace("line 10000\n", "changed\n");
        new.push_str("tail");
        let ops = diff(&old, &new);
        assert_eq!(apply_ops(&old, &ops).unwrap(), new);
        assert!(ops.len() <= 3);
    }

    #[test]
    fn stats_count_lines() {
        let ops = diff("a\nb\nc", "a\nX\nY\nc");
        assert_eq!(
            DiffStats::of(&ops),
            DiffStats {
                additions: 2,
                deletions: 1
            }
        );
    }

    proptest! {
        #[test]
        fn diff_of_identical_is_empty(x in "[ab\n]{0,40}") {
            prop_assert!(diff(&x, &x).is_empty());
        }

        #[test]
        fn apply_reproduces_new(old in "[abc\n]{0,40}", new in "[abc\n]{0,40}") {
            let ops = diff(&old, &new);
            prop_assert_eq!(apply_ops(&old, &ops).unwrap(), new);
        }

        #[test]
        fn insert_and_replace_counts_match_text(old in "[ab\n]{0,30}", new in "[ab\n]{0,30}") {
            for op in diff(&old, &new) {
                prop_assert!(crate::lines::split_op_text(&op.text, op.line_count).is_some());
            }
        }
    }
}
