//! Applying change ops and replaying revision chains.

use opwi_types::{ChangeOp, OpKind, Revision};

use crate::error::{DiffError, DiffResult};
use crate::lines::{join_lines, split_lines, split_op_text};

/// Apply one revision's ops to `content`.
///
/// Op indices are base-content coordinates; a running count of inserted and
/// removed lines translates them into positions in the working buffer. Ops
/// must be sorted and non-overlapping in base coordinates.
pub fn apply_ops(content: &str, ops: &[ChangeOp]) -> DiffResult<String> {
    let mut lines = split_lines(content);
    let mut inserted = 0usize;
    let mut removed = 0usize;
    let mut cursor = 0usize;

    for (position, op) in ops.iter().enumerate() {
        if op.line_index < cursor {
            return Err(DiffError::OpsOutOfOrder {
                position,
                line_index: op.line_index,
                cursor,
            });
        }
        // removed <= cursor <= line_index, so the subtraction never underflows.
        let at = op.line_index.checked_add(inserted).map(|shifted| shifted - removed);
        let end = at.and_then(|at| at.checked_add(op.kind.old_span(op.line_count)));
        let (at, end) = match (at, end) {
            (Some(at), Some(end)) if end <= lines.len() => (at, end),
            _ => {
                return Err(DiffError::OpOutOfRange {
                    position,
                    opcode: op.opcode(),
                    available: lines.len(),
                })
            }
        };

        match op.kind {
            OpKind::Insert => {
                let new_lines = text_lines(position, op)?;
                lines.splice(at..at, new_lines);
                inserted += op.line_count;
            }
            OpKind::Delete => {
                if join_lines(&lines[at..end]) != op.text {
                    return Err(DiffError::DeleteMismatch {
                        position,
                        opcode: op.opcode(),
                    });
                }
                lines.drain(at..end);
                removed += op.line_count;
            }
            OpKind::Replace => {
                let new_lines = text_lines(position, op)?;
                lines.splice(at..end, new_lines);
            }
        }
        cursor = op.old_end();
    }

    Ok(join_lines(&lines))
}

fn text_lines(position: usize, op: &ChangeOp) -> DiffResult<Vec<&str>> {
    split_op_text(&op.text, op.line_count).ok_or_else(|| DiffError::LineCountMismatch {
        position,
        opcode: op.opcode(),
        expected: op.line_count,
    })
}

/// Rebuild content from empty by applying every revision in order.
pub fn replay<'a, I>(revisions: I) -> DiffResult<String>
where
    I: IntoIterator<Item = &'a Revision>,
{
    revisions
        .into_iter()
        .enumerate()
        .try_fold(String::new(), |content, (revision, rev)| {
            apply_ops(&content, &rev.ops).map_err(|source| DiffError::Revision {
                revision,
                source: Box::new(source),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_diff::diff;
    use opwi_types::Timestamp;

    fn rev(ops: Vec<ChangeOp>) -> Revision {
        Revision::new("alice", "127.0.0.1", Timestamp::now(), ops)
    }

    #[test]
    fn apply_empty_ops_is_identity() {
        assert_eq!(apply_ops("a\nb", &[]).unwrap(), "a\nb");
    }

    #[test]
    fn insert_past_end_is_out_of_range() {
        let err = apply_ops("a", &[ChangeOp::insert(2, 1, "x")]).unwrap_err();
        assert!(matches!(err, DiffError::OpOutOfRange { position: 0, .. }));
    }

    #[test]
    fn delete_on_empty_is_out_of_range() {
        let err = apply_ops("", &[ChangeOp::delete(0, 1, "x")]).unwrap_err();
        assert!(matches!(err, DiffError::OpOutOfRange { .. }));
    }

    #[test]
    fn huge_indices_are_out_of_range() {
        for op in [
            ChangeOp::delete(usize::MAX, 1, "x"),
            ChangeOp::replace(usize::MAX, usize::MAX, "x"),
            ChangeOp::insert(usize::MAX, 1, "x"),
        ] {
            let err = apply_ops("a\nb", &[op]).unwrap_err();
            assert!(matches!(err, DiffError::OpOutOfRange { position: 0, .. }));
        }
    }

    #[test]
    fn index_overflow_after_insert_is_out_of_range() {
        let ops = [ChangeOp::insert(0, 1, "x"), ChangeOp::delete(usize::MAX, 1, "y")];
        let err = apply_ops("a", &ops).unwrap_err();
        assert!(matches!(err, DiffError::OpOutOfRange { position: 1, .. }));
    }

    #[test]
    fn delete_text_must_match() {
        let err = apply_ops("a\nb", &[ChangeOp::delete(1, 1, "zzz")]).unwrap_err();
        assert!(matches!(err, DiffError::DeleteMismatch { position: 0, .. }));
    }

    #[test]
    fn count_mismatch_rejected() {
        let err = apply_ops("", &[ChangeOp::insert(0, 3, "only\ntwo")]).unwrap_err();
        assert!(matches!(err, DiffError::LineCountMismatch { expected: 3, .. }));
    }

    #[test]
    fn unsorted_ops_rejected() {
        let ops = vec![ChangeOp::delete(2, 1, "c"), ChangeOp::delete(0, 1, "a")];
        let err = apply_ops("a\nb\nc", &ops).unwrap_err();
        assert!(matches!(err, DiffError::OpsOutOfOrder { position: 1, .. }));
    }

    #[test]
    fn offsets_track_earlier_ops() {
        let ops = vec![
            ChangeOp::insert(0, 2, "x\ny"),
            ChangeOp::delete(1, 1, "b"),
            ChangeOp::replace(2, 1, "C"),
        ];
        assert_eq!(apply_ops("a\nb\nc", &ops).unwrap(), "x\ny\na\nC");
    }

    #[test]
    fn replay_chain() {
        let v1 = "Hello world";
        let v2 = "Hello world\nSecond line";
        let v3 = "Second line\nThird line\n";
        let revisions = vec![
            rev(diff("", v1)),
            rev(diff(v1, v2)),
            rev(diff(v2, v3)),
        ];
        assert_eq!(replay(&revisions).unwrap(), v3);
        assert_eq!(replay(&revisions[..2]).unwrap(), v2);
    }

    #[test]
    fn replay_reports_failing_revision() {
        let revisions = vec![
            rev(diff("", "one")),
            rev(vec![ChangeOp::delete(5, 1, "nope")]),
        ];
        let err = replay(&revisions).unwrap_err();
        assert!(matches!(err, DiffError::Revision { revision: 1, .. }));
    }

    #[test]
    fn replay_of_nothing_is_empty() {
        assert_eq!(replay(&Vec::<Revision>::new()).unwrap(), "");
    }
}
