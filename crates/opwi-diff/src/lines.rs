//! The line model.
//!
//! Content is split on `\n`. A string ending in a newline has no trailing
//! empty line: its final newline stays attached to the last line instead
//! (`"a\nb\n"` splits to `["a", "b\n"]`). Joining with `\n` therefore always
//! reproduces the input exactly, and `"a"` and `"a\n"` stay distinguishable.

/// Split content into lines. The empty string has no lines.
pub fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<&str> = content.split('\n').collect();
    if content.ends_with('\n') {
        lines.pop();
        // Non-empty content ending in '\n' always leaves at least one piece.
        if let Some(last) = lines.last_mut() {
            let start = content.len() - last.len() - 1;
            *last = &content[start..];
        }
    }
    lines
}

/// Join lines with `\n`. Inverse of [`split_lines`].
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.as_ref().len() + 1).sum());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    out
}

/// Split an op's text back into exactly `line_count` lines.
///
/// Only the last piece may carry a newline, and only as its final character.
/// Returns `None` when the text does not hold that many lines.
pub fn split_op_text(text: &str, line_count: usize) -> Option<Vec<&str>> {
    if line_count == 0 {
        return text.is_empty().then(Vec::new);
    }
    let pieces: Vec<&str> = text.splitn(line_count, '\n').collect();
    if pieces.len() != line_count {
        return None;
    }
    let last = pieces[line_count - 1];
    let body = last.strip_suffix('\n').unwrap_or(last);
    if body.contains('\n') {
        return None;
    }
    Some(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_lines() {
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn trailing_newline_stays_on_last_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b\n"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("\n"), vec!["\n"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", "\n"]);
        assert_eq!(split_lines("\n\nx"), vec!["", "", "x"]);
    }

    #[test]
    fn join_inverts_split() {
        for s in ["", "a", "a\n", "\n", "\n\n", "a\n\nb", "a\r\nb\r\n", "한국어\n위키"] {
            assert_eq!(join_lines(&split_lines(s)), s, "input {s:?}");
        }
    }

    #[test]
    fn op_text_single_empty_line() {
        assert_eq!(split_op_text("", 1), Some(vec![""]));
        assert_eq!(split_op_text("", 0), Some(vec![]));
    }

    #[test]
    fn op_text_keeps_final_newline() {
        assert_eq!(split_op_text("x\nb\n", 2), Some(vec!["x", "b\n"]));
        assert_eq!(split_op_text("\n", 1), Some(vec!["\n"]));
        assert_eq!(split_op_text("\n", 2), Some(vec!["", ""]));
    }

    #[test]
    fn op_text_count_mismatch() {
        assert_eq!(split_op_text("a\nb", 3), None);
        assert_eq!(split_op_text("a\nb\nc", 2), None);
        assert_eq!(split_op_text("a", 0), None);
    }
}
