use std::time::Duration;

use similar::{DiffTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// One line of one side, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCell {
    pub lineno: usize,
    pub content: String,
}

/// A display row of the split view. A missing side renders as filler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRow {
    pub kind: RowKind,
    pub old: Option<LineCell>,
    pub new: Option<LineCell>,
}

/// Time budget for the line diff before it falls back to a coarse replace.
/// Tighter when side B is editable.
fn diff_deadline(editable: bool) -> Duration {
    if editable {
        Duration::from_millis(50)
    } else {
        Duration::from_millis(500)
    }
}

fn cell(lines: &[&str], idx: usize) -> LineCell {
    LineCell {
        lineno: idx + 1,
        content: lines.get(idx).copied().unwrap_or_default().to_string(),
    }
}

/// Align `old` and `new` line by line. Replaced ranges are paired up row by
/// row; the longer side continues against filler.
pub fn build_split_rows(old: &str, new: &str, editable: bool) -> Vec<SplitRow> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let diff = TextDiff::configure()
        .timeout(diff_deadline(editable))
        .diff_lines(old, new);

    let mut rows = Vec::new();
    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let kind = match tag {
            DiffTag::Equal => RowKind::Equal,
            DiffTag::Delete => RowKind::Delete,
            DiffTag::Insert => RowKind::Insert,
            DiffTag::Replace => RowKind::Replace,
        };
        let len = old_range.len().max(new_range.len());
        for i in 0..len {
            rows.push(SplitRow {
                kind,
                old: (i < old_range.len()).then(|| cell(&old_lines, old_range.start + i)),
                new: (i < new_range.len()).then(|| cell(&new_lines, new_range.start + i)),
            });
        }
    }
    rows
}

/// Index of the first row showing line `lineno` (1-based) of the new side.
pub fn row_for_new_line(rows: &[SplitRow], lineno: usize) -> Option<usize> {
    rows.iter()
        .position(|r| r.new.as_ref().is_some_and(|c| c.lineno == lineno))
}
