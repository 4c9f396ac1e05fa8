//! Text-edit deltas delivered by the editing widget
//!
//! A [`Delta`] describes one edit event: an insertion of one or more lines
//! of text at a position, or the removal of a range. Deltas carry enough
//! information to splice the document content and to decide how the sync
//! map reacts: single-row edits re-evaluate one line, multi-row edits shift
//! every mark at or after the shift point.

use crate::error::DeltaError;
use serde::{Deserialize, Serialize};

/// A caret position in the document, zero-based.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    #[must_use]
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// A single edit event from the text widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Delta {
    /// Insert text at `start`. `lines` holds the inserted text split on
    /// line breaks: one element means no new line is created, two or more
    /// mean `lines.len() - 1` line breaks are introduced.
    Insert { start: Position, lines: Vec<String> },
    /// Remove the range `start..end`.
    Remove { start: Position, end: Position },
}

/// How a multi-row delta renumbers sync-map entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShift {
    /// First row whose marks are renumbered.
    pub at: u32,
    /// Renumbering direction: `+1` for an insertion, `-1` for a removal.
    pub offset: i32,
}

impl Delta {
    /// Position where the edit begins.
    #[inline]
    #[must_use]
    pub fn start(&self) -> Position {
        match self {
            Delta::Insert { start, .. } | Delta::Remove { start, .. } => *start,
        }
    }

    /// Last row touched by the edit.
    #[must_use]
    pub fn end_row(&self) -> u32 {
        match self {
            Delta::Insert { start, lines } => {
                start.row + lines.len().saturating_sub(1) as u32
            }
            Delta::Remove { end, .. } => end.row,
        }
    }

    /// True when the edit is confined to one row (no line break added or
    /// removed).
    #[inline]
    #[must_use]
    pub fn is_single_row(&self) -> bool {
        self.start().row == self.end_row()
    }

    /// Shift instruction for multi-row edits, `None` for single-row ones.
    ///
    /// An insertion beginning at column 0 shifts from the insertion row
    /// itself; a mid-row insertion shifts from the row after it, because
    /// the original row's prefix stays in place and keeps its mark. A
    /// removal shifts from the first removed row.
    #[must_use]
    pub fn row_shift(&self) -> Option<RowShift> {
        if self.is_single_row() {
            return None;
        }
        match self {
            Delta::Insert { start, .. } => Some(RowShift {
                at: if start.column == 0 {
                    start.row
                } else {
                    start.row + 1
                },
                offset: 1,
            }),
            Delta::Remove { start, .. } => Some(RowShift {
                at: start.row,
                offset: -1,
            }),
        }
    }

    /// Splice this edit into `content`, returning the updated text.
    ///
    /// # Errors
    /// Rejects rows past the end of the content, columns past the end of
    /// their row, and removal ranges that end before they start.
    pub fn apply_to(&self, content: &str) -> Result<String, DeltaError> {
        let mut rows: Vec<&str> = content.split('\n').collect();
        let total = rows.len() as u32;

        match self {
            Delta::Insert { start, lines } => {
                if lines.is_empty() {
                    return Ok(content.to_owned());
                }
                let row = check_row(start.row, total)?;
                let current: &str = rows[row];
                let split = byte_index(current, *start)?;
                let (prefix, suffix) = current.split_at(split);

                let spliced: Vec<String> = if let [only] = lines.as_slice() {
                    vec![format!("{prefix}{only}{suffix}")]
                } else {
                    let mut out = Vec::with_capacity(lines.len());
                    out.push(format!("{prefix}{}", lines[0]));
                    out.extend(lines[1..lines.len() - 1].iter().cloned());
                    out.push(format!("{}{suffix}", lines[lines.len() - 1]));
                    out
                };
                rows.splice(row..=row, spliced.iter().map(String::as_str));
                Ok(rows.join("\n"))
            }
            Delta::Remove { start, end } => {
                if (end.row, end.column) < (start.row, start.column) {
                    return Err(DeltaError::InvertedRange);
                }
                let first = check_row(start.row, total)?;
                let last = check_row(end.row, total)?;
                let head = byte_index(rows[first], *start)?;
                let tail = byte_index(rows[last], *end)?;
                let merged = format!("{}{}", &rows[first][..head], &rows[last][tail..]);
                rows.splice(first..=last, [merged.as_str()]);
                Ok(rows.join("\n"))
            }
        }
    }
}

fn check_row(row: u32, total: u32) -> Result<usize, DeltaError> {
    if row < total {
        Ok(row as usize)
    } else {
        Err(DeltaError::RowOutOfRange { row, rows: total })
    }
}

/// Byte offset of character `position.column` within `line`; the offset
/// one past the last character is valid (end-of-line).
fn byte_index(line: &str, position: Position) -> Result<usize, DeltaError> {
    let column = position.column as usize;
    let mut seen = 0;
    for (idx, _) in line.char_indices() {
        if seen == column {
            return Ok(idx);
        }
        seen += 1;
    }
    if seen == column {
        Ok(line.len())
    } else {
        Err(DeltaError::ColumnOutOfRange {
            row: position.row,
            column: position.column,
        })
    }
}
