//! Error types for the document data layer
//!
//! Covers the two caller-error families:
//! - Sync-map operations addressing lines the document does not have
//! - Text-edit deltas addressing positions outside the content

/// Sync-map caller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SyncMapError {
    /// Line index past the end of the document
    #[error("line {line} is outside the document ({line_count} lines)")]
    LineOutOfRange { line: u32, line_count: u32 },
}

/// Text-edit delta application errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeltaError {
    /// Row index past the end of the content
    #[error("row {row} is outside the document ({rows} rows)")]
    RowOutOfRange { row: u32, rows: u32 },

    /// Column index past the end of its row
    #[error("column {column} is past the end of row {row}")]
    ColumnOutOfRange { row: u32, column: u32 },

    /// Removal range with end before start
    #[error("edit range ends before it starts")]
    InvertedRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_map_error_display() {
        let err = SyncMapError::LineOutOfRange {
            line: 9,
            line_count: 3,
        };
        assert!(err.to_string().contains("line 9"));
        assert!(err.to_string().contains("3 lines"));
    }

    #[test]
    fn delta_error_display() {
        let err = DeltaError::ColumnOutOfRange { row: 2, column: 40 };
        assert!(err.to_string().contains("column 40"));
    }
}
