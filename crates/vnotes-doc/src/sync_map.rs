//! Line/timestamp synchronization map
//!
//! Maps zero-based line indices to playback timestamps so that moving the
//! text cursor can seek the video and vice versa. The map recomputes
//! itself in response to text-edit deltas: single-row edits re-evaluate
//! one line, multi-row edits renumber every mark at or after the shift
//! point.
//!
//! A line can also be marked [`LineMark::Suppressed`]: the user synced it
//! while no video was attached, declaring "do not sync this line". On the
//! wire a suppressed line is the sentinel `-1`.

use crate::delta::Delta;
use crate::error::SyncMapError;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Wire sentinel standing in for [`LineMark::Suppressed`].
pub const SUPPRESSED_SENTINEL: f64 = -1.0;

/// What a synced line points at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineMark {
    /// Playback position in seconds.
    Timestamp(f64),
    /// Intentionally unsynced; excluded from neighbor averaging and from
    /// breakpoint rendering.
    Suppressed,
}

impl LineMark {
    /// The playback position, if this mark carries one.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Option<f64> {
        match self {
            LineMark::Timestamp(seconds) => Some(*seconds),
            LineMark::Suppressed => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        matches!(self, LineMark::Suppressed)
    }
}

/// Mapping from line index to [`LineMark`], plus the user-facing on/off
/// switch for cursor-driven seeking.
///
/// # Invariants
/// - every key addresses an existing, non-blank line of the current
///   content (entries for deleted lines are shifted or removed, never left
///   dangling)
/// - no key exceeds `line count - 1`
#[derive(Debug, Clone, PartialEq)]
pub struct SyncMap {
    enabled: bool,
    marks: BTreeMap<u32, LineMark>,
}

impl Default for SyncMap {
    fn default() -> Self {
        Self {
            enabled: true,
            marks: BTreeMap::new(),
        }
    }
}

impl SyncMap {
    /// Empty map with syncing enabled.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cursor-driven seeking is on.
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Mark for `line`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, line: u32) -> Option<LineMark> {
        self.marks.get(&line).copied()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        self.marks.contains_key(&line)
    }

    /// Store a mark directly, bypassing neighbor interpolation. Used when
    /// populating a map from persisted state.
    pub fn insert(&mut self, line: u32, mark: LineMark) {
        self.marks.insert(line, mark);
    }

    /// Iterate marks in ascending line order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, LineMark)> + '_ {
        self.marks.iter().map(|(line, mark)| (*line, *mark))
    }

    /// Mark `line` as synced.
    ///
    /// With a playback position available, the new timestamp is the
    /// arithmetic mean of the nearest synced neighbors strictly before and
    /// after `line` (suppressed entries are not eligible neighbors); with
    /// only one neighbor or none, the current playback position is used
    /// directly. Without a playback position (`None`: no video attached)
    /// the line is stored as [`LineMark::Suppressed`].
    ///
    /// Re-syncing an already-synced line recomputes from scratch.
    ///
    /// # Errors
    /// Rejects lines past the end of the document.
    pub fn sync_line(
        &mut self,
        line: u32,
        line_count: u32,
        playback: Option<f64>,
    ) -> Result<LineMark, SyncMapError> {
        if line >= line_count {
            return Err(SyncMapError::LineOutOfRange { line, line_count });
        }

        let mark = match playback {
            None => LineMark::Suppressed,
            Some(position) => {
                let before = self
                    .marks
                    .range(..line)
                    .rev()
                    .find_map(|(_, mark)| mark.timestamp());
                let after = self
                    .marks
                    .range(line + 1..)
                    .find_map(|(_, mark)| mark.timestamp());
                match (before, after) {
                    (Some(earlier), Some(later)) => {
                        LineMark::Timestamp((earlier + later) / 2.0)
                    }
                    _ => LineMark::Timestamp(position),
                }
            }
        };

        self.marks.insert(line, mark);
        Ok(mark)
    }

    /// Remove the mark for `line`; no-op when none exists.
    pub fn unsync(&mut self, line: u32) -> bool {
        self.marks.remove(&line).is_some()
    }

    /// React to one edit event.
    ///
    /// Single-row edits: a row whose text became blank loses its mark; a
    /// previously unmapped row gets synced at the current playback
    /// position; an already-mapped row is left untouched. Multi-row edits
    /// delegate to [`SyncMap::apply_shift`]. `row_text` is the edited
    /// row's text after the edit.
    ///
    /// # Errors
    /// Rejects single-row edits addressing a line past the document end.
    pub fn apply_delta(
        &mut self,
        delta: &Delta,
        row_text: &str,
        line_count: u32,
        playback: Option<f64>,
    ) -> Result<(), SyncMapError> {
        if !delta.is_single_row() {
            self.apply_shift(delta);
            return Ok(());
        }

        let row = delta.start().row;
        if row_text.trim().is_empty() {
            self.unsync(row);
        } else if !self.contains(row) {
            self.sync_line(row, line_count, playback)?;
        }
        Ok(())
    }

    /// Renumber marks after a multi-row edit.
    ///
    /// Marks before the shift point are kept; marks at or after it move by
    /// one row in the edit's direction. For a removal the first removed
    /// row's own mark is dropped, so a shift can never land on a kept
    /// entry. The `enabled` flag is always preserved. Single-row deltas
    /// are a no-op.
    pub fn apply_shift(&mut self, delta: &Delta) {
        let Some(shift) = delta.row_shift() else {
            return;
        };

        let marks = std::mem::take(&mut self.marks);
        for (line, mark) in marks {
            if line < shift.at {
                self.marks.insert(line, mark);
            } else if shift.offset < 0 {
                if line > shift.at {
                    self.marks.insert(line - 1, mark);
                }
            } else {
                self.marks.insert(line + 1, mark);
            }
        }
    }

    /// Ascending line indices carrying real timestamps, for gutter marker
    /// rendering. Suppressed lines are excluded.
    #[must_use]
    pub fn breakpoint_lines(&self) -> Vec<u32> {
        self.marks
            .iter()
            .filter(|(_, mark)| !mark.is_suppressed())
            .map(|(line, _)| *line)
            .collect()
    }
}

// Wire shape: `{"enabled": bool, "<line>": seconds | -1, ...}` with line
// indices as decimal string keys.
impl Serialize for SyncMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.marks.len() + 1))?;
        map.serialize_entry("enabled", &self.enabled)?;
        for (line, mark) in &self.marks {
            let seconds = mark.timestamp().unwrap_or(SUPPRESSED_SENTINEL);
            map.serialize_entry(&line.to_string(), &seconds)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SyncMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SyncMapVisitor;

        impl<'de> Visitor<'de> for SyncMapVisitor {
            type Value = SyncMap;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a sync map object with an `enabled` flag and line entries")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = SyncMap::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == "enabled" {
                        map.enabled = access.next_value()?;
                    } else if let Ok(line) = key.parse::<u32>() {
                        let seconds: f64 = access.next_value()?;
                        let mark = if seconds < 0.0 {
                            LineMark::Suppressed
                        } else {
                            LineMark::Timestamp(seconds)
                        };
                        map.marks.insert(line, mark);
                    } else {
                        // Unknown keys are tolerated, like any other wire
                        // consumer of this shape.
                        let _ = access.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(SyncMapVisitor)
    }
}
