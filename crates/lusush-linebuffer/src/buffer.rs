use crate::error::{BufferError, BufferResult};
use unicode_segmentation::UnicodeSegmentation;

/// Smallest capacity `create` will honor; smaller requests are rounded up.
pub const MIN_CAPACITY: usize = 16;
/// Largest capacity a buffer will grow to before `insert` fails with `Oom`.
/// Generous for an interactive line — nothing pasted into a shell prompt
/// legitimately needs more.
pub const MAX_CAPACITY: usize = 64 * 1024 * 1024;

/// A cursor address: the same position expressed three ways, kept in sync
/// by every [`LineBuffer`] operation that moves or invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub byte_offset: usize,
    pub codepoint_index: usize,
    pub grapheme_index: usize,
}

impl Cursor {
    pub const fn start() -> Self {
        Cursor {
            byte_offset: 0,
            codepoint_index: 0,
            grapheme_index: 0,
        }
    }
}

/// One logical line's extent within the buffer's flat text, and its
/// precomputed counts — rebuilt by [`LineBuffer::rebuild_line_structure`]
/// whenever a mutation touches a newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
    pub codepoints: usize,
    pub graphemes: usize,
}

/// The line being edited: text, cursor, and derived counts. The single
/// source of truth for cursor state — [`crate::CursorManager`] computes new
/// positions but every one of them is written back here before any other
/// component may observe it (spec.md §5's synchronization rule).
#[derive(Debug, Clone)]
pub struct LineBuffer {
    text: String,
    capacity: usize,
    cursor: Cursor,
    lines: Vec<LineSpan>,
    lines_dirty: bool,
    codepoint_count: usize,
    grapheme_count: usize,
    validation_failed: bool,
}

impl LineBuffer {
    /// Allocate an empty buffer, capacity clamped to `[MIN_CAPACITY,
    /// MAX_CAPACITY]`, cursor at 0.
    pub fn create(initial_capacity: usize) -> BufferResult<Self> {
        let capacity = initial_capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Ok(LineBuffer {
            text: String::with_capacity(capacity),
            capacity,
            cursor: Cursor::start(),
            lines: vec![LineSpan {
                start: 0,
                end: 0,
                codepoints: 0,
                graphemes: 0,
            }],
            lines_dirty: false,
            codepoint_count: 0,
            grapheme_count: 0,
            validation_failed: false,
        })
    }

    /// Retains capacity; resets length, counts, cursor, and flags.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = Cursor::start();
        self.lines = vec![LineSpan {
            start: 0,
            end: 0,
            codepoints: 0,
            graphemes: 0,
        }];
        self.lines_dirty = false;
        self.codepoint_count = 0;
        self.grapheme_count = 0;
        self.validation_failed = false;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn codepoint_count(&self) -> usize {
        self.codepoint_count
    }

    pub fn grapheme_count(&self) -> usize {
        self.grapheme_count
    }

    pub fn lines(&self) -> &[LineSpan] {
        &self.lines
    }

    /// Write a cursor position computed elsewhere (by [`crate::CursorManager`])
    /// back into the buffer. Callers are responsible for only ever passing
    /// a `Cursor` this buffer itself produced (via `locate_*`), so the three
    /// fields stay mutually consistent.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn is_grapheme_boundary(&self, byte_offset: usize) -> bool {
        if byte_offset == 0 || byte_offset == self.text.len() {
            return self.text.is_char_boundary(byte_offset);
        }
        self.text
            .grapheme_indices(true)
            .any(|(offset, _)| offset == byte_offset)
    }

    /// Insert `text` at byte `position`. Requires `position <= length` and
    /// lands on a UTF-8 boundary; grows capacity (doubling) if needed,
    /// failing with `Oom` only once doubling would exceed `MAX_CAPACITY`.
    pub fn insert(&mut self, position: usize, text: &str) -> BufferResult<()> {
        if position > self.text.len() {
            return Err(BufferError::OutOfRange);
        }
        if !self.text.is_char_boundary(position) {
            return Err(BufferError::InvalidUtf8);
        }
        if text.is_empty() {
            return Ok(());
        }

        let needed = self.text.len() + text.len();
        if needed > self.capacity {
            let mut grown = self.capacity.max(MIN_CAPACITY);
            while grown < needed {
                grown = grown.checked_mul(2).ok_or(BufferError::Oom)?;
            }
            if grown > MAX_CAPACITY {
                if needed > MAX_CAPACITY {
                    return Err(BufferError::Oom);
                }
                grown = MAX_CAPACITY;
            }
            self.text.reserve(grown.saturating_sub(self.text.len()));
            self.capacity = grown;
        }

        self.text.insert_str(position, text);
        self.codepoint_count += text.chars().count();
        self.grapheme_count += text.graphemes(true).count();
        if text.contains('\n') {
            self.lines_dirty = true;
        }
        let inserted_len = text.len();
        if self.cursor.byte_offset >= position {
            self.cursor.byte_offset += inserted_len;
        }
        self.relocate_cursor();
        Ok(())
    }

    /// Delete `len` bytes starting at `position`. The slice `[position,
    /// position+len)` must sit on grapheme boundaries at both ends — true
    /// of any byte count handed back by `CursorManager::move_by_graphemes`.
    pub fn delete(&mut self, position: usize, len: usize) -> BufferResult<()> {
        let end = position.checked_add(len).ok_or(BufferError::OutOfRange)?;
        if end > self.text.len() {
            return Err(BufferError::OutOfRange);
        }
        if !self.is_grapheme_boundary(position) || !self.is_grapheme_boundary(end) {
            return Err(BufferError::InvalidUtf8);
        }
        if len == 0 {
            return Ok(());
        }

        let removed_codepoints = self.text[position..end].chars().count();
        let removed_graphemes = self.text[position..end].graphemes(true).count();
        let removed_has_newline = self.text[position..end].contains('\n');
        self.text.replace_range(position..end, "");
        self.codepoint_count -= removed_codepoints;
        self.grapheme_count -= removed_graphemes;
        if removed_has_newline {
            self.lines_dirty = true;
        }

        self.cursor.byte_offset = if self.cursor.byte_offset >= end {
            self.cursor.byte_offset - len
        } else if self.cursor.byte_offset > position {
            position
        } else {
            self.cursor.byte_offset
        };
        self.relocate_cursor();
        Ok(())
    }

    fn relocate_cursor(&mut self) {
        let prefix = &self.text[..self.cursor.byte_offset];
        self.cursor.codepoint_index = prefix.chars().count();
        self.cursor.grapheme_index = prefix.graphemes(true).count();
    }

    /// Checks every invariant this type maintains and sets/clears
    /// `validation_failed` accordingly; returns the same boolean.
    pub fn validate(&mut self) -> bool {
        if self.lines_dirty {
            self.rebuild_line_structure();
        }
        let cursor_ok = self.cursor.byte_offset <= self.text.len()
            && self.text.is_char_boundary(self.cursor.byte_offset);
        let counts_ok = self.text.chars().count() == self.codepoint_count
            && self.text.graphemes(true).count() == self.grapheme_count;
        let ok = cursor_ok && counts_ok;
        self.validation_failed = !ok;
        ok
    }

    pub fn validation_failed(&self) -> bool {
        self.validation_failed
    }

    /// Recompute `lines[]` (start/end byte offsets and codepoint/grapheme
    /// counts per logical line) in one O(length) pass. Callers that only
    /// ever read `lines()` through `ensure_lines_current` never observe a
    /// stale array.
    pub fn rebuild_line_structure(&mut self) {
        let mut lines = Vec::new();
        let mut start = 0usize;
        for (idx, _) in self.text.match_indices('\n') {
            let segment = &self.text[start..idx];
            lines.push(LineSpan {
                start,
                end: idx,
                codepoints: segment.chars().count(),
                graphemes: segment.graphemes(true).count(),
            });
            start = idx + 1;
        }
        let segment = &self.text[start..];
        lines.push(LineSpan {
            start,
            end: self.text.len(),
            codepoints: segment.chars().count(),
            graphemes: segment.graphemes(true).count(),
        });
        self.lines = lines;
        self.lines_dirty = false;
    }

    pub(crate) fn ensure_lines_current(&mut self) {
        if self.lines_dirty {
            self.rebuild_line_structure();
        }
    }

    /// The index into `lines()` containing `byte_offset`. Assumes
    /// `lines()` is current (callers go through `ensure_lines_current`
    /// first).
    pub(crate) fn line_index_at(&self, byte_offset: usize) -> usize {
        self.lines
            .iter()
            .position(|line| byte_offset <= line.end)
            .unwrap_or_else(|| self.lines.len().saturating_sub(1))
    }

    /// The `Cursor` for the `index`-th grapheme cluster (0-based); `index
    /// == grapheme_count` addresses the end of the buffer.
    pub(crate) fn locate_by_grapheme_index(&self, index: usize) -> BufferResult<Cursor> {
        if index > self.grapheme_count {
            return Err(BufferError::OutOfRange);
        }
        if index == self.grapheme_count {
            return Ok(Cursor {
                byte_offset: self.text.len(),
                codepoint_index: self.codepoint_count,
                grapheme_index: self.grapheme_count,
            });
        }
        let (byte_offset, _) = self
            .text
            .grapheme_indices(true)
            .nth(index)
            .ok_or(BufferError::OutOfRange)?;
        let prefix = &self.text[..byte_offset];
        Ok(Cursor {
            byte_offset,
            codepoint_index: prefix.chars().count(),
            grapheme_index: index,
        })
    }

    /// The `Cursor` on logical line `line_index` whose visual column (per
    /// `unicode-width`) is the first to reach or exceed `column`, clamped
    /// to the line's end if the line is shorter than `column`.
    pub(crate) fn locate_by_visual_column(&self, line_index: usize, column: usize) -> Cursor {
        let line = self.lines[line_index];
        let segment = &self.text[line.start..line.end];
        let mut width_so_far = 0usize;
        let mut byte_offset = line.end;
        for (offset, grapheme) in segment.grapheme_indices(true) {
            if width_so_far >= column {
                byte_offset = line.start + offset;
                break;
            }
            width_so_far += unicode_width::UnicodeWidthStr::width(grapheme);
        }
        let prefix = &self.text[..byte_offset];
        Cursor {
            byte_offset,
            codepoint_index: prefix.chars().count(),
            grapheme_index: prefix.graphemes(true).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_into_empty_buffer_lands_cursor_at_end() {
        let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
        buffer.insert(0, "hello").unwrap();
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.codepoint_count(), 5);
        assert_eq!(buffer.cursor().byte_offset, 5);
    }

    #[test]
    fn insert_then_delete_round_trips() {
        let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
        buffer.insert(0, "hello world").unwrap();
        let before = buffer.text().to_string();
        let before_cursor = buffer.cursor();
        buffer.insert(5, " there").unwrap();
        buffer.delete(5, 6).unwrap();
        assert_eq!(buffer.text(), before);
        assert_eq!(buffer.cursor(), before_cursor);
    }

    #[test]
    fn delete_rejects_non_grapheme_boundary() {
        let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
        buffer.insert(0, "héllo").unwrap(); // é is two bytes
        let e_byte_offset = "h".len();
        assert_eq!(
            buffer.delete(e_byte_offset, 1),
            Err(BufferError::InvalidUtf8)
        );
    }

    #[test]
    fn capacity_doubles_and_clamps_to_max() {
        let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
        buffer.insert(0, &"x".repeat(MIN_CAPACITY + 1)).unwrap();
        assert!(buffer.capacity() >= MIN_CAPACITY + 1);
        assert!(buffer.capacity() <= MAX_CAPACITY);
    }

    #[test]
    fn insert_out_of_range_is_rejected() {
        let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
        assert_eq!(buffer.insert(1, "x"), Err(BufferError::OutOfRange));
    }

    #[test]
    fn rebuild_line_structure_counts_logical_lines() {
        let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
        buffer.insert(0, "ab\ncd\ne").unwrap();
        buffer.rebuild_line_structure();
        let lines = buffer.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].graphemes, 2);
        assert_eq!(lines[1].graphemes, 2);
        assert_eq!(lines[2].graphemes, 1);
    }

    #[test]
    fn validate_detects_corrupted_counts() {
        let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
        buffer.insert(0, "abc").unwrap();
        assert!(buffer.validate());
        buffer.codepoint_count += 1;
        assert!(!buffer.validate());
        assert!(buffer.validation_failed());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn insert_into_empty_matches_property_one(s in "[ -~]{0,64}") {
            let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
            buffer.insert(0, &s).unwrap();
            prop_assert_eq!(buffer.len(), s.len());
            prop_assert_eq!(buffer.codepoint_count(), s.chars().count());
            prop_assert_eq!(buffer.cursor().byte_offset, s.len());
        }

        #[test]
        fn insert_delete_round_trips(prefix in "[ -~]{0,32}", inserted in "[ -~]{0,32}") {
            let mut buffer = LineBuffer::create(MIN_CAPACITY).unwrap();
            buffer.insert(0, &prefix).unwrap();
            let before_text = buffer.text().to_string();
            let before_cursor = buffer.cursor();
            let position = prefix.len();
            buffer.insert(position, &inserted).unwrap();
            buffer.delete(position, inserted.len()).unwrap();
            prop_assert_eq!(buffer.text(), before_text.as_str());
            prop_assert_eq!(buffer.cursor(), before_cursor);
        }
    }
}
