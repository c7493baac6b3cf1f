use crate::buffer::{Cursor, LineBuffer};
use crate::error::BufferResult;

/// Direction for a vertical cursor move (spec.md §4.1's `sticky_column`
/// behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
}

/// The mover half of the buffer/cursor-manager pair (spec.md §5): computes
/// new cursor positions against a [`LineBuffer`] and writes them back via
/// [`LineBuffer::set_cursor`]. Its own `position` field exists so the
/// cursor/buffer consistency property (spec.md §8 property 8) is something
/// tests can actually observe drifting, rather than being true by
/// construction — every method here ends by calling `buffer.set_cursor`
/// before returning, keeping the two in agreement.
#[derive(Debug, Clone)]
pub struct CursorManager {
    position: Cursor,
    sticky_column: bool,
    preferred_visual_column: usize,
}

impl Default for CursorManager {
    fn default() -> Self {
        CursorManager {
            position: Cursor::start(),
            sticky_column: false,
            preferred_visual_column: 0,
        }
    }
}

impl CursorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Cursor {
        self.position
    }

    pub fn sticky_column(&self) -> bool {
        self.sticky_column
    }

    pub fn preferred_visual_column(&self) -> usize {
        self.preferred_visual_column
    }

    /// Pull this manager's position from the buffer's cursor. Callers MUST
    /// invoke this after any buffer-text mutation that didn't go through
    /// one of this type's own methods (spec.md §5).
    pub fn sync_from_buffer(&mut self, buffer: &LineBuffer) {
        self.position = buffer.cursor();
        self.sticky_column = false;
    }

    /// Advance or retreat `n` grapheme clusters, clamped to `[0,
    /// grapheme_count]`. Clears `sticky_column`.
    pub fn move_by_graphemes(&mut self, buffer: &mut LineBuffer, n: isize) -> BufferResult<()> {
        let current = self.position.grapheme_index as isize;
        let target = (current + n).clamp(0, buffer.grapheme_count() as isize) as usize;
        let new_position = buffer.locate_by_grapheme_index(target)?;
        self.position = new_position;
        self.sticky_column = false;
        buffer.set_cursor(new_position);
        Ok(())
    }

    /// Move to the previous/next logical line, preserving the starting
    /// visual column across short lines via `preferred_visual_column`.
    /// Fails with `OutOfRange` at the first/last line.
    pub fn move_vertical(
        &mut self,
        buffer: &mut LineBuffer,
        direction: VerticalDirection,
    ) -> BufferResult<()> {
        buffer.ensure_lines_current();
        let current_line = buffer.line_index_at(self.position.byte_offset);
        let target_column = if self.sticky_column {
            self.preferred_visual_column
        } else {
            self.visual_column(buffer)
        };
        let target_line = match direction {
            VerticalDirection::Up => current_line
                .checked_sub(1)
                .ok_or(crate::error::BufferError::OutOfRange)?,
            VerticalDirection::Down => {
                let next = current_line + 1;
                if next >= buffer.lines().len() {
                    return Err(crate::error::BufferError::OutOfRange);
                }
                next
            }
        };
        let new_position = buffer.locate_by_visual_column(target_line, target_column);
        self.position = new_position;
        self.sticky_column = true;
        self.preferred_visual_column = target_column;
        buffer.set_cursor(new_position);
        Ok(())
    }

    fn visual_column(&self, buffer: &LineBuffer) -> usize {
        let line_index = buffer.line_index_at(self.position.byte_offset);
        let line = buffer.lines()[line_index];
        let prefix = &buffer.text()[line.start..self.position.byte_offset];
        unicode_width::UnicodeWidthStr::width(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::LineBuffer;

    fn buffer_with(text: &str) -> LineBuffer {
        let mut buffer = LineBuffer::create(64).unwrap();
        buffer.insert(0, text).unwrap();
        buffer
    }

    #[test]
    fn move_by_graphemes_clamps_and_stays_in_sync() {
        let mut buffer = buffer_with("hello");
        let mut cursor = CursorManager::new();
        cursor.sync_from_buffer(&buffer);
        cursor.move_by_graphemes(&mut buffer, -10).unwrap();
        assert_eq!(cursor.position(), buffer.cursor());
        assert_eq!(buffer.cursor().byte_offset, 0);
        cursor.move_by_graphemes(&mut buffer, 100).unwrap();
        assert_eq!(cursor.position(), buffer.cursor());
        assert_eq!(buffer.cursor().byte_offset, 5);
    }

    #[test]
    fn vertical_move_preserves_column_across_short_lines() {
        let mut buffer = buffer_with("hello\nhi\nworld!!");
        let mut cursor = CursorManager::new();
        cursor.sync_from_buffer(&buffer);
        // place cursor at column 4 on line 0 ("hell|o")
        cursor.move_by_graphemes(&mut buffer, 4).unwrap();
        cursor
            .move_vertical(&mut buffer, VerticalDirection::Down)
            .unwrap();
        assert!(cursor.sticky_column());
        assert_eq!(cursor.preferred_visual_column(), 4);
        // line 1 "hi" is shorter than column 4: clamps to end of line
        assert_eq!(buffer.cursor().byte_offset, "hello\nhi".len());
        cursor
            .move_vertical(&mut buffer, VerticalDirection::Down)
            .unwrap();
        // line 2 "world!!" is long enough: column 4 is restored exactly
        let expected = "hello\nhi\nworl".len();
        assert_eq!(buffer.cursor().byte_offset, expected);
        assert_eq!(cursor.position(), buffer.cursor());
    }

    #[test]
    fn vertical_move_past_first_line_fails() {
        let mut buffer = buffer_with("only line");
        let mut cursor = CursorManager::new();
        cursor.sync_from_buffer(&buffer);
        assert!(cursor
            .move_vertical(&mut buffer, VerticalDirection::Up)
            .is_err());
    }
}
