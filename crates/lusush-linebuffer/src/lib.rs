//! UTF-8/grapheme-aware line-edit buffer and cursor manager (spec.md §4.1).
//!
//! [`LineBuffer`] is the single source of truth for the text being edited
//! and its cursor; [`CursorManager`] computes new cursor positions against
//! it (grapheme-wise horizontal moves, visual-column-preserving vertical
//! moves) and writes every result straight back into the buffer. No
//! component infers cursor state from the terminal — this crate has no
//! terminal dependency at all, and is compiled and tested independently of
//! the scan/parse pipeline (hence its own small [`BufferError`] rather than
//! `lusush-error`'s `ParseError`).

mod buffer;
mod cursor;
mod error;

pub use buffer::{Cursor, LineBuffer, LineSpan, MAX_CAPACITY, MIN_CAPACITY};
pub use cursor::{CursorManager, VerticalDirection};
pub use error::{BufferError, BufferResult};

/// Convenience pairing of a [`LineBuffer`] with its [`CursorManager`],
/// exposing the keybinding-sized actions an editor loop actually calls.
/// Every method here ends with both halves in agreement, satisfying
/// spec.md §8 property 8 by construction rather than by caller discipline.
#[derive(Debug, Clone)]
pub struct LineEditor {
    buffer: LineBuffer,
    cursor: CursorManager,
}

impl LineEditor {
    pub fn new(initial_capacity: usize) -> BufferResult<Self> {
        Ok(LineEditor {
            buffer: LineBuffer::create(initial_capacity)?,
            cursor: CursorManager::new(),
        })
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> &CursorManager {
        &self.cursor
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor.sync_from_buffer(&self.buffer);
    }

    /// Insert `text` at the current cursor position and advance past it.
    pub fn insert_at_cursor(&mut self, text: &str) -> BufferResult<()> {
        let position = self.cursor.position().byte_offset;
        self.buffer.insert(position, text)?;
        self.cursor.sync_from_buffer(&self.buffer);
        Ok(())
    }

    /// Delete the `n` grapheme clusters before the cursor (backspace).
    pub fn delete_backward(&mut self, n: usize) -> BufferResult<()> {
        let end = self.cursor.position().byte_offset;
        let start = self
            .buffer
            .locate_by_grapheme_index(self.cursor.position().grapheme_index.saturating_sub(n))?
            .byte_offset;
        self.buffer.delete(start, end - start)?;
        self.cursor.sync_from_buffer(&self.buffer);
        Ok(())
    }

    /// Delete the `n` grapheme clusters after the cursor (forward delete).
    pub fn delete_forward(&mut self, n: usize) -> BufferResult<()> {
        let start = self.cursor.position().byte_offset;
        let target_index =
            (self.cursor.position().grapheme_index + n).min(self.buffer.grapheme_count());
        let end = self
            .buffer
            .locate_by_grapheme_index(target_index)?
            .byte_offset;
        self.buffer.delete(start, end - start)?;
        self.cursor.sync_from_buffer(&self.buffer);
        Ok(())
    }

    pub fn move_by_graphemes(&mut self, n: isize) -> BufferResult<()> {
        self.cursor.move_by_graphemes(&mut self.buffer, n)
    }

    pub fn move_vertical(&mut self, direction: VerticalDirection) -> BufferResult<()> {
        self.cursor.move_vertical(&mut self.buffer, direction)
    }

    /// Assert the consistency property tests lean on: `buffer.cursor() ==
    /// cursor.position()`.
    pub fn is_in_sync(&self) -> bool {
        self.buffer.cursor() == self.cursor.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_actions_stay_in_sync() {
        let mut editor = LineEditor::new(MIN_CAPACITY).unwrap();
        editor.insert_at_cursor("hello world").unwrap();
        assert!(editor.is_in_sync());
        editor.move_by_graphemes(-5).unwrap();
        assert!(editor.is_in_sync());
        editor.delete_forward(5).unwrap();
        assert!(editor.is_in_sync());
        assert_eq!(editor.buffer().text(), "hello ");
        editor.delete_backward(1).unwrap();
        assert!(editor.is_in_sync());
        assert_eq!(editor.buffer().text(), "hello");
    }

    #[test]
    fn clear_resets_but_keeps_capacity() {
        let mut editor = LineEditor::new(MIN_CAPACITY).unwrap();
        editor.insert_at_cursor("hello").unwrap();
        let capacity_before = editor.buffer().capacity();
        editor.clear();
        assert!(editor.buffer().is_empty());
        assert_eq!(editor.buffer().capacity(), capacity_before);
        assert!(editor.is_in_sync());
    }
}
