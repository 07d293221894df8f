//! In-memory editor surface.
//!
//! The CLI loads a document into a [`BufferEditor`], runs interactive
//! sessions against it, then writes the buffer back through the store.

use std::sync::Mutex;

use crate::ports::editor::{Editor, Position};

#[derive(Debug, Default)]
struct BufferState {
    path: Option<String>,
    text: String,
    anchor: usize,
    head: usize,
}

/// Editor holding one document's text and a selection as byte offsets.
#[derive(Debug, Default)]
pub struct BufferEditor {
    state: Mutex<BufferState>,
}

impl BufferEditor {
    /// Opens `text` as the document at `path` with the cursor at the start.
    #[must_use]
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(BufferState {
                path: Some(path.into()),
                text: text.into(),
                anchor: 0,
                head: 0,
            }),
        }
    }

    /// Places a bare cursor at `pos` (clamped to the document).
    pub fn set_cursor(&self, pos: Position) {
        let mut state = self.state.lock().expect("editor lock poisoned");
        let offset = offset_of(&state.text, pos);
        state.anchor = offset;
        state.head = offset;
    }

    /// Selects the text between two positions.
    pub fn set_selection(&self, from: Position, to: Position) {
        let mut state = self.state.lock().expect("editor lock poisoned");
        state.anchor = offset_of(&state.text, from);
        state.head = offset_of(&state.text, to);
    }

    /// Current cursor (selection head).
    #[must_use]
    pub fn cursor(&self) -> Position {
        let state = self.state.lock().expect("editor lock poisoned");
        position_of(&state.text, state.head)
    }
}

/// Byte offset of `pos`, clamped to line length and to char boundaries.
fn offset_of(text: &str, pos: Position) -> usize {
    let mut offset = 0;
    for (index, line) in text.split('\n').enumerate() {
        if index == pos.line {
            let mut ch = pos.ch.min(line.len());
            while !line.is_char_boundary(ch) {
                ch -= 1;
            }
            return offset + ch;
        }
        offset += line.len() + 1;
    }
    text.len()
}

fn position_of(text: &str, offset: usize) -> Position {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count();
    let ch = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1);
    Position { line, ch }
}

/// Shifts an offset that lies after an edit of `[start, end)` replaced by `len` bytes.
fn shift(offset: usize, start: usize, end: usize, len: usize) -> usize {
    if offset >= end {
        offset - (end - start) + len
    } else if offset > start {
        start + len
    } else {
        offset
    }
}

impl Editor for BufferEditor {
    fn document_path(&self) -> Option<String> {
        self.state.lock().expect("editor lock poisoned").path.clone()
    }

    fn open_document(&self, path: &str, text: &str) {
        let mut state = self.state.lock().expect("editor lock poisoned");
        *state = BufferState { path: Some(path.to_string()), text: text.to_string(), anchor: 0, head: 0 };
    }

    fn get_value(&self) -> String {
        self.state.lock().expect("editor lock poisoned").text.clone()
    }

    fn set_value(&self, text: &str) {
        let mut state = self.state.lock().expect("editor lock poisoned");
        let cursor = position_of(&state.text, state.head);
        state.text = text.to_string();
        let offset = offset_of(&state.text, cursor);
        state.anchor = offset;
        state.head = offset;
    }

    fn get_selection(&self) -> String {
        let state = self.state.lock().expect("editor lock poisoned");
        let (start, end) = (state.anchor.min(state.head), state.anchor.max(state.head));
        state.text[start..end].to_string()
    }

    fn replace_selection(&self, text: &str) {
        let mut state = self.state.lock().expect("editor lock poisoned");
        let (start, end) = (state.anchor.min(state.head), state.anchor.max(state.head));
        state.text.replace_range(start..end, text);
        let cursor = start + text.len();
        state.anchor = cursor;
        state.head = cursor;
    }

    fn replace_range(&self, text: &str, from: Position, to: Position) {
        let mut state = self.state.lock().expect("editor lock poisoned");
        let a = offset_of(&state.text, from);
        let b = offset_of(&state.text, to);
        let (start, end) = (a.min(b), a.max(b));
        state.text.replace_range(start..end, text);
        state.anchor = shift(state.anchor, start, end, text.len());
        state.head = shift(state.head, start, end, text.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_selection_inserts_at_cursor_and_advances() {
        let editor = BufferEditor::new("a.md", "one\ntwo\n");
        editor.set_cursor(Position::new(1, 0));
        editor.replace_selection("X\n");
        editor.replace_selection("Y\n");

        assert_eq!(editor.get_value(), "one\nX\nY\ntwo\n");
        assert_eq!(editor.cursor(), Position::new(3, 0));
    }

    #[test]
    fn selection_is_replaced_as_a_whole() {
        let editor = BufferEditor::new("a.md", "hello world");
        editor.set_selection(Position::new(0, 6), Position::new(0, 11));
        assert_eq!(editor.get_selection(), "world");
        editor.replace_selection("there");
        assert_eq!(editor.get_value(), "hello there");
    }

    #[test]
    fn replace_range_keeps_cursor_anchored_to_its_text() {
        let editor = BufferEditor::new("a.md", "aaa\nbbb\nccc");
        editor.set_cursor(Position::new(2, 1));
        editor.replace_range("LONGER", Position::new(0, 0), Position::new(0, 3));

        assert_eq!(editor.get_value(), "LONGER\nbbb\nccc");
        assert_eq!(editor.cursor(), Position::new(2, 1));
    }

    #[test]
    fn positions_past_the_end_are_clamped() {
        let editor = BufferEditor::new("a.md", "short");
        editor.set_cursor(Position::new(9, 9));
        editor.replace_selection("!");
        assert_eq!(editor.get_value(), "short!");
    }

    #[test]
    fn open_document_switches_path_and_text() {
        let editor = BufferEditor::new("a.md", "A");
        editor.open_document("b.md", "B");
        assert_eq!(editor.document_path().as_deref(), Some("b.md"));
        assert_eq!(editor.get_value(), "B");
    }
}
