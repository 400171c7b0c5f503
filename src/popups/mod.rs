//! Popup widgets used by the shell itself: yes/no question, list chooser
//! (optionally with an edit line) and single-line edit.
//!
//! Each owns a `PopupClosing`; Escape, `Cancel` and `Close` reject, Enter and
//! `Ok` accept. Callers read `result()` after the popup's loop returns.

mod edit;
mod list;
mod yes_no;

pub use edit::EditPopup;
pub use list::ListPopup;
pub use yes_no::YesNoPopup;

/// Single-line text editing shared by the edit popup and the list popup's
/// edit line. Cursor is a char index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LineEditor {
    text: String,
    cursor: usize,
}

impl LineEditor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars().filter(|c| !c.is_control()) {
            self.insert(c);
        }
    }

    /// Delete before the cursor; returns the removed char
    pub fn backspace(&mut self) -> Option<char> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        Some(self.text.remove(at))
    }

    /// Delete under the cursor
    pub fn delete(&mut self) -> Option<char> {
        if self.cursor >= self.text.chars().count() {
            return None;
        }
        let at = self.byte_index(self.cursor);
        Some(self.text.remove(at))
    }

    pub fn left(&mut self) -> Option<char> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.text.chars().nth(self.cursor)
    }

    pub fn right(&mut self) -> Option<char> {
        if self.cursor >= self.text.chars().count() {
            return None;
        }
        self.cursor += 1;
        self.text.chars().nth(self.cursor)
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

/// Spoken name of a single character
pub(crate) fn char_name(c: Option<char>) -> String {
    match c {
        None => "end of line".to_string(),
        Some(' ') => "space".to_string(),
        Some(c) => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_editor_multibyte() {
        let mut editor = LineEditor::new("né");
        assert_eq!(editor.cursor(), 2);
        assert_eq!(editor.backspace(), Some('é'));
        editor.insert('e');
        editor.home();
        assert_eq!(editor.delete(), Some('n'));
        assert_eq!(editor.text(), "e");
        assert_eq!(editor.left(), None);
        assert_eq!(editor.right(), None);
        editor.end();
        editor.insert_str("x\ty");
        assert_eq!(editor.text(), "exy");
    }
}
