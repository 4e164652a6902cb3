/// Multi-line text with a single cursor, backing one pane of the diff view.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    /// Byte offset into `text`, always on a char boundary.
    cursor: usize,
}

impl TextBuffer {
    #[cfg(test)]
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
        }
    }

    /// Create a TextBuffer pre-filled with `s`, cursor at the start.
    pub fn from(s: &str) -> Self {
        Self {
            text: s.to_string(),
            cursor: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the entire text while keeping the cursor near where it was.
    /// Used when the document changes underneath the user.
    pub fn replace(&mut self, s: &str) {
        let (line, col) = self.cursor_line_col();
        self.text = s.to_string();
        self.cursor = 0;
        self.move_to(line, col);
    }

    /// Zero-based (line, char column) of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = before[line_start..].chars().count();
        (line, col)
    }

    /// Byte range of line `line` (without its newline), or `None` past the end.
    fn line_range(&self, line: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for _ in 0..line {
            start += self.text[start..].find('\n')? + 1;
        }
        let end = self.text[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.text.len());
        Some((start, end))
    }

    /// Move to (line, col), clamping both to the text.
    fn move_to(&mut self, line: usize, col: usize) {
        let line_count = self.text.matches('\n').count() + 1;
        let line = line.min(line_count - 1);
        let Some((start, end)) = self.line_range(line) else {
            self.cursor = self.text.len();
            return;
        };
        self.cursor = self.text[start..end]
            .char_indices()
            .nth(col)
            .map(|(i, _)| start + i)
            .unwrap_or(end);
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete one character before the cursor (backspace).
    pub fn delete_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
    }

    /// Delete the character under the cursor.
    pub fn delete_forward(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.text.drain(self.cursor..self.cursor + c.len_utf8());
        }
    }

    /// Delete word before cursor (Ctrl+W shell behavior):
    /// skip trailing whitespace, then delete back to next whitespace.
    pub fn delete_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let before: &str = &self.text[..self.cursor];
        let trimmed = before.trim_end();
        let word_start = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        self.text.drain(word_start..self.cursor);
        self.cursor = word_start;
    }

    /// Move cursor one character left.
    pub fn move_left(&mut self) {
        if let Some((i, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = i;
        }
    }

    /// Move cursor one character right.
    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line > 0 {
            self.move_to(line - 1, col);
        }
    }

    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_line_col();
        self.move_to(line + 1, col);
    }

    /// Move cursor to start of the current line (Home / Ctrl+A).
    pub fn move_home(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.move_to(line, 0);
    }

    /// Move cursor to end of the current line (End / Ctrl+E).
    pub fn move_end(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.move_to(line, usize::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty() {
        let buf = TextBuffer::new();
        assert_eq!(buf.text(), "");
        assert!(buf.is_empty());
        assert_eq!(buf.cursor_line_col(), (0, 0));
    }

    #[test]
    fn test_from_starts_at_top() {
        let buf = TextBuffer::from("hello\nworld");
        assert_eq!(buf.cursor_line_col(), (0, 0));
    }

    #[test]
    fn test_insert_char() {
        let mut buf = TextBuffer::new();
        buf.insert_char('a');
        buf.insert_char('\n');
        buf.insert_char('c');
        assert_eq!(buf.text(), "a\nc");
        assert_eq!(buf.cursor_line_col(), (1, 1));
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = TextBuffer::from("ab\ncd");
        buf.move_down();
        buf.delete_back();
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor_line_col(), (0, 2));
        buf.move_home();
        buf.delete_back(); // no-op at start
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_delete_forward() {
        let mut buf = TextBuffer::from("abc");
        buf.delete_forward();
        assert_eq!(buf.text(), "bc");
        buf.move_end();
        buf.delete_forward(); // no-op at end
        assert_eq!(buf.text(), "bc");
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut buf = TextBuffer::from("long line\nab\nanother line");
        buf.move_end();
        assert_eq!(buf.cursor_line_col(), (0, 9));
        buf.move_down();
        assert_eq!(buf.cursor_line_col(), (1, 2));
        buf.move_down();
        assert_eq!(buf.cursor_line_col(), (2, 2));
        buf.move_down(); // past last line stays put
        assert_eq!(buf.cursor_line_col(), (2, 2));
        buf.move_up();
        buf.move_up();
        buf.move_up();
        assert_eq!(buf.cursor_line_col(), (0, 2));
    }

    #[test]
    fn test_replace_keeps_cursor_position() {
        let mut buf = TextBuffer::from("one\ntwo\nthree");
        buf.move_down();
        buf.move_down();
        buf.move_right();
        buf.replace("uno\ndos\ntres\ncuatro");
        assert_eq!(buf.cursor_line_col(), (2, 1));
        buf.replace("x");
        assert_eq!(buf.cursor_line_col(), (0, 1));
    }

    #[test]
    fn test_delete_word_back() {
        let mut buf = TextBuffer::from("one two three");
        buf.move_end();
        buf.delete_word_back();
        assert_eq!(buf.text(), "one two ");
        buf.delete_word_back();
        assert_eq!(buf.text(), "one ");
        buf.delete_word_back();
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_utf8_multibyte() {
        let mut buf = TextBuffer::new();
        buf.insert_char('é');
        buf.insert_char('🎉');
        assert_eq!(buf.cursor_line_col(), (0, 2));
        buf.move_left();
        buf.delete_back();
        assert_eq!(buf.text(), "🎉");
        assert_eq!(buf.cursor_line_col(), (0, 0));
    }
}
