use crate::display_map::{row_for_new_line, SplitRow};
use crate::theme::Theme;

/// Everything the components need to draw one frame. Rebuilt from the
/// diff controller by the app loop; components never touch the controller.
pub struct AppState {
    pub theme: Theme,
    /// `<path> (staging)` or `<path> (working)`.
    pub label: String,
    pub cached: bool,
    pub editable: bool,
    /// A document load is in flight.
    pub loading: bool,
    /// An edit is waiting for the debounce window to pass.
    pub saving: bool,
    /// A git mutation started from the view has not finished yet.
    pub busy: bool,
    pub rows: Vec<SplitRow>,
    /// Zero-based (line, column) of the cursor in side B, when editable.
    pub cursor: Option<(usize, usize)>,
    pub scroll_offset: usize,
    pub viewport_height: usize,
    pub status_message: Option<(String, bool)>, // (message, is_error)
    pub should_quit: bool,
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            label: String::new(),
            cached: false,
            editable: false,
            loading: true,
            saving: false,
            busy: false,
            rows: Vec::new(),
            cursor: None,
            scroll_offset: 0,
            viewport_height: 0,
            status_message: None,
            should_quit: false,
        }
    }

    /// Display row holding the cursor. A cursor on the empty line after a
    /// trailing newline sits one past the last row.
    pub fn cursor_row(&self) -> Option<usize> {
        let (line, _) = self.cursor?;
        Some(row_for_new_line(&self.rows, line + 1).unwrap_or(self.rows.len()))
    }

    pub fn max_scroll(&self) -> usize {
        self.rows.len().saturating_sub(self.viewport_height.max(1))
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let next = self.scroll_offset.saturating_add_signed(delta);
        self.scroll_offset = next.min(self.max_scroll());
    }

    /// Scroll just enough to bring the cursor row into the viewport.
    pub fn follow_cursor(&mut self) {
        let Some(row) = self.cursor_row() else {
            return;
        };
        let height = self.viewport_height.max(1);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + height {
            self.scroll_offset = row + 1 - height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_map::build_split_rows;

    fn state_with(lines: usize, height: usize) -> AppState {
        let text: String = (0..lines).map(|i| format!("{i}\n")).collect();
        let mut state = AppState::new(Theme::from_name("one-dark"));
        state.rows = build_split_rows(&text, &text, true);
        state.viewport_height = height;
        state
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut state = state_with(30, 10);
        state.scroll_by(-5);
        assert_eq!(state.scroll_offset, 0);
        state.scroll_by(100);
        assert_eq!(state.scroll_offset, 20);
    }

    #[test]
    fn test_follow_cursor_scrolls_minimally() {
        let mut state = state_with(30, 10);
        state.cursor = Some((15, 0));
        state.follow_cursor();
        assert_eq!(state.scroll_offset, 6);

        state.cursor = Some((2, 0));
        state.follow_cursor();
        assert_eq!(state.scroll_offset, 2);

        state.cursor = Some((30, 0));
        assert_eq!(state.cursor_row(), Some(30));
    }
}
