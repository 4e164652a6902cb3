/// Central action enum. All state mutations flow through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Lifecycle
    Quit,
    Tick,
    Resize,

    // Git
    ToggleCached,
    StageFile,
    StageBuffer,
    UnstageFile,
    Refresh,

    // Read-only navigation
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollToTop,
    ScrollToBottom,

    // Editing side B
    InsertChar(char),
    InsertNewline,
    DeleteBack,
    DeleteForward,
    DeleteWordBack,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
}

impl Action {
    /// Edits change the document; everything else leaves it alone.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Action::InsertChar(_)
                | Action::InsertNewline
                | Action::DeleteBack
                | Action::DeleteForward
                | Action::DeleteWordBack
        )
    }
}
