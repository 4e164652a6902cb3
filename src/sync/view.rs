use crate::display_map::{build_split_rows, SplitRow};
use crate::state::TextBuffer;

use super::types::Side;

#[derive(Debug, Clone)]
pub struct Pane {
    buffer: TextBuffer,
    editable: bool,
}

impl Pane {
    fn new(doc: &str, editable: bool) -> Self {
        Self {
            buffer: TextBuffer::from(doc),
            editable,
        }
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }
}

/// The two documents shown side by side. Side A is never editable.
#[derive(Debug, Clone)]
pub struct MergeView {
    a: Pane,
    b: Pane,
}

impl MergeView {
    pub fn new(a: &str, b: &str, b_editable: bool) -> Self {
        Self {
            a: Pane::new(a, false),
            b: Pane::new(b, b_editable),
        }
    }

    pub fn pane(&self, side: Side) -> &Pane {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn text(&self, side: Side) -> &str {
        self.pane(side).text()
    }

    pub(super) fn buffer_mut(&mut self, side: Side) -> &mut TextBuffer {
        match side {
            Side::A => &mut self.a.buffer,
            Side::B => &mut self.b.buffer,
        }
    }

    /// Line-aligned rows for rendering the two panes next to each other.
    pub fn rows(&self) -> Vec<SplitRow> {
        build_split_rows(self.a.text(), self.b.text(), self.b.editable)
    }
}
