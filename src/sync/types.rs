use crate::git::Revision;

/// Which file the view compares, and whether it shows staged-vs-HEAD
/// (`cached`) or working-tree-vs-index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTarget {
    pub path: String,
    pub cached: bool,
}

impl DiffTarget {
    pub fn new(path: impl Into<String>, cached: bool) -> Self {
        Self {
            path: path.into(),
            cached,
        }
    }

    /// Where a side's document comes from under this target.
    pub fn source(&self, side: Side) -> DocSource {
        match (self.cached, side) {
            (true, Side::A) => DocSource::Revision(Revision::Head),
            (true, Side::B) => DocSource::Revision(Revision::Index),
            (false, Side::A) => DocSource::Revision(Revision::Index),
            (false, Side::B) => DocSource::WorkingTree,
        }
    }

    /// Only the working-tree side of a non-cached comparison accepts edits.
    pub fn is_editable(&self, side: Side) -> bool {
        side == Side::B && !self.cached
    }

    pub fn label(&self) -> String {
        let mode = if self.cached { "staging" } else { "working" };
        format!("{} ({mode})", self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Reference rendering, never editable.
    A,
    /// Comparison rendering.
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSource {
    Revision(Revision),
    WorkingTree,
}

/// Who caused a buffer change. Only `Local` changes are written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}
