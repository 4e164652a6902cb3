use std::fmt;

/// Which snapshot of a file `git show` should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// Last committed version.
    Head,
    /// Staged version (stage 0 of the index).
    Index,
    /// Any other revision git can resolve: a branch, tag or commit id.
    Commit(String),
}

impl Revision {
    /// The `<rev>:<path>` object name passed to `git show`.
    pub fn object_spec(&self, path: &str) -> String {
        match self {
            Revision::Head => format!("HEAD:{path}"),
            Revision::Index => format!(":{path}"),
            Revision::Commit(rev) => format!("{rev}:{path}"),
        }
    }

    /// Parse a user-supplied revision. An empty string or `:` means the index.
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" | ":" | "INDEX" | "index" => Revision::Index,
            "HEAD" => Revision::Head,
            other => Revision::Commit(other.to_string()),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Head => f.write_str("HEAD"),
            Revision::Index => f.write_str("index"),
            Revision::Commit(rev) => f.write_str(rev),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_spec() {
        assert_eq!(Revision::Head.object_spec("x.md"), "HEAD:x.md");
        assert_eq!(Revision::Index.object_spec("x.md"), ":x.md");
        assert_eq!(
            Revision::Commit("abc123".to_string()).object_spec("notes/x.md"),
            "abc123:notes/x.md"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(Revision::parse(""), Revision::Index);
        assert_eq!(Revision::parse("HEAD"), Revision::Head);
        assert_eq!(
            Revision::parse("main~1"),
            Revision::Commit("main~1".to_string())
        );
    }
}
