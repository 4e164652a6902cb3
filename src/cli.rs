use clap::{Parser, Subcommand};
use std::path::{Component, Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "vdiff",
    version,
    about = "Live two-pane git diff for notes, with one-shot git helpers"
)]
pub struct Cli {
    /// git executable to run (overrides config)
    #[arg(long, global = true)]
    pub git: Option<PathBuf>,

    /// Seconds before a git command is killed; 0 waits forever
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Run as if started in this directory
    #[arg(short = 'C', global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the two-pane view for a file
    View {
        path: String,
        /// Compare HEAD with the index instead of the index with the working file
        #[arg(long)]
        cached: bool,
    },
    /// git add
    Add {
        path: String,
        #[arg(short, long)]
        update: bool,
    },
    /// git commit -m
    Commit {
        #[arg(short, long)]
        message: String,
    },
    /// git diff for one path
    Diff {
        path: String,
        #[arg(long)]
        cached: bool,
    },
    /// List changed paths
    Files {
        #[arg(long)]
        cached: bool,
    },
    /// Pull the configured remote and branch
    Pull,
    /// Push to the configured remote and branch
    Push,
    /// git restore
    Restore {
        path: String,
        #[arg(long)]
        staged: bool,
    },
    /// Print a file as stored at a revision (default: the index)
    Show {
        path: String,
        /// HEAD, a commit, or "index"
        #[arg(long)]
        rev: Option<String>,
    },
    /// Stage content read from stdin as the new index entry for a path
    Stage { path: String },
    /// Stage a file, commit it on its own, and push
    Record {
        path: String,
        #[arg(short, long)]
        message: String,
    },
}

impl Command {
    pub fn is_view(&self) -> bool {
        matches!(self, Command::View { .. })
    }

    /// Rewrite every path argument with `f`.
    pub fn map_paths(mut self, f: impl Fn(&str) -> String) -> Self {
        match &mut self {
            Command::View { path, .. }
            | Command::Add { path, .. }
            | Command::Diff { path, .. }
            | Command::Restore { path, .. }
            | Command::Show { path, .. }
            | Command::Stage { path }
            | Command::Record { path, .. } => *path = f(path),
            Command::Commit { .. } | Command::Files { .. } | Command::Pull | Command::Push => {}
        }
        self
    }
}

/// `path` as given relative to `cwd`, rewritten relative to the repository
/// `root` with `/` separators. Paths outside the root pass through unchanged.
pub fn repo_relative(root: &Path, cwd: &Path, path: &str) -> String {
    let full = cwd.join(path);
    let Ok(rel) = full.strip_prefix(root) else {
        return path.to_string();
    };
    let mut parts: Vec<String> = Vec::new();
    for c in rel.components() {
        match c {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_with_global_flags() {
        let cli = Cli::parse_from(["vdiff", "--timeout", "0", "view", "a.md", "--cached"]);
        assert_eq!(cli.timeout, Some(0));
        assert!(cli.command.is_view());
        match cli.command {
            Command::View { path, cached } => {
                assert_eq!(path, "a.md");
                assert!(cached);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_record_requires_message() {
        assert!(Cli::try_parse_from(["vdiff", "record", "a.md"]).is_err());
        let cli = Cli::try_parse_from(["vdiff", "record", "a.md", "-m", "entry"]).unwrap();
        assert!(matches!(cli.command, Command::Record { ref message, .. } if message == "entry"));
    }

    #[test]
    fn test_repo_relative() {
        let root = Path::new("/vault");
        assert_eq!(repo_relative(root, Path::new("/vault/daily"), "a.md"), "daily/a.md");
        assert_eq!(repo_relative(root, Path::new("/vault/daily"), "../b.md"), "b.md");
        assert_eq!(repo_relative(root, Path::new("/vault"), "./c/d.md"), "c/d.md");
        assert_eq!(repo_relative(root, Path::new("/tmp"), "x.md"), "x.md");
        assert_eq!(repo_relative(root, Path::new("/tmp"), "/vault/e.md"), "e.md");
    }

    #[test]
    fn test_map_paths_touches_only_paths() {
        let cmd = Command::Record {
            path: "a.md".to_string(),
            message: "a.md".to_string(),
        }
        .map_paths(|p| format!("sub/{p}"));
        assert!(matches!(cmd, Command::Record { ref path, ref message }
            if path == "sub/a.md" && message == "a.md"));
    }

    #[test]
    fn test_show_rev_is_optional() {
        let cli = Cli::parse_from(["vdiff", "show", "a.md", "--git", "/opt/git"]);
        assert_eq!(cli.git, Some(PathBuf::from("/opt/git")));
        assert!(matches!(cli.command, Command::Show { rev: None, .. }));
    }
}
