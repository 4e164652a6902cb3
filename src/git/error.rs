use std::time::Duration;

use thiserror::Error;

/// Every git operation resolves to this instead of panicking or bubbling an
/// `io::Error` up to the UI.
pub type CommandResult<T> = Result<T, GitError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitError {
    /// The binary could not be started at all (missing, not executable, ...).
    #[error("{0}")]
    Spawn(String),

    /// The process ran and exited nonzero. `stderr` is kept for logging only.
    #[error("GIT_COMMAND_FAILED: `{command}` exited with {code}.")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("GIT_COMMAND_TIMEOUT: `{command}` did not exit within {}s and was killed.", .after.as_secs())]
    TimedOut { command: String, after: Duration },

    /// Business rule of the record-entry workflow, not a git failure.
    #[error("{count} files are staged. Review and commit them manually.")]
    MultipleStaged { count: usize },
}
