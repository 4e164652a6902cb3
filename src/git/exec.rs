use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::{CommandResult, GitError};

/// Runs the git binary as a subprocess and turns its exit status and
/// output streams into a [`CommandResult`].
#[derive(Debug, Clone)]
pub struct Executor {
    binary: PathBuf,
    workdir: PathBuf,
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new(binary: impl Into<PathBuf>, workdir: &Path) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.to_path_buf(),
            timeout: None,
        }
    }

    /// Kill the child and fail with [`GitError::TimedOut`] if it runs longer
    /// than `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn describe(&self, args: &[&str]) -> String {
        let name = self
            .binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.binary.to_string_lossy().into_owned());
        if args.is_empty() {
            name
        } else {
            format!("{name} {}", args.join(" "))
        }
    }

    /// Spawn the binary with `args`, optionally feeding `input` on stdin, and
    /// resolve to its stdout once the process has exited with code 0.
    ///
    /// stdout and stderr are drained concurrently with the exit wait so a
    /// chatty child can never block on a full pipe.
    pub async fn execute(&self, args: &[&str], input: Option<&str>) -> CommandResult<String> {
        let command = self.describe(args);
        debug!(%command, "spawning");

        let mut child = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!(%command, error = %e, "failed to spawn");
                GitError::Spawn(e.to_string())
            })?;

        let feeder = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => {
                let data = input.to_owned();
                Some(tokio::spawn(async move {
                    if let Err(e) = stdin.write_all(data.as_bytes()).await {
                        debug!(error = %e, "stdin closed early");
                    }
                    // stdin drops here, which signals EOF to the child
                }))
            }
            _ => None,
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let collect = async { tokio::join!(child.wait(), drain(stdout), drain(stderr)) };

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, collect)
                .await
                .map_err(|_| limit),
            None => Ok(collect.await),
        };

        let (status, stdout, stderr) = match outcome {
            Ok(joined) => joined,
            Err(limit) => {
                if let Err(e) = child.start_kill() {
                    debug!(%command, error = %e, "kill after timeout failed");
                }
                warn!(%command, ?limit, "timed out");
                return Err(GitError::TimedOut {
                    command,
                    after: limit,
                });
            }
        };

        if let Some(feeder) = feeder {
            let _ = feeder.await;
        }

        let status = status.map_err(|e| GitError::Spawn(e.to_string()))?;
        if status.success() {
            debug!(%command, bytes = stdout.len(), "exited 0");
            return Ok(String::from_utf8_lossy(&stdout).into_owned());
        }

        let code = status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&stderr).into_owned();
        warn!(%command, code, stderr = %stderr.trim_end(), "git command failed");
        Err(GitError::CommandFailed {
            command,
            code,
            stderr,
        })
    }
}

async fn drain<R: AsyncRead + Unpin>(stream: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf).await {
            debug!(error = %e, "output stream read failed");
        }
    }
    buf
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::git::fake::FakeGit;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_exit_zero_returns_exact_stdout() {
        let git = FakeGit::new("printf 'h\\303\\251llo\\n\\nworld\\n'");
        let out = git.executor().execute(&["status"], None).await;
        assert_eq!(out, Ok("héllo\n\nworld\n".to_string()));
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_command_and_code() {
        let git = FakeGit::new("echo oops >&2\nexit 3");
        let err = git
            .executor()
            .execute(&["status", "--short"], None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "GIT_COMMAND_FAILED: `git status --short` exited with 3."
        );
        match err {
            GitError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "oops\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_stdout_is_still_err() {
        let git = FakeGit::new("echo partial\nexit 1");
        let out = git.executor().execute(&["log"], None).await;
        assert!(matches!(out, Err(GitError::CommandFailed { code: 1, .. })));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Executor::new(dir.path().join("no-such-git"), dir.path());
        let out = exec.execute(&["status"], None).await;
        assert!(matches!(out, Err(GitError::Spawn(_))));
    }

    #[tokio::test]
    async fn test_input_is_fed_and_closed() {
        let git = FakeGit::new("cat");
        let out = git
            .executor()
            .execute(&["hash-object", "--stdin"], Some("line one\nline two"))
            .await;
        assert_eq!(out, Ok("line one\nline two".to_string()));
    }

    #[tokio::test]
    async fn test_runs_in_workdir() {
        let git = FakeGit::new("pwd");
        let out = git.executor().execute(&["rev-parse"], None).await.unwrap();
        let expected = git.root().canonicalize().unwrap();
        assert_eq!(
            std::path::Path::new(out.trim_end()).canonicalize().unwrap(),
            expected
        );
    }

    #[tokio::test]
    async fn test_large_output_on_both_streams_does_not_deadlock() {
        let git = FakeGit::new(
            "head -c 300000 /dev/zero | tr '\\0' 'a'\nhead -c 300000 /dev/zero | tr '\\0' 'b' >&2",
        );
        let out = git.executor().execute(&["cat-file"], None).await.unwrap();
        assert_eq!(out.len(), 300_000);
        assert!(out.bytes().all(|b| b == b'a'));
    }

    #[tokio::test]
    async fn test_timeout_kills_hung_child() {
        let git = FakeGit::new("exec sleep 10");
        let exec = git
            .executor()
            .with_timeout(Some(Duration::from_millis(200)));
        let started = std::time::Instant::now();
        let out = exec.execute(&["fetch"], None).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(out, Err(GitError::TimedOut { .. })));
    }
}
