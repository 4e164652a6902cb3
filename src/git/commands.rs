use tracing::info;

use super::error::{CommandResult, GitError};
use super::exec::Executor;
use super::types::Revision;

/// The git operations the view and the CLI need, each a thin layer over
/// [`Executor::execute`].
#[derive(Debug, Clone)]
pub struct GitCli {
    exec: Executor,
    remote: String,
    branch: String,
}

impl GitCli {
    pub fn new(exec: Executor) -> Self {
        Self {
            exec,
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }

    /// Remote and branch used by `pull` and `push`.
    pub fn with_upstream(mut self, remote: &str, branch: &str) -> Self {
        self.remote = remote.to_string();
        self.branch = branch.to_string();
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.exec
    }

    /// `git rev-parse --show-toplevel`, run from the executor's directory.
    pub async fn toplevel(&self) -> CommandResult<String> {
        self.exec
            .execute(&["rev-parse", "--show-toplevel"], None)
            .await
            .map(|out| out.trim_end().to_string())
    }

    /// `git add [--update] <path>`
    pub async fn add(&self, path: &str, update: bool) -> CommandResult<()> {
        let mut args = vec!["add"];
        if update {
            args.push("--update");
        }
        args.push(path);
        self.exec.execute(&args, None).await.map(drop)
    }

    /// `git commit -m <msg>`
    pub async fn commit(&self, message: &str) -> CommandResult<()> {
        self.exec
            .execute(&["commit", "-m", message], None)
            .await
            .map(drop)
    }

    /// `git diff [--cached] <path>`
    pub async fn diff(&self, path: &str, cached: bool) -> CommandResult<String> {
        let mut args = vec!["diff"];
        if cached {
            args.push("--cached");
        }
        args.push(path);
        self.exec.execute(&args, None).await
    }

    /// `git diff --name-only [--cached]`, blank lines dropped.
    pub async fn diff_files(&self, cached: bool) -> CommandResult<Vec<String>> {
        let mut args = vec!["diff", "--name-only"];
        if cached {
            args.push("--cached");
        }
        self.exec
            .execute(&args, None)
            .await
            .map(|out| split_paths(&out))
    }

    /// `git pull <remote> <branch>`
    pub async fn pull(&self) -> CommandResult<()> {
        self.exec
            .execute(&["pull", self.remote.as_str(), self.branch.as_str()], None)
            .await
            .map(drop)
    }

    /// `git push <remote> <branch>`
    pub async fn push(&self) -> CommandResult<()> {
        self.exec
            .execute(&["push", self.remote.as_str(), self.branch.as_str()], None)
            .await
            .map(drop)
    }

    /// `git restore [--staged] <path>`
    pub async fn restore(&self, path: &str, staged: bool) -> CommandResult<()> {
        let mut args = vec!["restore"];
        if staged {
            args.push("--staged");
        }
        args.push(path);
        self.exec.execute(&args, None).await.map(drop)
    }

    /// `git show <rev>:<path>`
    pub async fn show(&self, revision: &Revision, path: &str) -> CommandResult<String> {
        let spec = revision.object_spec(path);
        self.exec.execute(&["show", spec.as_str()], None).await
    }

    /// Write `data` into the object store and point the index entry for
    /// `path` at it, leaving the working file untouched.
    ///
    /// `git hash-object -w --stdin <path>` then
    /// `git update-index --cacheinfo 100644 <hash> <path>`.
    pub async fn stage(&self, path: &str, data: &str) -> CommandResult<()> {
        let out = self
            .exec
            .execute(&["hash-object", "-w", "--stdin", path], Some(data))
            .await?;
        let hash = out.trim();
        self.exec
            .execute(&["update-index", "--cacheinfo", "100644", hash, path], None)
            .await
            .map(drop)
    }

    /// Stage `path`, commit it alone, and push.
    ///
    /// Refuses to commit when anything besides the entry ends up staged, so
    /// unrelated changes never ride along. The index is left as it is in
    /// that case.
    pub async fn record_entry(&self, path: &str, message: &str) -> CommandResult<()> {
        self.add(path, false).await?;
        let staged = self.diff_files(true).await?;
        if staged.len() > 1 {
            return Err(GitError::MultipleStaged {
                count: staged.len(),
            });
        }
        self.commit(message).await?;
        self.push().await?;
        info!(path, "entry recorded and pushed");
        Ok(())
    }
}

fn split_paths(stdout: &str) -> Vec<String> {
    stdout
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
