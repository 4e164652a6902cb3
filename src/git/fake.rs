//! A stand-in `git` for tests: a shell script that logs every invocation's
//! arguments before running a caller-supplied body.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::commands::GitCli;
use super::exec::Executor;

pub struct FakeGit {
    dir: TempDir,
    binary: PathBuf,
}

impl FakeGit {
    /// `body` is appended to the script verbatim; `{dir}` expands to the
    /// scratch directory so scripts can leave files for assertions.
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string();
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{root}/calls.log'\n{}\n",
            body.replace("{dir}", &root)
        );
        let binary = dir.path().join("git");
        fs::write(&binary, script).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, binary }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn executor(&self) -> Executor {
        Executor::new(self.binary.clone(), self.dir.path())
    }

    pub fn cli(&self) -> GitCli {
        GitCli::new(self.executor())
    }

    /// Argument vectors of every invocation so far, space-joined.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).unwrap_or_default()
    }
}
