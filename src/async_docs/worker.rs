use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::git::GitCli;
use crate::sync::SyncBackend;

use super::channel::{DocRequest, DocResult};
use super::loader::load_side;

/// Loads side documents off the UI loop. Each request runs on its own task;
/// results come back in completion order, tagged with the request's
/// generation.
pub struct DocWorker {
    request_tx: mpsc::UnboundedSender<DocRequest>,
    result_rx: mpsc::UnboundedReceiver<DocResult>,
}

impl DocWorker {
    pub fn new(git: GitCli) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<DocRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<DocResult>();

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let git = git.clone();
                let tx = result_tx.clone();

                tokio::spawn(async move {
                    let (text, notice) = load_side(&git, &request.target, request.side).await;
                    let _ = tx.send(DocResult {
                        generation: request.generation,
                        side: request.side,
                        text,
                        notice,
                    });
                });
            }
        });

        Self {
            request_tx,
            result_rx,
        }
    }

    pub fn request(&self, req: DocRequest) {
        let _ = self.request_tx.send(req);
    }

    pub fn try_recv(&mut self) -> Option<DocResult> {
        self.result_rx.try_recv().ok()
    }

    /// Wait for the next result.
    #[cfg(test)]
    pub async fn next(&mut self) -> Option<DocResult> {
        self.result_rx.recv().await
    }
}

/// The real backend of the diff view: documents through git, edits straight
/// to the file under the repository root.
pub struct WorkingCopy {
    root: PathBuf,
    worker: DocWorker,
}

impl WorkingCopy {
    pub fn new(git: GitCli) -> Self {
        let root = git.executor().workdir().to_path_buf();
        Self {
            root,
            worker: DocWorker::new(git),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SyncBackend for WorkingCopy {
    fn request(&mut self, request: DocRequest) {
        self.worker.request(request);
    }

    fn try_recv(&mut self) -> Option<DocResult> {
        self.worker.try_recv()
    }

    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn write(&mut self, path: &str, contents: &str) -> io::Result<()> {
        std::fs::write(self.root.join(path), contents)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::git::fake::FakeGit;
    use crate::sync::{DiffTarget, Side};

    #[tokio::test]
    async fn test_worker_round_trip_keeps_generation() {
        let git = FakeGit::new("printf staged");
        let mut worker = DocWorker::new(git.cli());
        worker.request(DocRequest {
            generation: 7,
            target: DiffTarget::new("x.md", true),
            side: Side::B,
        });
        let result = tokio::time::timeout(Duration::from_secs(5), worker.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.generation, 7);
        assert_eq!(result.side, Side::B);
        assert_eq!(result.text, "staged");
        assert!(result.notice.is_none());
    }

    #[tokio::test]
    async fn test_working_copy_writes_under_root() {
        let git = FakeGit::new("");
        let mut wc = WorkingCopy::new(git.cli());
        assert!(!wc.exists("note.md"));
        std::fs::write(wc.root().join("note.md"), "v1").unwrap();
        assert!(wc.exists("note.md"));
        wc.write("note.md", "v2").unwrap();
        assert_eq!(std::fs::read_to_string(git.root().join("note.md")).unwrap(), "v2");
    }
}
