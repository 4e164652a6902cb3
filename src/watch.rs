use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Bridges filesystem notifications for the diff target's directory into the
/// event loop. Paths come out relative to the repository root.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<PathBuf>,
    root: PathBuf,
    watched: Option<PathBuf>,
}

impl FileWatcher {
    pub fn new(root: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) if is_content_change(&event.kind) => {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "filesystem watch error"),
            }
        })
        .context("failed to create file watcher")?;

        // Event paths are canonical on some platforms (/private/var on macOS).
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        Ok(Self {
            watcher,
            rx,
            root,
            watched: None,
        })
    }

    /// Watch the directory holding `path`. The previous directory, if any,
    /// stops being watched.
    pub fn watch_target(&mut self, path: &str) -> Result<()> {
        let dir = self
            .root
            .join(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        if self.watched.as_ref() == Some(&dir) {
            return Ok(());
        }
        if let Some(old) = self.watched.take() {
            let _ = self.watcher.unwatch(&old);
        }
        self.watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;
        debug!(dir = %dir.display(), "watching");
        self.watched = Some(dir);
        Ok(())
    }

    /// Everything reported since the last call, one entry per path.
    pub fn drain(&mut self) -> Vec<String> {
        let mut raw = Vec::new();
        while let Ok(path) = self.rx.try_recv() {
            raw.push(path);
        }
        coalesce(raw.iter().filter_map(|p| relative_to(&self.root, p)))
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}

/// `path` relative to `root` with `/` separators, or `None` outside the root.
fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Drop repeats, keeping first-seen order.
fn coalesce(paths: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}
