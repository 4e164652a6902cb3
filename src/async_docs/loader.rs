use tracing::debug;

use crate::git::GitCli;
use crate::sync::{DiffTarget, DocSource, Side};

/// Read the document for one side of `target`.
///
/// Failures never abort the view: they come back as an empty document plus
/// a notice for the user.
pub async fn load_side(git: &GitCli, target: &DiffTarget, side: Side) -> (String, Option<String>) {
    match target.source(side) {
        DocSource::Revision(rev) => match git.show(&rev, &target.path).await {
            Ok(text) => (text, None),
            Err(e) => {
                debug!(path = %target.path, %rev, error = %e, "show failed, rendering empty");
                (String::new(), Some(e.to_string()))
            }
        },
        DocSource::WorkingTree => {
            let full = git.executor().workdir().join(&target.path);
            match tokio::fs::read_to_string(&full).await {
                Ok(text) => (text, None),
                Err(e) => {
                    debug!(path = %full.display(), error = %e, "working file unreadable");
                    (String::new(), Some(format!("Cannot read {}: {e}", target.path)))
                }
            }
        }
    }
}
