use std::io;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::async_docs::{DocRequest, DocResult};
use crate::state::TextBuffer;

use super::debounce::Debouncer;
use super::echo::EchoGuard;
use super::types::{DiffTarget, Origin, Side};
use super::view::MergeView;

/// Everything the controller needs from the outside world.
pub trait SyncBackend {
    /// Start loading a side document. The result is picked up through
    /// [`SyncBackend::try_recv`].
    fn request(&mut self, request: DocRequest);
    fn try_recv(&mut self) -> Option<DocResult>;
    fn exists(&self, path: &str) -> bool;
    fn write(&mut self, path: &str, contents: &str) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Rendering,
    Idle,
    Updating,
    Destroyed,
}

#[derive(Debug)]
struct InFlight {
    awaiting: Vec<Side>,
    docs: Vec<(Side, String)>,
    remote: bool,
    /// Side B was edited after the batch was requested.
    edited: bool,
}

/// Keeps a [`MergeView`] in step with git and the working file while the
/// user edits side B.
///
/// Document loads are tagged with a generation; anything that comes back
/// for an older generation is dropped. Only one load batch is in flight at a
/// time and refresh requests that arrive meanwhile are discarded, not queued.
pub struct DiffSync<B: SyncBackend> {
    backend: B,
    target: Option<DiffTarget>,
    generation: u64,
    phase: Phase,
    in_flight: Option<InFlight>,
    view: Option<MergeView>,
    save: Debouncer<String>,
    echo: EchoGuard,
    notices: Vec<String>,
}

impl<B: SyncBackend> DiffSync<B> {
    pub fn new(backend: B, debounce: Duration) -> Self {
        Self {
            backend,
            target: None,
            generation: 0,
            phase: Phase::Uninitialized,
            in_flight: None,
            view: None,
            save: Debouncer::new(debounce),
            echo: EchoGuard::default(),
            notices: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Option<&DiffTarget> {
        self.target.as_ref()
    }

    pub fn view(&self) -> Option<&MergeView> {
        self.view.as_ref()
    }

    pub fn label(&self) -> String {
        self.target
            .as_ref()
            .map(DiffTarget::label)
            .unwrap_or_default()
    }

    pub fn has_pending_write(&self) -> bool {
        self.save.is_pending()
    }

    /// Drain notices meant for the user.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Point the view at a new target and render both sides from scratch.
    /// A pending edit is saved to the previous target's file first.
    pub fn set_target(&mut self, target: DiffTarget) {
        if self.phase == Phase::Destroyed {
            return;
        }
        self.flush_pending();
        self.echo.retain(&target.path);
        info!(label = %target.label(), "diff target set");
        self.target = Some(target);
        self.view = None;
        self.render();
    }

    fn render(&mut self) {
        let Some(target) = self.target.clone() else {
            return;
        };
        self.phase = Phase::Rendering;
        self.begin(&target, &Side::BOTH, false);
    }

    fn begin(&mut self, target: &DiffTarget, sides: &[Side], remote: bool) {
        self.generation += 1;
        self.in_flight = Some(InFlight {
            awaiting: sides.to_vec(),
            docs: Vec::with_capacity(sides.len()),
            remote,
            edited: false,
        });
        for &side in sides {
            self.backend.request(DocRequest {
                generation: self.generation,
                target: target.clone(),
                side,
            });
        }
    }

    /// Re-read `sides` and replace whatever differs. `remote` marks the new
    /// content as not typed by the user, so it is never written back.
    ///
    /// Returns false when the request was dropped because the view is not
    /// idle.
    pub fn refresh(&mut self, sides: &[Side], remote: bool) -> bool {
        if self.phase != Phase::Idle || self.view.is_none() {
            debug!(phase = ?self.phase, "refresh dropped");
            return false;
        }
        let Some(target) = self.target.clone() else {
            return false;
        };
        self.phase = Phase::Updating;
        self.begin(&target, sides, remote);
        true
    }

    pub fn refresh_side(&mut self, side: Side, remote: bool) -> bool {
        self.refresh(&[side], remote)
    }

    /// Apply every document the backend has finished loading.
    pub fn poll(&mut self) {
        while let Some(result) = self.backend.try_recv() {
            self.on_document(result);
        }
    }

    pub fn on_document(&mut self, result: DocResult) {
        if result.generation != self.generation {
            debug!(
                stale = result.generation,
                current = self.generation,
                "discarding stale document"
            );
            return;
        }
        let Some(flight) = self.in_flight.as_mut() else {
            return;
        };
        let Some(pos) = flight.awaiting.iter().position(|s| *s == result.side) else {
            return;
        };
        flight.awaiting.remove(pos);
        flight.docs.push((result.side, result.text));
        if let Some(notice) = result.notice {
            self.notices.push(notice);
        }
        if !flight.awaiting.is_empty() {
            return;
        }

        let Some(flight) = self.in_flight.take() else {
            return;
        };
        match self.phase {
            Phase::Rendering => self.finish_render(flight),
            Phase::Updating => self.finish_refresh(flight),
            _ => {}
        }
    }

    fn finish_render(&mut self, flight: InFlight) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let doc = |side: Side| {
            flight
                .docs
                .iter()
                .find(|(s, _)| *s == side)
                .map(|(_, text)| text.as_str())
                .unwrap_or_default()
        };
        self.view = Some(MergeView::new(
            doc(Side::A),
            doc(Side::B),
            target.is_editable(Side::B),
        ));
        self.phase = Phase::Idle;
        debug!(label = %target.label(), "rendered");
    }

    fn finish_refresh(&mut self, flight: InFlight) {
        let origin = if flight.remote {
            Origin::Remote
        } else {
            Origin::Local
        };
        for (side, text) in flight.docs {
            // unsaved or just-saved typing wins over what was read
            if side == Side::B && (flight.edited || self.save.is_pending()) {
                debug!("keeping edited side B over reloaded content");
                continue;
            }
            self.dispatch(side, &text, origin);
        }
        self.phase = Phase::Idle;
    }

    /// Replace a side's content if it changed. Local changes to the editable
    /// side go through the autosave path.
    fn dispatch(&mut self, side: Side, text: &str, origin: Origin) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        if view.text(side) == text {
            return;
        }
        view.buffer_mut(side).replace(text);
        debug!(?side, ?origin, "side replaced");
        if origin == Origin::Local {
            self.on_local_change(side, Instant::now());
        }
    }

    fn on_local_change(&mut self, side: Side, now: Instant) {
        let editable = self.target.as_ref().is_some_and(|t| t.is_editable(side));
        if !editable {
            return;
        }
        if let Some(flight) = self.in_flight.as_mut() {
            flight.edited = true;
        }
        if let Some(view) = self.view.as_ref() {
            self.save.push(view.text(side).to_string(), now);
        }
    }

    /// Apply a user edit to side B. Returns false if side B is read-only or
    /// the edit changed nothing.
    pub fn edit(&mut self, now: Instant, f: impl FnOnce(&mut TextBuffer)) -> bool {
        if self.phase == Phase::Destroyed {
            return false;
        }
        if !self.target.as_ref().is_some_and(|t| t.is_editable(Side::B)) {
            return false;
        }
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        let before = view.text(Side::B).to_string();
        f(view.buffer_mut(Side::B));
        if view.text(Side::B) == before {
            return false;
        }
        self.on_local_change(Side::B, now);
        true
    }

    /// Cursor-only movement on side B; never schedules a write.
    pub fn move_cursor(&mut self, f: impl FnOnce(&mut TextBuffer)) {
        if let Some(view) = self.view.as_mut() {
            f(view.buffer_mut(Side::B));
        }
    }

    /// Fire the debounced write if its window has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(content) = self.save.poll(now) {
            self.persist(&content);
        }
    }

    /// Write a pending edit now instead of waiting out the debounce window.
    pub fn flush(&mut self) {
        self.flush_pending();
    }

    fn flush_pending(&mut self) {
        if let Some(content) = self.save.flush() {
            self.persist(&content);
        }
    }

    fn persist(&mut self, content: &str) {
        let Some(path) = self.target.as_ref().map(|t| t.path.clone()) else {
            return;
        };
        if !self.backend.exists(&path) {
            warn!(%path, "target file is gone, edit not saved");
            self.notices
                .push(format!("{path} no longer exists; edit not saved"));
            return;
        }
        self.echo.arm(&path);
        match self.backend.write(&path, content) {
            Ok(()) => debug!(%path, bytes = content.len(), "saved"),
            Err(e) => {
                self.echo.disarm(&path);
                error!(%path, error = %e, "save failed");
                self.notices.push(format!("Failed to save {path}: {e}"));
            }
        }
    }

    /// A file under the repository was modified on disk.
    pub fn on_file_modified(&mut self, path: &str) {
        if self.phase == Phase::Destroyed {
            return;
        }
        // spent even while the view is cached; the write happened regardless
        if self.echo.consume(path) {
            debug!(%path, "ignoring echo of our own write");
            return;
        }
        let Some(target) = self.target.as_ref() else {
            return;
        };
        if target.cached || target.path != path {
            return;
        }
        self.refresh_side(Side::B, true);
    }

    /// The index or HEAD may have moved (stage, commit, restore, ...).
    pub fn on_status_changed(&mut self) {
        match self.phase {
            Phase::Destroyed | Phase::Rendering => {}
            _ if self.view.is_some() => {
                self.refresh(&Side::BOTH, true);
            }
            _ => self.render(),
        }
    }

    /// Tear the view down. A pending edit is saved first; late documents are
    /// ignored.
    pub fn destroy(&mut self) {
        if self.phase == Phase::Destroyed {
            return;
        }
        self.flush_pending();
        self.generation += 1;
        self.in_flight = None;
        self.view = None;
        self.phase = Phase::Destroyed;
        info!("diff view closed");
    }
}
