use anyhow::Result;
use ratatui::layout::{Constraint, Direction, Layout};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::action::Action;
use crate::async_docs::WorkingCopy;
use crate::components::action_hud::ActionHud;
use crate::components::context_bar::ContextBar;
use crate::components::merge_view::MergeViewPane;
use crate::components::Component;
use crate::config::VdiffConfig;
use crate::event::{map_key_to_action, map_mouse_to_action, Event, EventReader, KeyContext};
use crate::git::{CommandResult, GitCli};
use crate::state::{AppState, TextBuffer};
use crate::sync::{DiffSync, DiffTarget, Phase, Side};
use crate::tui::Tui;
use crate::watch::FileWatcher;

/// Result of a git mutation started from the view.
struct OpOutcome {
    done: String,
    failed: &'static str,
    result: CommandResult<()>,
}

pub struct App {
    state: AppState,
    sync: DiffSync<WorkingCopy>,
    git: GitCli,
    initial: Option<DiffTarget>,
    watcher: Option<FileWatcher>,
    ops_tx: mpsc::UnboundedSender<OpOutcome>,
    ops_rx: mpsc::UnboundedReceiver<OpOutcome>,
    ops_in_flight: usize,
    /// HEAD or the index may have moved; re-read both sides once the view
    /// is idle again.
    status_dirty: bool,
    follow_cursor: bool,
    /// Side texts the current rows were built from.
    shown: Option<(String, String)>,
    status_clear_countdown: u32,
}

impl App {
    pub fn new(git: GitCli, target: DiffTarget, config: &VdiffConfig) -> Self {
        let watcher = match FileWatcher::new(git.executor().workdir()) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(error = %e, "file watching disabled");
                None
            }
        };
        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(config.theme.clone()),
            sync: DiffSync::new(WorkingCopy::new(git.clone()), config.debounce),
            git,
            initial: Some(target),
            watcher,
            ops_tx,
            ops_rx,
            ops_in_flight: 0,
            status_dirty: false,
            follow_cursor: false,
            shown: None,
            status_clear_countdown: 0,
        }
    }

    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        if let Some(target) = self.initial.take() {
            self.open(target);
        }

        let mut events = EventReader::new(Duration::from_millis(50));

        let context_bar = ContextBar;
        let merge_view = MergeViewPane;
        let action_hud = ActionHud;

        loop {
            self.pump(Instant::now());

            // context bar + hud + outer borders + pane titles
            let term_size = terminal.size()?;
            self.state.viewport_height = term_size.height.saturating_sub(5) as usize;
            self.sync_state();

            terminal.draw(|frame| {
                let outer = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(3),
                        Constraint::Length(1),
                    ])
                    .split(frame.area());

                context_bar.render(frame, outer[0], &self.state);
                merge_view.render(frame, outer[1], &self.state);
                action_hud.render(frame, outer[2], &self.state);
            })?;

            // Wait for at least one event, then drain all pending events
            // to avoid input lag from buffered key events.
            let first = events.next().await;
            let mut pending = Vec::new();
            if let Some(ev) = first {
                pending.push(ev);
            }
            while let Some(ev) = events.try_next() {
                pending.push(ev);
            }

            for event in pending {
                let ctx = KeyContext {
                    editable: self.state.editable,
                };
                let action = match event {
                    Event::Key(key) => map_key_to_action(key, &ctx),
                    Event::Mouse(mouse) => map_mouse_to_action(mouse),
                    Event::Resize => Some(Action::Resize),
                    Event::Tick => Some(Action::Tick),
                };
                if let Some(action) = action {
                    self.update(action);
                }
            }

            if self.state.should_quit {
                break;
            }
        }

        self.sync.destroy();
        Ok(())
    }

    fn open(&mut self, target: DiffTarget) {
        if let Some(watcher) = self.watcher.as_mut() {
            if let Err(e) = watcher.watch_target(&target.path) {
                warn!(error = %e, "cannot watch target directory");
            }
        }
        self.state.scroll_offset = 0;
        self.follow_cursor = false;
        self.shown = None;
        self.sync.set_target(target);
    }

    /// Feed everything that arrived since the last pass into the controller.
    fn pump(&mut self, now: Instant) {
        self.sync.poll();

        if let Some(watcher) = self.watcher.as_mut() {
            for path in watcher.drain() {
                self.sync.on_file_modified(&path);
            }
        }

        while let Ok(outcome) = self.ops_rx.try_recv() {
            self.ops_in_flight = self.ops_in_flight.saturating_sub(1);
            match outcome.result {
                Ok(()) => {
                    info!(done = %outcome.done, "git operation finished");
                    self.set_status(outcome.done, false);
                    self.status_dirty = true;
                }
                Err(e) => self.set_status(format!("{} failed: {e}", outcome.failed), true),
            }
        }

        if self.status_dirty && matches!(self.sync.phase(), Phase::Idle | Phase::Uninitialized)
        {
            self.status_dirty = false;
            self.sync.on_status_changed();
        }

        self.sync.tick(now);
    }

    /// Mirror the controller into the render state.
    fn sync_state(&mut self) {
        for notice in self.sync.take_notices() {
            self.set_status(notice, true);
        }

        self.state.loading = matches!(self.sync.phase(), Phase::Rendering | Phase::Updating);
        self.state.saving = self.sync.has_pending_write();
        self.state.busy = self.ops_in_flight > 0;
        self.state.label = self.sync.label();
        if let Some(target) = self.sync.target() {
            self.state.cached = target.cached;
            self.state.editable = target.is_editable(Side::B);
        }

        match self.sync.view() {
            Some(view) => {
                let (a, b) = (view.text(Side::A), view.text(Side::B));
                let stale = self
                    .shown
                    .as_ref()
                    .map_or(true, |(sa, sb)| sa != a || sb != b);
                if stale {
                    self.state.rows = view.rows();
                    self.shown = Some((a.to_string(), b.to_string()));
                }
                self.state.cursor = self
                    .state
                    .editable
                    .then(|| view.pane(Side::B).buffer().cursor_line_col());
            }
            None => {
                self.state.rows.clear();
                self.state.cursor = None;
                self.shown = None;
            }
        }

        self.state.scroll_offset = self.state.scroll_offset.min(self.state.max_scroll());
        if self.follow_cursor {
            self.follow_cursor = false;
            self.state.follow_cursor();
        }
    }

    fn update(&mut self, action: Action) {
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::Tick => {
                if self.status_clear_countdown > 0 {
                    self.status_clear_countdown -= 1;
                    if self.status_clear_countdown == 0 {
                        self.state.status_message = None;
                    }
                }
            }
            Action::Resize => {}

            Action::ToggleCached => {
                if let Some(target) = self.sync.target() {
                    let next = DiffTarget::new(target.path.clone(), !target.cached);
                    self.open(next);
                }
            }
            Action::StageFile => {
                let Some(path) = self.target_path() else {
                    return;
                };
                self.sync.flush();
                let git = self.git.clone();
                let op_path = path.clone();
                self.spawn_op(format!("Staged {path}"), "Stage", async move {
                    git.add(&op_path, false).await
                });
            }
            Action::StageBuffer => {
                if !self.state.editable {
                    self.set_status("Buffer is the index already".to_string(), false);
                    return;
                }
                let Some(path) = self.target_path() else {
                    return;
                };
                let Some(content) = self.sync.view().map(|v| v.text(Side::B).to_string()) else {
                    return;
                };
                let git = self.git.clone();
                let op_path = path.clone();
                self.spawn_op(format!("Staged buffer of {path}"), "Stage", async move {
                    git.stage(&op_path, &content).await
                });
            }
            Action::UnstageFile => {
                let Some(path) = self.target_path() else {
                    return;
                };
                let git = self.git.clone();
                let op_path = path.clone();
                self.spawn_op(format!("Unstaged {path}"), "Unstage", async move {
                    git.restore(&op_path, true).await
                });
            }
            Action::Refresh => self.status_dirty = true,

            Action::ScrollUp => self.state.scroll_by(-1),
            Action::ScrollDown => self.state.scroll_by(1),
            Action::ScrollPageUp => {
                let page = self.state.viewport_height.max(1) as isize;
                self.state.scroll_by(-page);
            }
            Action::ScrollPageDown => {
                let page = self.state.viewport_height.max(1) as isize;
                self.state.scroll_by(page);
            }
            Action::ScrollToTop => self.state.scroll_offset = 0,
            Action::ScrollToBottom => self.state.scroll_offset = self.state.max_scroll(),

            edit if edit.is_edit() => {
                let now = Instant::now();
                self.sync.edit(now, |buf| apply_edit(buf, &edit));
                self.follow_cursor = true;
            }
            movement => {
                self.sync.move_cursor(|buf| apply_edit(buf, &movement));
                self.follow_cursor = true;
            }
        }
    }

    fn target_path(&self) -> Option<String> {
        self.sync.target().map(|t| t.path.clone())
    }

    fn spawn_op(
        &mut self,
        done: String,
        failed: &'static str,
        op: impl Future<Output = CommandResult<()>> + Send + 'static,
    ) {
        self.ops_in_flight += 1;
        let tx = self.ops_tx.clone();
        tokio::spawn(async move {
            let result = op.await;
            let _ = tx.send(OpOutcome {
                done,
                failed,
                result,
            });
        });
    }

    fn set_status(&mut self, msg: String, is_error: bool) {
        self.state.status_message = Some((msg, is_error));
        // ~3 seconds at 50ms tick rate
        self.status_clear_countdown = 60;
    }
}

fn apply_edit(buf: &mut TextBuffer, action: &Action) {
    match action {
        Action::InsertChar(c) => buf.insert_char(*c),
        Action::InsertNewline => buf.insert_char('\n'),
        Action::DeleteBack => buf.delete_back(),
        Action::DeleteForward => buf.delete_forward(),
        Action::DeleteWordBack => buf.delete_word_back(),
        Action::CursorLeft => buf.move_left(),
        Action::CursorRight => buf.move_right(),
        Action::CursorUp => buf.move_up(),
        Action::CursorDown => buf.move_down(),
        Action::CursorHome => buf.move_home(),
        Action::CursorEnd => buf.move_end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edit_drives_buffer() {
        let mut buf = TextBuffer::from("ab\ncd");
        apply_edit(&mut buf, &Action::CursorDown);
        apply_edit(&mut buf, &Action::CursorEnd);
        apply_edit(&mut buf, &Action::InsertNewline);
        apply_edit(&mut buf, &Action::InsertChar('e'));
        apply_edit(&mut buf, &Action::DeleteBack);
        apply_edit(&mut buf, &Action::InsertChar('f'));
        assert_eq!(buf.text(), "ab\ncd\nf");
        assert_eq!(buf.cursor_line_col(), (2, 1));
    }
}
