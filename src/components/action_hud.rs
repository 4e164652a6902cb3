use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::state::AppState;

use super::Component;

pub struct ActionHud;

impl Component for ActionHud {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let theme = &state.theme;

        // Show status message if present, otherwise show keybindings
        if let Some((ref msg, is_error)) = state.status_message {
            let color = if is_error { theme.error } else { theme.success };
            let bar = Paragraph::new(Line::from(vec![
                Span::raw(" "),
                Span::styled(msg.as_str(), Style::default().fg(color)),
            ]))
            .style(Style::default().bg(theme.surface));
            frame.render_widget(bar, area);
            return;
        }

        let bindings: &[(&str, &str)] = if state.editable {
            &[
                ("Esc", "quit"),
                ("Tab", "staging"),
                ("^S", "add"),
                ("^K", "stage buffer"),
                ("^U", "unstage"),
                ("^R", "refresh"),
                ("^W", "del word"),
            ]
        } else {
            &[
                ("q", "quit"),
                ("j/k", "scroll"),
                ("g/G", "top/bottom"),
                ("Tab", "working"),
                ("^S", "add"),
                ("^U", "unstage"),
                ("^R", "refresh"),
            ]
        };

        let mut spans = Vec::new();
        spans.push(Span::raw(" "));
        for (i, (key, desc)) in bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Style::default().fg(theme.text_muted)));
            }
            spans.push(Span::styled(
                format!("[{key}]"),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                (*desc).to_string(),
                Style::default().fg(theme.text_muted),
            ));
        }

        let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.surface));
        frame.render_widget(bar, area);
    }
}
