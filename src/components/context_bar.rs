use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::state::AppState;

use super::Component;

pub struct ContextBar;

impl Component for ContextBar {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let theme = &state.theme;
        let (from, to) = if state.cached {
            ("HEAD", "index")
        } else {
            ("index", "working tree")
        };

        let mut spans = vec![
            Span::styled(" vdiff ", Style::default().fg(Color::Black).bg(theme.accent)),
            Span::raw("  "),
            Span::styled(
                state.label.as_str(),
                Style::default()
                    .fg(theme.success)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(from, Style::default().fg(theme.text)),
            Span::styled(" \u{2192} ", Style::default().fg(theme.text_muted)),
            Span::styled(
                to,
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD),
            ),
        ];

        let flags = [
            (state.loading, "[loading]"),
            (state.saving, "[unsaved]"),
            (state.busy, "[git]"),
            (!state.editable, "[read-only]"),
        ];
        for (on, label) in flags {
            if on {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(label, Style::default().fg(theme.text_muted)));
            }
        }

        let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.surface));
        frame.render_widget(bar, area);
    }
}
