use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::display_map::{LineCell, RowKind, SplitRow};
use crate::state::AppState;
use crate::theme::Theme;

use super::Component;

const TAB_WIDTH: usize = 4;

/// Side A on the left, side B on the right, rows aligned by the line diff.
pub struct MergeViewPane;

impl Component for MergeViewPane {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let theme = &state.theme;
        let border_style = if state.editable {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text_muted)
        };

        let outer = Block::default()
            .title(format!(" {} ", state.label))
            .borders(Borders::ALL)
            .border_style(border_style);

        if state.rows.is_empty() && state.cursor.is_none() {
            let content = if state.loading {
                " Loading..."
            } else {
                " Both sides are empty"
            };
            let paragraph = Paragraph::new(content)
                .style(Style::default().fg(theme.text_muted))
                .block(outer);
            frame.render_widget(paragraph, area);
            return;
        }

        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let (left_title, right_title) = if state.cached {
            ("HEAD", "index")
        } else {
            ("index", "working tree")
        };
        let left_block = Block::default()
            .title(format!(" {left_title} "))
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(theme.text_muted));
        let left_area = left_block.inner(halves[0]);
        frame.render_widget(left_block, halves[0]);
        let right_area = Rect {
            y: left_area.y,
            height: left_area.height,
            ..halves[1]
        };
        frame.render_widget(
            Paragraph::new(format!(" {right_title} "))
                .style(Style::default().fg(theme.text_muted)),
            Rect {
                height: 1,
                ..halves[1]
            },
        );

        let gutter = gutter_width(&state.rows);
        let cursor_row = state.cursor_row();
        let height = left_area.height as usize;

        let mut left = Vec::with_capacity(height);
        let mut right = Vec::with_capacity(height);
        for idx in state.scroll_offset..state.scroll_offset + height {
            let Some(row) = state.rows.get(idx) else {
                break;
            };
            let on_cursor = cursor_row == Some(idx);
            left.push(side_line(row.kind, row.old.as_ref(), false, gutter, false, theme));
            right.push(side_line(row.kind, row.new.as_ref(), true, gutter, on_cursor, theme));
        }

        frame.render_widget(Paragraph::new(left), left_area);
        frame.render_widget(Paragraph::new(right), right_area);

        if let (Some(row), Some((_, col))) = (cursor_row, state.cursor) {
            if row < state.scroll_offset || row >= state.scroll_offset + height {
                return;
            }
            let content = state
                .rows
                .get(row)
                .and_then(|r| r.new.as_ref())
                .map(|c| c.content.as_str())
                .unwrap_or_default();
            let x = right_area.x as usize + gutter + 1 + display_width(content, col);
            let max_x = (right_area.x + right_area.width).saturating_sub(1) as usize;
            frame.set_cursor_position(Position::new(
                x.min(max_x) as u16,
                right_area.y + (row - state.scroll_offset) as u16,
            ));
        }
    }
}

fn gutter_width(rows: &[SplitRow]) -> usize {
    let max = rows
        .iter()
        .flat_map(|r| [r.old.as_ref(), r.new.as_ref()])
        .flatten()
        .map(|c| c.lineno)
        .max()
        .unwrap_or(1);
    max.to_string().len().max(3)
}

/// Terminal columns taken by the first `col` chars of `content`.
fn display_width(content: &str, col: usize) -> usize {
    content
        .chars()
        .take(col)
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

fn expand_tabs(content: &str) -> String {
    content.replace('\t', &" ".repeat(TAB_WIDTH))
}

fn side_line<'a>(
    kind: RowKind,
    cell: Option<&LineCell>,
    is_new: bool,
    gutter: usize,
    on_cursor: bool,
    theme: &Theme,
) -> Line<'a> {
    let Some(cell) = cell else {
        return Line::from(Span::styled(
            format!("{} ", " ".repeat(gutter)),
            Style::default().fg(theme.text_muted),
        ));
    };

    let content_style = match (kind, is_new) {
        (RowKind::Equal, _) => Style::default().fg(theme.diff_context_fg),
        (_, true) => Style::default().fg(theme.diff_add_fg).bg(theme.diff_add_bg),
        (_, false) => Style::default().fg(theme.diff_del_fg).bg(theme.diff_del_bg),
    };
    let gutter_style = if on_cursor {
        Style::default()
            .fg(theme.cursor_line_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted)
    };

    Line::from(vec![
        Span::styled(format!("{:>gutter$} ", cell.lineno), gutter_style),
        Span::styled(expand_tabs(&cell.content), content_style),
    ])
}
