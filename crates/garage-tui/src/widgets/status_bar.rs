//! Status bar — filter tabs with live counts plus key hints.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::store::{StatusCounts, ViewFilter};
use crate::theme::{C_ACCENT, C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG};

/// Draw the filter tab strip: `All 12 │ Garaged 8 │ Out 3 │ Impound 1`.
/// The active tab is highlighted.
pub fn draw_filter_tabs(
    frame: &mut Frame,
    area: Rect,
    active: ViewFilter,
    counts: &StatusCounts,
) {
    let mut spans = Vec::new();
    for (i, filter) in ViewFilter::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(C_MUTED)));
        }
        let style = if *filter == active {
            Style::default()
                .fg(C_PRIMARY)
                .bg(C_SELECTION_BG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        spans.push(Span::styled(
            format!(" {} {} ", filter.label(), counts.for_filter(*filter)),
            style,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the bottom key-hint strip.
pub fn draw_key_hints(frame: &mut Frame, area: Rect, searching: bool) {
    let hints: &[(&str, &str)] = if searching {
        &[("Enter", "apply"), ("Esc", "clear/close")]
    } else {
        &[
            ("j/k", "move"),
            ("Tab", "pane"),
            ("f", "filter"),
            ("/", "search"),
            ("Enter", "take out"),
            ("y", "copy plate"),
            ("Esc", "close"),
        ]
    };

    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        spans.push(Span::styled(
            *key,
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}", label),
            Style::default().fg(C_MUTED),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
