//! Status bar rendering with keybindings and translation state

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar shows
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub procedure: Option<&'a str>,
    /// Lexical problems skipped during translation
    pub diagnostics: usize,
    pub can_run: bool,
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (badge, badge_bg) = match data.procedure {
        Some(name) => (format!(" {} ", name), DEFAULT_THEME.primary),
        None => (" ERROR ".to_string(), DEFAULT_THEME.error),
    };

    let bar = Style::default().bg(DEFAULT_THEME.status_bg);
    let mut left_spans = vec![
        Span::styled(
            badge,
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", bar.fg(DEFAULT_THEME.comment)),
        Span::styled(format!(" {} ", data.message), bar.fg(DEFAULT_THEME.fg)),
    ];
    if data.diagnostics > 0 {
        left_spans.push(Span::styled(
            format!(" {} warning(s) ", data.diagnostics),
            Style::default()
                .bg(DEFAULT_THEME.secondary)
                .fg(Color::Black),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar)
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar.fg(DEFAULT_THEME.fg);
    let sep_style = bar.fg(DEFAULT_THEME.comment);

    let mut right_spans = vec![
        Span::styled(" ⇥ ", key_style),
        Span::styled(" focus ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
    ];
    if data.can_run {
        right_spans.push(Span::styled(" r ", key_style));
        right_spans.push(Span::styled(" run ", desc_style));
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(" ", desc_style));
    }
    right_spans.push(Span::styled(" q ", key_style));
    right_spans.push(Span::styled(" quit ", desc_style));

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar)
            .alignment(Alignment::Right),
        layout[1],
    );
}
