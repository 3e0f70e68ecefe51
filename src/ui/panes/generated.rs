//! Generated-code pane

use super::highlight::{highlight_line, Language};
use super::{clamp_scroll, visible_height};
use crate::error::TranslateError;
use crate::translator::GeneratedProgram;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the Python module, or the error that stopped translation
pub fn render_generated_pane(
    frame: &mut Frame,
    area: Rect,
    translation: &Result<GeneratedProgram, TranslateError>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Python ")
        .borders(Borders::ALL)
        .border_style(DEFAULT_THEME.border(is_focused));

    let program = match translation {
        Ok(program) => program,
        Err(err) => {
            *scroll_offset = 0;
            let text = vec![
                Line::from(Span::styled(
                    "Translation failed",
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::default(),
                Line::from(Span::styled(
                    err.to_string(),
                    Style::default().fg(DEFAULT_THEME.error),
                )),
            ];
            let paragraph = Paragraph::new(text)
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let lines: Vec<&str> = program.code.lines().collect();
    let height = visible_height(area);
    clamp_scroll(scroll_offset, lines.len(), height);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(height)
        .map(|(idx, line)| {
            let mut spans = vec![Span::styled(
                format!("{:4} ", idx + 1),
                Style::default().fg(DEFAULT_THEME.comment),
            )];
            spans.extend(highlight_line(line, Language::Python).spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}
