//! Execution output pane

use super::{clamp_scroll, visible_height};
use crate::exec::ExecutionOutput;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render captured output. stderr follows stdout in the error colour, and
/// the exit status closes the listing.
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    output: Option<&ExecutionOutput>,
    can_run: bool,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Output ")
        .borders(Borders::ALL)
        .border_style(DEFAULT_THEME.border(is_focused));

    let Some(output) = output else {
        let hint = if can_run {
            "(press r to run)"
        } else {
            "(execution disabled; start with --run)"
        };
        let paragraph = Paragraph::new(hint)
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let stdout_style = Style::default().fg(DEFAULT_THEME.fg);
    let stderr_style = Style::default().fg(DEFAULT_THEME.error);

    let mut items: Vec<ListItem> = output
        .stdout
        .lines()
        .map(|line| ListItem::new(line.to_string()).style(stdout_style))
        .chain(
            output
                .stderr
                .lines()
                .map(|line| ListItem::new(line.to_string()).style(stderr_style)),
        )
        .collect();

    let (status, colour) = match output.status {
        Some(0) => ("[exit status 0]".to_string(), DEFAULT_THEME.success),
        Some(code) => (format!("[exit status {}]", code), DEFAULT_THEME.error),
        None => ("[terminated by signal]".to_string(), DEFAULT_THEME.error),
    };
    items.push(
        ListItem::new(status).style(Style::default().fg(colour).add_modifier(Modifier::BOLD)),
    );

    let height = visible_height(area);
    clamp_scroll(scroll_offset, items.len(), height);

    let visible: Vec<ListItem> = items.into_iter().skip(*scroll_offset).take(height).collect();
    let list = List::new(visible).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(list, area);
}
