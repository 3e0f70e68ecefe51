//! Viewer state and event loop

use crate::error::TranslateError;
use crate::exec::{ExecutionOutput, Executor};
use crate::translator::GeneratedProgram;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

const PAGE: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Generated,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> generated -> output)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Generated,
            FocusedPane::Generated => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Source,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Generated => FocusedPane::Source,
            FocusedPane::Output => FocusedPane::Generated,
        }
    }
}

pub struct App {
    pub source_code: String,
    pub translation: Result<GeneratedProgram, TranslateError>,

    /// Present only when the user opted in to execution
    executor: Option<Executor>,
    pub output: Option<ExecutionOutput>,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub generated_scroll: usize,
    pub output_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(
        source_code: String,
        translation: Result<GeneratedProgram, TranslateError>,
        executor: Option<Executor>,
    ) -> Self {
        let status_message = match &translation {
            Ok(_) => "Translated".to_string(),
            Err(err) => err.to_string(),
        };

        App {
            source_code,
            translation,
            executor,
            output: None,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            generated_scroll: 0,
            output_scroll: 0,
            should_quit: false,
            status_message,
        }
    }

    pub fn can_run(&self) -> bool {
        self.executor.is_some() && self.translation.is_ok()
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(main_chunks[0]);

        // Right column: Python (top) | Output (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[1]);

        let error_line = self
            .translation
            .as_ref()
            .err()
            .map(|err| err.location().line);

        super::panes::render_source_pane(
            frame,
            columns[0],
            &self.source_code,
            error_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_generated_pane(
            frame,
            right_rows[0],
            &self.translation,
            self.focused_pane == FocusedPane::Generated,
            &mut self.generated_scroll,
        );

        let can_run = self.can_run();
        super::panes::render_output_pane(
            frame,
            right_rows[1],
            self.output.as_ref(),
            can_run,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        let program = self.translation.as_ref().ok();
        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &super::panes::StatusRenderData {
                message: &self.status_message,
                procedure: program.map(|p| p.name.as_str()),
                diagnostics: program.map_or(0, |p| p.diagnostics.len()),
                can_run,
            },
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-(PAGE as isize)),
            KeyCode::PageDown => self.scroll_by(PAGE as isize),
            KeyCode::Home => *self.focused_scroll() = 0,
            // Clamped by the pane on the next draw
            KeyCode::End => *self.focused_scroll() = usize::MAX,
            KeyCode::Char('r') | KeyCode::Char('R') => self.run_program(),
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Generated => &mut self.generated_scroll,
            FocusedPane::Output => &mut self.output_scroll,
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        let offset = self.focused_scroll();
        *offset = offset.saturating_add_signed(delta);
    }

    fn run_program(&mut self) {
        let Some(executor) = &self.executor else {
            self.status_message = "Execution disabled; start with --run".to_string();
            return;
        };
        let Ok(program) = &self.translation else {
            self.status_message = "Nothing to run".to_string();
            return;
        };

        match executor.execute(program) {
            Ok(output) => {
                let python = executor.python().display();
                self.status_message = match output.status {
                    Some(code) => format!("{} finished with exit status {}", python, code),
                    None => format!("{} terminated by signal", python),
                };
                self.output = Some(output);
                self.output_scroll = 0;
                self.focused_pane = FocusedPane::Output;
            }
            Err(err) => {
                tracing::error!("{}", err);
                self.status_message = err.to_string();
            }
        }
    }
}
