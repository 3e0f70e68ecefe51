//! TUI pane rendering
//!
//! - [`source`]: PL/I source with line numbers; the line of a translation
//!   error is marked
//! - [`generated`]: the generated Python module, or the translation error
//! - [`output`]: captured stdout/stderr of the last run
//! - [`status`]: status bar with keybindings and translation state
//! - [`highlight`]: per-line highlighting shared by the code panes
//!
//! Each pane exports one `render_*` function. Scroll offsets are owned by
//! the [`App`](crate::ui::App) and clamped here, where the visible height is
//! known.

pub mod generated;
pub mod highlight;
pub mod output;
pub mod source;
pub mod status;

pub use generated::render_generated_pane;
pub use output::render_output_pane;
pub use source::render_source_pane;
pub use status::{render_status_bar, StatusRenderData};

use ratatui::layout::Rect;

/// Rows available inside a bordered pane, at least 1
fn visible_height(area: Rect) -> usize {
    area.height.saturating_sub(2).max(1) as usize
}

/// Keep `offset` inside `0..=total - visible`
fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
}
