//! Terminal viewer built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`app`]**: viewer state, keyboard event loop, pane focus and the
//!   opt-in run action
//! - **[`panes`]**: render functions for the source, generated code and
//!   output panes and the status bar
//! - **[`theme`]**: colour palette shared by all panes
//!
//! Construct an [`App`] from the source text, its translation result and an
//! optional [`Executor`](crate::exec::Executor), then call [`App::run`].
//! Without an executor the `r` key only reports that execution is disabled.
//!
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
