// Terminal UI implementation using ratatui
// The face of questlog: quest board, stash, progress bars

pub mod app;
pub mod runner;
pub mod ui;

pub use app::{App, CatalogState, InputMode, View};
pub use runner::run_tui;
