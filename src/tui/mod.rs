//! Terminal UI using ratatui

mod terminal;
mod ui;

pub use terminal::Tui;
pub use ui::{pool_slot_at, render};
