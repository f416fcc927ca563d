//! UI rendering module for persona-router
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod ask;
pub mod help_overlay;
pub mod persona_list;
pub mod widgets;

use ratatui::Frame;

use crate::app::{App, AppState};

pub use ask::render as render_ask;
pub use help_overlay::render as render_help_overlay;
pub use persona_list::render as render_persona_list;

/// Renders the UI based on the current application state
pub fn render(frame: &mut Frame, app: &App) {
    match app.state {
        AppState::Asking => render_ask(frame, app),
        AppState::PersonaList => render_persona_list(frame, app),
    }

    if app.show_help {
        render_help_overlay(frame);
    }
}
