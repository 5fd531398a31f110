//! UI rendering module for redline.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; the
//! document panel is drawn by `document_view.rs` (or `dialog_view.rs` while the
//! review dialog is open) and the right panel by `suggestion_list.rs`.

mod layout;
pub mod dialog_view;
pub mod document_view;
pub mod help;
pub mod keybindings;
pub mod suggestion_list;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: document panel, suggestion list, and status bar.
///
/// Called exactly once per `AppEvent::Render` inside `terminal.draw()`.
///
/// Viewport heights and panel rects are written back into `state` so that the
/// *next* keypress can compute half-page distances and mouse hits correctly.
///
/// # Arguments
///
/// * `frame` - current render frame provided by `terminal.draw()`
/// * `state` - mutable reference to app state (geometry and anchors are cached here)
/// * `theme` - active color theme
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [document, suggestions, status_bar] = compute_layout(frame, state);

    state.doc_viewport_height = inner_rect(document).height;
    state.list_viewport_height = inner_rect(suggestions).height;
    state.panel_rects = [document, suggestions];

    let mode = state.screen_mode();
    if mode == Mode::Dialog {
        dialog_view::render_dialog(frame, document, state, theme);
    } else {
        document_view::render_document(frame, document, state, theme);
    }

    if suggestions.width > 0 {
        suggestion_list::render_suggestion_list(frame, suggestions, state, theme);
    }

    render_status_bar(frame, status_bar, state, theme);

    // Rendered last so it sits on top.
    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
