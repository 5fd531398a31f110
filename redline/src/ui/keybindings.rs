//! Keybinding dispatcher for redline.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop what, if anything, the session or dialog
//! must do next. The dispatcher branches first on `state.mode` so every mode
//! has an isolated handler function.
//!
//! Session operations are never performed here: the live session is owned by
//! the event loop, so review keys come back as `KeyAction::Review(intent)`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use redline_core::Intent;

use crate::app::{AppState, Mode, PanelFocus};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing for the event loop to do beyond redrawing.
    Continue,
    /// Exit without a review (generating or failed).
    Quit,
    /// Forward this intent to the live session.
    Review(Intent),
    /// Confirm the open review dialog.
    ConfirmDialog,
    /// Dismiss the open review dialog.
    CancelDialog,
}

/// Dispatches a key event to the handler matching the current mode.
///
/// # Arguments
///
/// * `key`   - the raw crossterm key event (code + modifiers)
/// * `state` - mutable reference to all UI state
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Review => handle_review(key, state),
        Mode::Dialog => handle_dialog(key, state),
        Mode::Generating | Mode::Failed => handle_idle(key, state),
    }
}

// ---------------------------------------------------------------------------
// Keys shared by the review and dialog modes
// ---------------------------------------------------------------------------

/// Handles focus, scrolling, panel resize and help.
///
/// Returns `Some(KeyAction)` when the key was consumed, `None` when the key
/// should fall through to the mode's own handler.
fn handle_panel_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::Char('H') => state.focus = state.focus.prev(),
        KeyCode::Char('L') => state.focus = state.focus.next(),
        KeyCode::Char('<') => state.shrink_document_panel(),
        KeyCode::Char('>') => state.grow_document_panel(),
        KeyCode::Char('?') => state.open_help(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// Review mode
// ---------------------------------------------------------------------------

/// Handles a key event while reviewing inline suggestions.
///
/// Accept and reject act on the selected row: the title row maps to the
/// title intents, a suggestion row to the per-suggestion ones.
fn handle_review(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_panel_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.select_next();
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.select_prev();
            KeyAction::Continue
        }
        KeyCode::Char('g') => {
            state.select_first();
            KeyAction::Continue
        }
        KeyCode::Char('G') => {
            state.select_last();
            KeyAction::Continue
        }
        KeyCode::Char('a') | KeyCode::Enter => {
            state.intent_for_selected(true).map_or(KeyAction::Continue, KeyAction::Review)
        }
        KeyCode::Char('r') | KeyCode::Char('x') => {
            state.intent_for_selected(false).map_or(KeyAction::Continue, KeyAction::Review)
        }
        KeyCode::Char('A') => KeyAction::Review(Intent::AcceptAll),
        KeyCode::Char('R') => KeyAction::Review(Intent::RejectAll),
        KeyCode::Char('t') => KeyAction::Review(Intent::AcceptTitle),
        KeyCode::Char('T') => KeyAction::Review(Intent::RejectTitle),
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Review(Intent::Cancel),
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Dialog mode
// ---------------------------------------------------------------------------

/// Handles a key event while the review dialog is open.
///
/// Toggles mutate the dialog in `state` directly; confirm and cancel are
/// returned to the event loop, which owns the outcome.
fn handle_dialog(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_panel_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.dialog_next(),
        KeyCode::Char('k') | KeyCode::Up => state.dialog_prev(),
        KeyCode::Char(' ') => state.toggle_dialog_row(),
        KeyCode::Char('y') => state.set_all_dialog(true),
        KeyCode::Char('n') => state.set_all_dialog(false),
        KeyCode::Char('t') => state.toggle_dialog_title(),
        KeyCode::Enter => return KeyAction::ConfirmDialog,
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::CancelDialog,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Generating / Failed modes
// ---------------------------------------------------------------------------

/// Handles a key event while no review is open.
///
/// Only quitting, scrolling the preview and help are available.
fn handle_idle(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Enter if state.mode == Mode::Failed => KeyAction::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            state.scroll_down(1);
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.scroll_up(1);
            KeyAction::Continue
        }
        _ => handle_panel_key(key, state).unwrap_or(KeyAction::Continue),
    }
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// Handles a key event while the help overlay is visible.
///
/// `?`, `Esc`, or `q` dismiss the overlay and return to the previous mode.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.close_help(),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Handles a mouse event: click-to-focus and scroll-wheel.
///
/// Scroll wheel moves the focused panel by 3 rows, or the help overlay when
/// it is open.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let pos = Position { x: mouse.column, y: mouse.row };
            let [document, suggestions] = state.panel_rects;
            if document.contains(pos) {
                state.focus = PanelFocus::Document;
            } else if suggestions.width > 0 && suggestions.contains(pos) {
                state.focus = PanelFocus::Suggestions;
            }
        }
        MouseEventKind::ScrollUp if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ReviewSnapshot;
    use ratatui::layout::Rect;
    use redline_core::{Granularity, ReviewDialog, Suggestion, SuggestionId};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn reviewing() -> AppState {
        let mut state = AppState::default();
        state.enter_review();
        state.apply_snapshot(
            ReviewSnapshot {
                suggestions: vec![Suggestion {
                    id: SuggestionId::from("s1"),
                    from: 0,
                    to: 3,
                    original_text: "one".into(),
                    suggested_text: "ONE".into(),
                }],
                proposed_title: None,
                current_title: None,
            },
            "one two".into(),
        );
        state
    }

    #[test]
    fn review_keys_become_intents() {
        let mut state = reviewing();
        let s1 = SuggestionId::from("s1");
        let mut intent = |code| match handle_key(press(code), &mut state) {
            KeyAction::Review(intent) => Some(intent),
            _ => None,
        };
        assert_eq!(intent(KeyCode::Char('a')), Some(Intent::Accept(s1.clone())));
        assert_eq!(intent(KeyCode::Enter), Some(Intent::Accept(s1.clone())));
        assert_eq!(intent(KeyCode::Char('x')), Some(Intent::Reject(s1)));
        assert_eq!(intent(KeyCode::Char('A')), Some(Intent::AcceptAll));
        assert_eq!(intent(KeyCode::Char('R')), Some(Intent::RejectAll));
        assert_eq!(intent(KeyCode::Esc), Some(Intent::Cancel));
    }

    #[test]
    fn accept_without_selection_does_nothing() {
        let mut state = AppState::default();
        state.enter_review();
        assert_eq!(handle_key(press(KeyCode::Char('a')), &mut state), KeyAction::Continue);
    }

    #[test]
    fn help_overlay_swallows_review_keys() {
        let mut state = reviewing();
        handle_key(press(KeyCode::Char('?')), &mut state);
        assert_eq!(state.mode, Mode::HelpOverlay);
        assert_eq!(handle_key(press(KeyCode::Char('a')), &mut state), KeyAction::Continue);
        handle_key(press(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Review);
    }

    #[test]
    fn dialog_keys_toggle_and_finish() {
        let mut state = AppState::default();
        state.enter_dialog(ReviewDialog::new("a b", "a B", Granularity::Word, None));

        handle_key(press(KeyCode::Char(' ')), &mut state);
        assert_eq!(state.dialog.as_ref().map(|d| d.preview()), Some("a b".to_owned()));
        handle_key(press(KeyCode::Char('y')), &mut state);
        assert_eq!(state.dialog.as_ref().map(|d| d.preview()), Some("a B".to_owned()));

        assert_eq!(handle_key(press(KeyCode::Enter), &mut state), KeyAction::ConfirmDialog);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), KeyAction::CancelDialog);
    }

    #[test]
    fn only_quit_while_generating() {
        let mut state = AppState::default();
        assert_eq!(handle_key(press(KeyCode::Char('a')), &mut state), KeyAction::Continue);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), KeyAction::Quit);
    }

    #[test]
    fn click_moves_focus() {
        let mut state = reviewing();
        state.panel_rects = [Rect::new(0, 0, 60, 20), Rect::new(59, 0, 40, 20)];
        let click = |column| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(click(80), &mut state);
        assert_eq!(state.focus, PanelFocus::Suggestions);
        handle_mouse(click(10), &mut state);
        assert_eq!(state.focus, PanelFocus::Document);
    }
}
