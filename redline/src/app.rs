//! Central application state for redline.
//!
//! This module owns all mutable UI state: the current mode, which panel has
//! focus, the latest review snapshot, selection and scroll offsets, and the
//! open review dialog. No ratatui rendering logic lives here; `app.rs` is pure
//! state that is read by the render module and mutated by the keybinding
//! dispatcher and the event loop.
//!
//! The live `Session` itself is owned by the event loop in `main.rs`. This
//! state only ever sees the snapshots its render adapter posts.

use std::collections::HashMap;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use redline_core::{Intent, ReviewDialog, Suggestion, SuggestionId};

use crate::adapter::ReviewSnapshot;

/// Which screen and keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for the generator; its output streams into the document panel.
    #[default]
    Generating,
    /// Reviewing inline suggestions of a live session.
    Review,
    /// Toggling segments in the modal review dialog.
    Dialog,
    /// Full-screen help overlay on top of the previous mode.
    HelpOverlay,
    /// Generation or setup failed; only quitting is possible.
    Failed,
}

/// Which panel currently has keyboard focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Left panel showing the document (or the dialog body).
    #[default]
    Document,
    /// Right panel listing the pending decisions.
    Suggestions,
}

impl PanelFocus {
    /// Returns the other panel; with two panels `prev` and `next` coincide.
    pub fn prev(self) -> Self {
        self.next()
    }

    pub fn next(self) -> Self {
        match self {
            PanelFocus::Document => PanelFocus::Suggestions,
            PanelFocus::Suggestions => PanelFocus::Document,
        }
    }
}

/// One row of the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRow<'a> {
    /// The pending title proposal, always listed first.
    Title,
    Suggestion(&'a Suggestion),
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    /// Mode to return to when the help overlay closes.
    pub resume_mode: Mode,
    pub focus: PanelFocus,

    /// File name shown in the document panel title.
    pub file_label: String,
    /// Full text of the document as of the latest snapshot.
    pub document_text: String,
    /// What the session last reported as pending.
    pub snapshot: ReviewSnapshot,
    /// Selection in the suggestion list (title row first, then suggestions).
    pub suggestion_list_state: ListState,

    /// Generator output received so far.
    pub stream_preview: String,

    pub dialog: Option<ReviewDialog>,
    /// Selected dialog row (title row first when a proposal exists, then changes).
    pub dialog_cursor: usize,

    /// Vertical scroll offset of the document panel.
    pub doc_scroll: usize,
    /// Rendered line of each pending suggestion, cached by the document view.
    pub doc_anchors: HashMap<SuggestionId, usize>,
    /// Rendered line of each dialog change, cached by the dialog view.
    pub dialog_anchors: Vec<usize>,
    /// Total rendered lines in the document panel, cached after each render.
    pub doc_line_count: usize,

    /// Inner height of the document panel after borders, cached after each render.
    pub doc_viewport_height: u16,
    /// Inner height of the suggestion list after borders, cached after each render.
    pub list_viewport_height: u16,
    pub help_scroll: u16,

    /// `[document, suggestions]` outer rects from the last frame, for mouse hit-testing.
    pub panel_rects: [Rect; 2],
    /// Width percentage of the document panel. Default: 65.
    pub doc_pct: u16,

    /// Transient message for the status bar; failure text in `Failed` mode.
    pub status: Option<String>,
    /// Advances on every logic tick; drives the generating spinner.
    pub spinner: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            resume_mode: Mode::default(),
            focus: PanelFocus::default(),
            file_label: String::new(),
            document_text: String::new(),
            snapshot: ReviewSnapshot::default(),
            suggestion_list_state: ListState::default(),
            stream_preview: String::new(),
            dialog: None,
            dialog_cursor: 0,
            doc_scroll: 0,
            doc_anchors: HashMap::new(),
            dialog_anchors: Vec::new(),
            doc_line_count: 0,
            doc_viewport_height: 0,
            list_viewport_height: 0,
            help_scroll: 0,
            panel_rects: [Rect::default(); 2],
            doc_pct: 65,
            status: None,
            spinner: 0,
        }
    }
}

impl AppState {
    pub fn new(file_label: impl Into<String>, document_text: impl Into<String>) -> Self {
        Self {
            file_label: file_label.into(),
            document_text: document_text.into(),
            ..Self::default()
        }
    }

    // -----------------------------------------------------------------------
    // Mode transitions
    // -----------------------------------------------------------------------

    /// Appends one generator fragment to the live preview.
    pub fn push_fragment(&mut self, fragment: &str) {
        self.stream_preview.push_str(fragment);
    }

    /// Switches to inline review. The first snapshot arrives from the adapter.
    pub fn enter_review(&mut self) {
        self.mode = Mode::Review;
        self.doc_scroll = 0;
        self.status = None;
    }

    pub fn enter_dialog(&mut self, dialog: ReviewDialog) {
        self.dialog = Some(dialog);
        self.dialog_cursor = 0;
        self.mode = Mode::Dialog;
        self.doc_scroll = 0;
        self.status = None;
    }

    /// Records a failure; the status bar shows `message` until the user quits.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.mode = Mode::Failed;
        self.status = Some(message.into());
    }

    pub fn open_help(&mut self) {
        if self.mode != Mode::HelpOverlay {
            self.resume_mode = self.mode;
        }
        self.help_scroll = 0;
        self.mode = Mode::HelpOverlay;
    }

    pub fn close_help(&mut self) {
        self.mode = self.resume_mode;
    }

    /// The mode whose screen is drawn; the help overlay draws over the previous one.
    pub fn screen_mode(&self) -> Mode {
        if self.mode == Mode::HelpOverlay { self.resume_mode } else { self.mode }
    }

    pub fn tick(&mut self) {
        self.spinner = self.spinner.wrapping_add(1);
    }

    // -----------------------------------------------------------------------
    // Review snapshot and selection
    // -----------------------------------------------------------------------

    /// Replaces the snapshot and the document text, keeping the selection on
    /// the same suggestion when it survived.
    pub fn apply_snapshot(&mut self, snapshot: ReviewSnapshot, document_text: String) {
        let kept = match self.selected_row() {
            Some(ListRow::Suggestion(s)) => Some(s.id.clone()),
            _ => None,
        };
        let previous = self.suggestion_list_state.selected();
        self.snapshot = snapshot;
        self.document_text = document_text;

        let rows = self.row_count();
        let title_rows = self.title_rows();
        let selected = if rows == 0 {
            None
        } else if let Some(pos) = kept
            .and_then(|id| self.snapshot.suggestions.iter().position(|s| s.id == id))
        {
            Some(pos + title_rows)
        } else {
            Some(previous.unwrap_or(0).min(rows - 1))
        };
        self.suggestion_list_state.select(selected);
    }

    fn title_rows(&self) -> usize {
        usize::from(self.snapshot.proposed_title.is_some())
    }

    /// Rows in the suggestion list.
    pub fn row_count(&self) -> usize {
        self.title_rows() + self.snapshot.suggestions.len()
    }

    pub fn row(&self, index: usize) -> Option<ListRow<'_>> {
        let title_rows = self.title_rows();
        if index < title_rows {
            return Some(ListRow::Title);
        }
        self.snapshot.suggestions.get(index - title_rows).map(ListRow::Suggestion)
    }

    pub fn selected_row(&self) -> Option<ListRow<'_>> {
        self.suggestion_list_state.selected().and_then(|i| self.row(i))
    }

    /// Id of the selected suggestion, if a suggestion (not the title) is selected.
    pub fn selected_id(&self) -> Option<&SuggestionId> {
        match self.selected_row()? {
            ListRow::Suggestion(s) => Some(&s.id),
            ListRow::Title => None,
        }
    }

    /// The intent that accepting (or rejecting) the selected row expresses.
    pub fn intent_for_selected(&self, accept: bool) -> Option<Intent> {
        Some(match (self.selected_row()?, accept) {
            (ListRow::Title, true) => Intent::AcceptTitle,
            (ListRow::Title, false) => Intent::RejectTitle,
            (ListRow::Suggestion(s), true) => Intent::Accept(s.id.clone()),
            (ListRow::Suggestion(s), false) => Intent::Reject(s.id.clone()),
        })
    }

    pub fn select_next(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let next = self.suggestion_list_state.selected().map_or(0, |i| (i + 1).min(rows - 1));
        self.suggestion_list_state.select(Some(next));
        self.scroll_to_selected();
    }

    pub fn select_prev(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let prev = self.suggestion_list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.suggestion_list_state.select(Some(prev));
        self.scroll_to_selected();
    }

    pub fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.suggestion_list_state.select(Some(0));
            self.scroll_to_selected();
        }
    }

    pub fn select_last(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.suggestion_list_state.select(Some(rows - 1));
            self.scroll_to_selected();
        }
    }

    /// Scrolls the document so the selected suggestion is visible.
    ///
    /// Uses the anchors cached by the previous frame; a suggestion not yet
    /// rendered leaves the scroll untouched.
    pub fn scroll_to_selected(&mut self) {
        let line = match self.selected_row() {
            Some(ListRow::Title) => Some(0),
            Some(ListRow::Suggestion(s)) => self.doc_anchors.get(&s.id).copied(),
            None => None,
        };
        if let Some(line) = line {
            self.reveal_line(line);
        }
    }

    fn reveal_line(&mut self, line: usize) {
        let height = usize::from(self.doc_viewport_height).max(1);
        if line < self.doc_scroll || line >= self.doc_scroll + height {
            self.doc_scroll = line.saturating_sub(height / 3);
        }
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    /// Scrolls the focused panel down by `lines` rows.
    ///
    /// The document panel moves its offset; the suggestion list moves its selection.
    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Document => {
                let max = self.doc_line_count.saturating_sub(1);
                self.doc_scroll = self.doc_scroll.saturating_add(usize::from(lines)).min(max);
            }
            PanelFocus::Suggestions => {
                for _ in 0..lines {
                    self.move_cursor(true);
                }
            }
        }
    }

    /// Scrolls the focused panel up by `lines` rows.
    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Document => {
                self.doc_scroll = self.doc_scroll.saturating_sub(usize::from(lines));
            }
            PanelFocus::Suggestions => {
                for _ in 0..lines {
                    self.move_cursor(false);
                }
            }
        }
    }

    /// Scrolls the focused panel by half its visible height.
    ///
    /// If the cached height is zero (first frame), scrolls by 1.
    pub fn half_page_down(&mut self) {
        let half = self.focused_viewport_height() / 2;
        self.scroll_down(half.max(1));
    }

    pub fn half_page_up(&mut self) {
        let half = self.focused_viewport_height() / 2;
        self.scroll_up(half.max(1));
    }

    /// Gives 5% of the width to the suggestion list; the document keeps at least 30%.
    pub fn shrink_document_panel(&mut self) {
        const MIN_DOC: u16 = 30;
        const STEP: u16 = 5;
        self.doc_pct = self.doc_pct.saturating_sub(STEP).max(MIN_DOC);
    }

    /// Takes 5% of the width from the suggestion list; the list keeps at least 15%.
    pub fn grow_document_panel(&mut self) {
        const MAX_DOC: u16 = 85;
        const STEP: u16 = 5;
        self.doc_pct = (self.doc_pct + STEP).min(MAX_DOC);
    }

    fn focused_viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::Document => self.doc_viewport_height,
            PanelFocus::Suggestions => self.list_viewport_height,
        }
    }

    /// Moves whichever cursor the current mode uses by one row.
    pub fn move_cursor(&mut self, down: bool) {
        match (self.mode, down) {
            (Mode::Dialog, true) => self.dialog_next(),
            (Mode::Dialog, false) => self.dialog_prev(),
            (_, true) => self.select_next(),
            (_, false) => self.select_prev(),
        }
    }

    // -----------------------------------------------------------------------
    // Review dialog
    // -----------------------------------------------------------------------

    fn dialog_title_rows(&self) -> usize {
        self.dialog.as_ref().map_or(0, |d| usize::from(d.title().is_some()))
    }

    /// Rows in the dialog list: the title proposal (if any), then every change.
    pub fn dialog_row_count(&self) -> usize {
        self.dialog.as_ref().map_or(0, |d| self.dialog_title_rows() + d.change_indices().len())
    }

    /// Ordinal among the dialog's changes of the row under the cursor.
    ///
    /// `None` when the cursor is on the title row.
    pub fn dialog_change_ordinal(&self) -> Option<usize> {
        self.dialog_cursor.checked_sub(self.dialog_title_rows())
    }

    pub fn dialog_next(&mut self) {
        let rows = self.dialog_row_count();
        if rows > 0 {
            self.dialog_cursor = (self.dialog_cursor + 1).min(rows - 1);
            self.reveal_dialog_cursor();
        }
    }

    pub fn dialog_prev(&mut self) {
        self.dialog_cursor = self.dialog_cursor.saturating_sub(1);
        self.reveal_dialog_cursor();
    }

    fn reveal_dialog_cursor(&mut self) {
        let line = match self.dialog_change_ordinal() {
            Some(ordinal) => self.dialog_anchors.get(ordinal).copied(),
            None => Some(0),
        };
        if let Some(line) = line {
            self.reveal_line(line);
        }
    }

    /// Toggles the row under the dialog cursor.
    pub fn toggle_dialog_row(&mut self) {
        let ordinal = self.dialog_change_ordinal();
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        match ordinal {
            None => {
                dialog.toggle_title();
            }
            Some(ordinal) => {
                if let Some(&index) = dialog.change_indices().get(ordinal) {
                    dialog.toggle(index);
                }
            }
        }
    }

    /// Accepts or rejects every change in the dialog.
    pub fn set_all_dialog(&mut self, accepted: bool) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.set_all(accepted);
        }
    }

    pub fn toggle_dialog_title(&mut self) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.toggle_title();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::{Granularity, TitleProposal};

    fn suggestion(id: &str, from: usize, to: usize) -> Suggestion {
        Suggestion {
            id: SuggestionId::from(id),
            from,
            to,
            original_text: "x".repeat(to - from),
            suggested_text: "y".into(),
        }
    }

    fn snapshot(ids: &[(&str, usize, usize)], title: bool) -> ReviewSnapshot {
        ReviewSnapshot {
            suggestions: ids.iter().map(|&(id, f, t)| suggestion(id, f, t)).collect(),
            proposed_title: title.then(|| "New".to_owned()),
            current_title: None,
        }
    }

    #[test]
    fn selection_follows_the_same_suggestion() {
        let mut state = AppState::default();
        let ranges = [("s1", 0, 1), ("s2", 4, 5), ("s3", 8, 9)];
        state.apply_snapshot(snapshot(&ranges, false), String::new());
        state.select_next();
        assert_eq!(state.selected_id(), Some(&SuggestionId::from("s2")));

        // s1 resolved: s2 moves up a row and stays selected.
        state.apply_snapshot(snapshot(&[("s2", 3, 4), ("s3", 7, 8)], false), String::new());
        assert_eq!(state.suggestion_list_state.selected(), Some(0));
        assert_eq!(state.selected_id(), Some(&SuggestionId::from("s2")));
    }

    #[test]
    fn selection_clamps_when_the_selected_row_disappears() {
        let mut state = AppState::default();
        state.apply_snapshot(snapshot(&[("s1", 0, 1), ("s2", 4, 5)], false), String::new());
        state.select_last();
        state.apply_snapshot(snapshot(&[("s1", 0, 1)], false), String::new());
        assert_eq!(state.selected_id(), Some(&SuggestionId::from("s1")));

        state.apply_snapshot(ReviewSnapshot::default(), String::new());
        assert_eq!(state.suggestion_list_state.selected(), None);
        assert_eq!(state.intent_for_selected(true), None);
    }

    #[test]
    fn title_row_comes_first() {
        let mut state = AppState::default();
        state.apply_snapshot(snapshot(&[("s1", 0, 1)], true), String::new());
        assert_eq!(state.row_count(), 2);
        assert_eq!(state.selected_row(), Some(ListRow::Title));
        assert_eq!(state.intent_for_selected(true), Some(Intent::AcceptTitle));
        assert_eq!(state.intent_for_selected(false), Some(Intent::RejectTitle));

        state.select_next();
        assert_eq!(
            state.intent_for_selected(false),
            Some(Intent::Reject(SuggestionId::from("s1")))
        );
    }

    #[test]
    fn selecting_scrolls_the_document_to_the_anchor() {
        let mut state = AppState::default();
        state.doc_viewport_height = 10;
        state.apply_snapshot(snapshot(&[("s1", 0, 1), ("s2", 4, 5)], false), String::new());
        state.doc_anchors.insert(SuggestionId::from("s1"), 2);
        state.doc_anchors.insert(SuggestionId::from("s2"), 40);

        state.select_next();
        assert_eq!(state.doc_scroll, 40 - 10 / 3);
        state.select_prev();
        assert_eq!(state.doc_scroll, 0);
    }

    #[test]
    fn help_returns_to_the_previous_mode() {
        let mut state = AppState::default();
        state.enter_review();
        state.open_help();
        state.open_help();
        assert_eq!(state.mode, Mode::HelpOverlay);
        state.close_help();
        assert_eq!(state.mode, Mode::Review);
    }

    #[test]
    fn dialog_cursor_toggles_title_then_changes() {
        let title = TitleProposal::new(Some("Old".into()), "New");
        let dialog = ReviewDialog::new("a b c", "a B c D", Granularity::Word, Some(title));
        let mut state = AppState::default();
        state.enter_dialog(dialog);
        let changes = state.dialog.as_ref().map(|d| d.change_indices().len()).unwrap();
        assert_eq!(state.dialog_row_count(), 1 + changes);

        state.toggle_dialog_row();
        assert!(!state.dialog.as_ref().unwrap().title_accepted());

        state.dialog_next();
        assert_eq!(state.dialog_change_ordinal(), Some(0));
        state.toggle_dialog_row();
        let dialog = state.dialog.as_ref().unwrap();
        let first = dialog.change_indices()[0];
        assert!(!dialog.entries()[first].accepted);

        for _ in 0..10 {
            state.dialog_next();
        }
        assert_eq!(state.dialog_cursor, state.dialog_row_count() - 1);
    }

    #[test]
    fn failure_keeps_its_message() {
        let mut state = AppState::default();
        state.fail("generator exited");
        assert_eq!(state.mode, Mode::Failed);
        assert_eq!(state.status.as_deref(), Some("generator exited"));
    }
}
