//! Suggestion list panel renderer for redline.
//!
//! In review mode the list shows the pending title proposal (if any) followed
//! by every pending suggestion; in dialog mode it shows the dialog's rows with
//! their checkbox state. Each row carries a kind badge and a one-line preview.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};
use redline_core::{ReviewDialog, SegmentKind, Suggestion, SuggestionKind};

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

const PREVIEW_CHARS: usize = 32;

/// Single-line, length-capped rendering of `text`.
fn preview(text: &str) -> String {
    let flat: String = text.chars().map(|c| if c == '\n' { '⏎' } else { c }).collect();
    if flat.chars().count() > PREVIEW_CHARS {
        let mut cut: String = flat.chars().take(PREVIEW_CHARS - 1).collect();
        cut.push('…');
        cut
    } else {
        flat
    }
}

fn change_spans(
    kind: SuggestionKind,
    original: &str,
    suggested: &str,
    theme: &Theme,
) -> Vec<Span<'static>> {
    let removed = Style::default().fg(theme.removed);
    let inserted = Style::default().fg(theme.inserted);
    match kind {
        SuggestionKind::Insertion => vec![
            Span::styled("+ ", inserted),
            Span::styled(preview(suggested), inserted),
        ],
        SuggestionKind::Deletion => vec![
            Span::styled("- ", removed),
            Span::styled(preview(original), removed.add_modifier(Modifier::CROSSED_OUT)),
        ],
        SuggestionKind::Replacement => vec![
            Span::styled("~ ", Style::default().fg(theme.border_active)),
            Span::styled(preview(original), removed.add_modifier(Modifier::CROSSED_OUT)),
            Span::raw(" → "),
            Span::styled(preview(suggested), inserted),
        ],
    }
}

fn title_spans(current: Option<&str>, proposed: &str, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(
        "T ",
        Style::default().fg(theme.title_badge).add_modifier(Modifier::BOLD),
    )];
    if let Some(current) = current {
        spans.push(Span::styled(
            preview(current),
            Style::default().fg(theme.removed).add_modifier(Modifier::CROSSED_OUT),
        ));
        spans.push(Span::raw(" → "));
    }
    spans.push(Span::styled(preview(proposed), Style::default().fg(theme.title_badge)));
    spans
}

fn suggestion_item(s: &Suggestion, theme: &Theme) -> ListItem<'static> {
    ListItem::new(Line::from(change_spans(s.kind(), &s.original_text, &s.suggested_text, theme)))
}

fn dialog_items(dialog: &ReviewDialog, theme: &Theme) -> Vec<ListItem<'static>> {
    let checkbox = |accepted: bool| {
        let style = if accepted {
            Style::default().fg(theme.inserted)
        } else {
            Style::default().fg(theme.border_inactive)
        };
        Span::styled(if accepted { "[x] " } else { "[ ] " }, style)
    };

    let mut items = Vec::new();
    if let Some(title) = dialog.title() {
        let mut spans = vec![checkbox(dialog.title_accepted())];
        spans.extend(title_spans(title.current.as_deref(), &title.proposed, theme));
        items.push(ListItem::new(Line::from(spans)));
    }
    for index in dialog.change_indices() {
        let entry = &dialog.entries()[index];
        let kind = match entry.segment.kind {
            SegmentKind::Insert => SuggestionKind::Insertion,
            SegmentKind::Delete => SuggestionKind::Deletion,
            SegmentKind::Replace | SegmentKind::Context => SuggestionKind::Replacement,
        };
        let mut spans = vec![checkbox(entry.accepted)];
        spans.extend(change_spans(kind, &entry.segment.original, &entry.segment.modified, theme));
        items.push(ListItem::new(Line::from(spans)));
    }
    items
}

/// Renders the suggestion list panel.
///
/// Uses `render_stateful_widget` so the selection highlight is applied. The
/// pending count is shown in the panel title.
///
/// # Arguments
///
/// * `frame` - current render frame
/// * `area` - the `Rect` for the list panel (includes borders)
/// * `state` - mutable app state (the list selection lives here)
/// * `theme` - active color theme
pub fn render_suggestion_list(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Suggestions;
    let mode = state.screen_mode();
    let highlight = Style::default().bg(theme.selected_bg).add_modifier(Modifier::BOLD);

    if mode == Mode::Dialog {
        let items = state.dialog.as_ref().map(|d| dialog_items(d, theme)).unwrap_or_default();
        let title = format!("Changes ({})", items.len());
        let list = List::new(items)
            .block(panel_block(&title, is_focused, theme))
            .highlight_style(highlight);
        let mut list_state = ListState::default().with_selected(Some(state.dialog_cursor));
        frame.render_stateful_widget(list, area, &mut list_state);
        return;
    }

    let mut items = Vec::with_capacity(state.row_count());
    if let Some(proposed) = state.snapshot.proposed_title.as_deref() {
        items.push(ListItem::new(Line::from(title_spans(
            state.snapshot.current_title.as_deref(),
            proposed,
            theme,
        ))));
    }
    items.extend(state.snapshot.suggestions.iter().map(|s| suggestion_item(s, theme)));

    let title = if items.is_empty() {
        "Suggestions".to_owned()
    } else {
        format!("Suggestions ({})", items.len())
    };
    if items.is_empty() {
        let msg = match mode {
            Mode::Generating => "Waiting for the rewrite...",
            Mode::Failed => "No review",
            _ => "Nothing pending",
        };
        items.push(ListItem::new(Line::styled(msg, Style::default().fg(theme.context_dim))));
    }

    let list = List::new(items)
        .block(panel_block(&title, is_focused, theme))
        .highlight_style(highlight);
    frame.render_stateful_widget(list, area, &mut state.suggestion_list_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previews_are_flat_and_capped() {
        assert_eq!(preview("a\nb"), "a⏎b");
        let long = "x".repeat(100);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS);
        assert!(cut.ends_with('…'));
    }
}
