//! Document panel renderer for redline.
//!
//! Pending suggestions are drawn inline: the text a suggestion would remove
//! is struck through, the text it would insert follows as ghosted italics.
//! Rendering uses a List with manual virtual scrolling; only
//! `lines[doc_scroll..doc_scroll + viewport_height]` becomes `ListItem`s.

use std::collections::HashMap;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};
use redline_core::{Suggestion, SuggestionId};

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Appends `text` in `style`, starting a new line after every `\n`.
pub(crate) fn push_run(lines: &mut Vec<Line<'static>>, text: &str, style: Style) {
    if lines.is_empty() {
        lines.push(Line::default());
    }
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        if !part.is_empty() {
            if let Some(line) = lines.last_mut() {
                line.push_span(Span::styled(part.to_owned(), style));
            }
        }
    }
}

fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices().nth(char_idx).map_or(text.len(), |(b, _)| b)
}

/// Lays out `text` with every applicable suggestion inlined.
///
/// A snapshot may lag the document by one event; suggestions whose range no
/// longer holds their `original_text` are drawn as plain text. Returns the
/// lines and the line each drawn suggestion starts on.
pub fn document_lines(
    text: &str,
    suggestions: &[Suggestion],
    selected: Option<&SuggestionId>,
    theme: &Theme,
) -> (Vec<Line<'static>>, HashMap<SuggestionId, usize>) {
    let len = text.chars().count();
    let mut pending: Vec<&Suggestion> = suggestions
        .iter()
        .filter(|s| s.fits(len))
        .filter(|s| {
            text[byte_offset(text, s.from)..byte_offset(text, s.to)] == s.original_text
        })
        .collect();
    pending.sort_by_key(|s| (s.from, s.to));

    let plain = Style::default().fg(theme.text);
    let mut lines = vec![Line::default()];
    let mut anchors = HashMap::new();
    let mut cursor = 0;

    for s in pending {
        // Skip anything overlapping what was already drawn.
        if s.from < cursor {
            continue;
        }
        push_run(&mut lines, &text[byte_offset(text, cursor)..byte_offset(text, s.from)], plain);
        anchors.insert(s.id.clone(), lines.len() - 1);

        let mut removed = Style::default().fg(theme.removed).add_modifier(Modifier::CROSSED_OUT);
        let mut inserted = Style::default().fg(theme.inserted).add_modifier(Modifier::ITALIC);
        if selected == Some(&s.id) {
            removed = removed.bg(theme.selected_bg);
            inserted = inserted.bg(theme.selected_bg).add_modifier(Modifier::BOLD);
        }
        push_run(&mut lines, &s.original_text, removed);
        push_run(&mut lines, &s.suggested_text, inserted);
        cursor = s.to;
    }
    push_run(&mut lines, &text[byte_offset(text, cursor)..], plain);

    // A trailing newline would otherwise render as one empty extra row.
    if text.ends_with('\n') && lines.len() > 1 && lines.last().is_some_and(|l| l.spans.is_empty())
    {
        lines.pop();
    }
    (lines, anchors)
}

/// Renders the document panel for the generating, review and failed modes.
///
/// Caches the anchors and total line count in `state` for the next keypress.
///
/// # Arguments
///
/// * `frame` - current render frame
/// * `area` - the `Rect` for the document panel (includes borders)
/// * `state` - app state supplying text, snapshot, and scroll offset
/// * `theme` - active color theme
pub fn render_document(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Document;
    let mode = state.screen_mode();

    let lines = match mode {
        Mode::Generating => {
            let mut lines = Vec::new();
            if state.stream_preview.is_empty() {
                let waiting = Style::default().fg(theme.context_dim);
                push_run(&mut lines, "Waiting for the generator...", waiting);
            } else {
                let style = Style::default().fg(theme.inserted).add_modifier(Modifier::ITALIC);
                push_run(&mut lines, &state.stream_preview, style);
            }
            lines
        }
        _ => {
            let (lines, anchors) = document_lines(
                &state.document_text,
                &state.snapshot.suggestions,
                state.selected_id(),
                theme,
            );
            state.doc_anchors = anchors;
            lines
        }
    };
    state.doc_line_count = lines.len();

    let title = match mode {
        Mode::Generating => format!("{} (generating)", state.file_label),
        _ => state.file_label.clone(),
    };
    let block = panel_block(&title, is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let total = lines.len();
    let visible_start = state.doc_scroll.min(total.saturating_sub(1));
    let visible_end = (visible_start + inner.height as usize).min(total);

    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(visible_start)
        .take(visible_end - visible_start)
        .map(ListItem::new)
        .collect();
    frame.render_widget(List::new(items), inner);
}
