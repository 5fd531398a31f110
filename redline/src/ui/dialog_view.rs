//! Review dialog renderer for redline.
//!
//! The dialog body shows the whole reviewed span: context dimmed, each change
//! behind a `[x]`/`[ ]` marker with word-level emphasis between its two
//! sides. Accepted changes strike the original; rejected ones strike the
//! suggestion instead.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{List, ListItem},
    text::Line,
};
use redline_core::{DialogEntry, ReviewDialog, SegmentKind};
use similar::{ChangeTag, TextDiff};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::document_view::push_run;
use crate::ui::layout::{inner_rect, panel_block};

/// Word-level diff of one replaced run, as `(emphasized, text)` pieces per side.
fn word_diff_runs(old: &str, new: &str) -> (Vec<(bool, String)>, Vec<(bool, String)>) {
    let diff = TextDiff::from_words(old, new);
    let mut old_runs = Vec::new();
    let mut new_runs = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.into_owned();
                match change.tag() {
                    ChangeTag::Delete => old_runs.push((emphasized, text)),
                    ChangeTag::Insert => new_runs.push((emphasized, text)),
                    ChangeTag::Equal => {
                        old_runs.push((false, text.clone()));
                        new_runs.push((false, text));
                    }
                }
            }
        }
    }
    (old_runs, new_runs)
}

fn side_style(base: Style, struck: bool) -> Style {
    if struck { base.add_modifier(Modifier::CROSSED_OUT) } else { base }
}

fn push_side(
    lines: &mut Vec<Line<'static>>,
    runs: &[(bool, String)],
    base: Style,
    struck: bool,
) {
    for (emphasized, text) in runs {
        let style = if *emphasized { base.add_modifier(Modifier::BOLD) } else { base };
        push_run(lines, text, side_style(style, struck));
    }
}

fn push_change(lines: &mut Vec<Line<'static>>, entry: &DialogEntry, theme: &Theme) {
    let removed = Style::default().fg(theme.removed);
    let inserted = Style::default().fg(theme.inserted);
    let segment = &entry.segment;
    match segment.kind {
        SegmentKind::Replace => {
            let (old_runs, new_runs) = word_diff_runs(&segment.original, &segment.modified);
            push_side(lines, &old_runs, removed, entry.accepted);
            push_side(lines, &new_runs, inserted, !entry.accepted);
        }
        SegmentKind::Delete => {
            push_run(lines, &segment.original, side_style(removed, entry.accepted))
        }
        SegmentKind::Insert => {
            push_run(lines, &segment.modified, side_style(inserted, !entry.accepted))
        }
        SegmentKind::Context => {}
    }
}

/// Lays out the dialog body. Returns the lines and the line of each change marker.
pub fn dialog_lines(
    dialog: &ReviewDialog,
    cursor_change: Option<usize>,
    theme: &Theme,
) -> (Vec<Line<'static>>, Vec<usize>) {
    let context = Style::default().fg(theme.context_dim);
    let mut lines = vec![Line::default()];
    let mut anchors = Vec::new();

    for entry in dialog.entries() {
        if !entry.segment.is_change() {
            push_run(&mut lines, &entry.segment.original, context);
            continue;
        }
        let marker = if entry.accepted { "[x]" } else { "[ ]" };
        let mut marker_style = Style::default().fg(theme.border_inactive);
        if cursor_change == Some(anchors.len()) {
            marker_style = Style::default()
                .fg(theme.border_active)
                .bg(theme.selected_bg)
                .add_modifier(Modifier::BOLD);
        }
        anchors.push(lines.len() - 1);
        push_run(&mut lines, marker, marker_style);
        push_change(&mut lines, entry, theme);
    }
    (lines, anchors)
}

/// Renders the dialog body into the document panel.
///
/// Caches the change anchors and total line count in `state`.
///
/// # Arguments
///
/// * `frame` - current render frame
/// * `area` - the `Rect` for the document panel (includes borders)
/// * `state` - app state supplying the dialog and scroll offset
/// * `theme` - active color theme
pub fn render_dialog(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Document;
    let title = format!("Review {}", state.file_label);
    let block = panel_block(&title, is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let Some(dialog) = state.dialog.as_ref() else {
        return;
    };
    let (lines, anchors) = dialog_lines(dialog, state.dialog_change_ordinal(), theme);
    state.dialog_anchors = anchors;
    state.doc_line_count = lines.len();

    let total = lines.len();
    let visible_start = state.doc_scroll.min(total.saturating_sub(1));
    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(visible_start)
        .take(inner.height as usize)
        .map(ListItem::new)
        .collect();
    frame.render_widget(List::new(items), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::Granularity;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn word_runs_rebuild_both_sides() {
        let (old, new) = word_diff_runs("the quick fox\n", "the slow fox\n");
        let join = |runs: &[(bool, String)]| {
            runs.iter().map(|(_, t)| t.as_str()).collect::<String>()
        };
        assert_eq!(join(&old), "the quick fox\n");
        assert_eq!(join(&new), "the slow fox\n");
        assert!(old.iter().any(|(e, t)| !*e && t.contains("the")));
    }

    #[test]
    fn markers_follow_acceptance() {
        let theme = Theme::dark();
        let mut dialog = ReviewDialog::new("one\ntwo\n", "ONE\ntwo\n", Granularity::Line, None);
        let (lines, anchors) = dialog_lines(&dialog, Some(0), &theme);
        assert_eq!(anchors, vec![0]);
        assert!(line_text(&lines[0]).starts_with("[x]"));

        let index = dialog.change_indices()[0];
        dialog.toggle(index);
        let (lines, _) = dialog_lines(&dialog, None, &theme);
        assert!(line_text(&lines[0]).starts_with("[ ]"));
        let struck = lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .find(|s| s.content.contains("ONE"))
            .map(|s| s.style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert_eq!(struck, Some(true));
    }

    #[test]
    fn context_keeps_line_structure() {
        let theme = Theme::dark();
        let dialog = ReviewDialog::new("a\nb\nc", "a\nB\nc", Granularity::Line, None);
        let (lines, anchors) = dialog_lines(&dialog, None, &theme);
        assert_eq!(anchors, vec![1]);
        assert_eq!(line_text(&lines[0]), "a");
        assert_eq!(lines.last().map(line_text).as_deref(), Some("c"));
    }
}
