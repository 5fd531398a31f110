//! Responsive 2-panel layout engine for redline.
//!
//! This module is pure layout arithmetic plus the shared panel chrome. It is
//! called inside `terminal.draw()` on every render so every frame gets a fresh
//! layout that automatically reflects the current terminal size.
//!
//! # Panel geometry
//!
//! At `>= 100` columns the document panel takes `AppState.doc_pct` percent of
//! the width and the suggestion list takes the rest. Below 100 columns the list
//! collapses and the document fills the full width.
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)`
//! makes adjacent panel borders share a single column.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Returns `[document, suggestions, status_bar]` `Rect`s for the current frame.
///
/// The returned rects are valid only for the current draw closure.
///
/// # Arguments
///
/// * `frame` - current render frame (provides `frame.area()` with live terminal size)
/// * `state` - read-only app state supplying the document panel percentage
pub fn compute_layout(frame: &Frame, state: &AppState) -> [Rect; 3] {
    let term_width = frame.area().width;

    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let horizontal = if term_width >= 100 {
        Layout::horizontal([
            Constraint::Percentage(state.doc_pct),
            Constraint::Percentage(100 - state.doc_pct),
        ])
        .spacing(Spacing::Overlap(1))
    } else {
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(0)])
            .spacing(Spacing::Overlap(1))
    };

    let [document, suggestions] = main_area.layout(&horizontal);

    [document, suggestions, status_bar]
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Applies `BorderType::Thick` when the panel is focused and `BorderType::Plain`
/// otherwise. `MergeStrategy::Fuzzy` is required because `Exact` produces
/// incorrect junctions when mixing `Thick` and `Plain` borders.
///
/// # Arguments
///
/// * `title` - panel title shown in the top border
/// * `is_focused` - `true` when this panel has keyboard focus
/// * `theme` - active color theme (supplies `border_active` / `border_inactive`)
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar at the bottom of the terminal.
///
/// Always shows a mode indicator followed by a mode-specific summary. In
/// `Failed` mode the failure message replaces the summary.
///
/// # Arguments
///
/// * `frame` - current render frame
/// * `area` - the 1-row `Rect` returned by `compute_layout` (index 2)
/// * `state` - read-only app state
/// * `theme` - active color theme
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mode = state.screen_mode();
    let (mode_text, mode_fg) = match mode {
        Mode::Generating | Mode::HelpOverlay => (" GENERATING ", theme.status_mode_generating),
        Mode::Review => (" REVIEW ", theme.status_mode_review),
        Mode::Dialog => (" DIALOG ", theme.status_mode_dialog),
        Mode::Failed => (" FAILED ", theme.error),
    };

    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];

    let summary = match mode {
        Mode::Generating | Mode::HelpOverlay => format!(
            " {} {} chars received",
            SPINNER[state.spinner % SPINNER.len()],
            state.stream_preview.chars().count()
        ),
        Mode::Review => {
            let pending = state.snapshot.suggestions.len();
            let title = if state.snapshot.proposed_title.is_some() { " + title" } else { "" };
            format!(" {pending} pending{title}  a accept  r reject  A/R all  ? help")
        }
        Mode::Dialog => match state.dialog.as_ref() {
            Some(dialog) => {
                let changes = dialog.change_indices();
                let accepted =
                    changes.iter().filter(|&&i| dialog.entries()[i].accepted).count();
                format!(" {accepted}/{} accepted  space toggle  enter confirm", changes.len())
            }
            None => String::new(),
        },
        Mode::Failed => String::new(),
    };
    spans.push(Span::raw(summary));

    if let Some(message) = state.status.as_deref() {
        let style = if mode == Mode::Failed {
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("  {message}"), style));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
