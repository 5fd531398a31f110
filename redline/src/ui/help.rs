//! Help overlay renderer for redline.
//!
//! Draws a centred modal over the panel layout, using ratatui's `Clear` widget
//! to erase the background first inside the same `terminal.draw()` closure.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal on top of the 2-panel layout.
///
/// Skipped on terminals narrower than 60 columns to avoid a zero-height `Rect`.
///
/// # Arguments
///
/// * `frame` - current render frame provided by `terminal.draw()`
/// * `theme` - active color theme (supplies `border_active` for the modal border)
/// * `help_scroll` - vertical scroll offset; j/k in HelpOverlay mode mutate this field
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help - j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Review"),
        Line::from("  j / k         Select next / previous suggestion"),
        Line::from("  g / G         Select first / last"),
        Line::from("  a / Enter     Accept the selected suggestion (or title)"),
        Line::from("  r / x         Reject the selected suggestion (or title)"),
        Line::from("  A / R         Accept all / reject all"),
        Line::from("  t / T         Accept / reject the proposed title"),
        Line::from("  q / Esc       Cancel the review, nothing is written"),
        Line::from(""),
        Line::from("Dialog"),
        Line::from("  j / k         Move between changes"),
        Line::from("  Space         Toggle the change under the cursor"),
        Line::from("  y / n         Accept / reject every change"),
        Line::from("  t             Toggle the proposed title"),
        Line::from("  Enter         Confirm and write the result"),
        Line::from("  q / Esc       Cancel, nothing is written"),
        Line::from(""),
        Line::from("Panels"),
        Line::from("  H / L         Move panel focus left / right"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from("  < / >         Shrink / grow the document panel"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q             Quit while generating, or after a failure"),
    ])
}
