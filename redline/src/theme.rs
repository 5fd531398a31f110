//! Color theme system for redline.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! redline renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including 256-color
//!   SSH sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use tracing::warn;

/// All color values used across redline's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Document view
    /// Plain document text.
    pub text: Color,
    /// Original text a pending suggestion would remove.
    pub removed: Color,
    /// Ghosted suggested text.
    pub inserted: Color,
    /// Background of the selected suggestion.
    pub selected_bg: Color,
    /// Text outside the reviewed change, and unchanged dialog context.
    pub context_dim: Color,

    // Suggestion list
    /// Badge shown in front of a title proposal.
    pub title_badge: Color,
    /// Generator and setup failures.
    pub error: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator while the generator is running.
    pub status_mode_generating: Color,
    /// Mode indicator while reviewing inline suggestions.
    pub status_mode_review: Color,
    /// Mode indicator while the review dialog is open.
    pub status_mode_dialog: Color,

    // General
    /// Application background (used for clearing areas).
    pub background: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    ///
    /// Works on 16-color, 256-color, and truecolor terminals alike.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            text: Color::Reset,
            removed: Color::Red,
            inserted: Color::Green,
            selected_bg: Color::DarkGray,
            context_dim: Color::DarkGray,

            title_badge: Color::Magenta,
            error: Color::Red,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_generating: Color::Yellow,
            status_mode_review: Color::Cyan,
            status_mode_dialog: Color::Green,

            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            text,
            removed: red,
            inserted: green,
            selected_bg: surface0,
            context_dim: overlay1,

            title_badge: mauve,
            error: red,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_generating: yellow,
            status_mode_review: lavender,
            status_mode_dialog: teal,

            background: base,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    ///
    /// # Arguments
    ///
    /// * `name` - theme name from config or `--theme`, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
