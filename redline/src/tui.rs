//! Terminal lifecycle for redline.
//!
//! The TUI draws on stderr so stdout only ever carries the summary printed
//! after the review (written path, proposed rename). `redline notes.md >
//! summary.txt` therefore captures the summary and nothing else.
//!
//! [`TerminalGuard`] owns the terminal while the review runs. Dropping it
//! puts the terminal back, so an early `?` in `main` cannot leave the shell
//! in raw mode; [`TerminalGuard::restore`] does the same but reports errors.

use std::io::{self, stderr, BufWriter, Stderr};
use std::panic;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossterm::cursor::Show;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag::register;
use tracing::debug;

/// Crossterm backend over buffered stderr; one flush per frame.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Exclusive use of the terminal for the duration of a review.
pub struct TerminalGuard {
    terminal: Tui,
    restored: bool,
}

impl TerminalGuard {
    /// Switches to raw mode, the alternate screen, and mouse capture.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the first step that fails. Steps already
    /// taken are undone before returning.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = BufWriter::new(stderr());
        let terminal = execute!(out, EnterAlternateScreen, EnableMouseCapture)
            .and_then(|()| Terminal::new(CrosstermBackend::new(out)));
        match terminal {
            Ok(terminal) => {
                debug!("terminal taken over");
                Ok(Self { terminal, restored: false })
            }
            Err(e) => {
                let _ = restore_terminal();
                Err(e)
            }
        }
    }

    pub fn terminal(&mut self) -> &mut Tui {
        &mut self.terminal
    }

    /// Hands the terminal back to the shell.
    ///
    /// # Errors
    ///
    /// Returns the first error met while undoing the terminal modes; every
    /// step is still attempted.
    pub fn restore(mut self) -> io::Result<()> {
        self.restored = true;
        restore_terminal()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if !self.restored {
            let _ = restore_terminal();
        }
    }
}

/// Leaves raw mode and the alternate screen, and shows the cursor again.
///
/// Safe to call more than once, and from the panic hook.
pub fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(stderr(), LeaveAlternateScreen, DisableMouseCapture, Show);
    raw.and(screen)
}

/// Restores the terminal before the previous panic hook prints its message.
///
/// Install before [`TerminalGuard::enter`].
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        previous(info);
    }));
}

/// Returns a flag that flips to `true` on any termination signal.
///
/// Covers SIGTERM, SIGINT and SIGQUIT on Unix. The event loop polls the flag
/// on its heartbeat and shuts down through the normal exit path.
///
/// # Errors
///
/// Returns the OS error if a handler cannot be registered.
pub fn watch_termination() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for &signal in TERM_SIGNALS {
        register(signal, Arc::clone(&flag))?;
    }
    Ok(flag)
}

