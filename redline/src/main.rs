//! redline: review an AI rewrite of a text file, edit by edit.
//!
//! Entry point for the `redline` binary. Wires together the CLI and config
//! (`cli`, `config`), file logging (`logging`), the terminal lifecycle
//! (`tui`), the unified event bus (`event`), the generator worker
//! (`generate`), and the review engine from `redline-core`.
//!
//! # Startup sequence
//!
//! 1. Parse flags, install file logging, load config and apply overrides.
//! 2. Read the file, choose the reviewed range, build the generator. Any
//!    failure here exits before the terminal is touched.
//! 3. `install_panic_hook()`, then `watch_termination()`, then
//!    `TerminalGuard::enter()`.
//! 4. Spawn the event task and the generator worker, then send the one job.
//!
//! # Exit
//!
//! The event loop only exits via `break`, so `TerminalGuard::restore()`
//! always runs; the guard's `Drop` covers early returns.
//! The review result is reported on stdout after the terminal is restored.

mod adapter;
mod app;
mod cli;
mod config;
mod event;
mod generate;
mod logging;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use redline_core::generate::{CancelToken, FixedGenerator, GenerateRequest, Generator};
use redline_core::{
    begin_review, Document, Outcome, PendingOutcome, ReviewDialog, Session, TextDocument,
    TitleProposal,
};
use tracing::{info, warn};

use crate::adapter::ChannelRenderer;
use crate::app::{AppState, Mode};
use crate::config::Config;
use crate::event::AppEvent;
use crate::generate::{CommandGenerator, GenerateJob};
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

/// The file under review and the span handed to the generator.
struct Target {
    path: PathBuf,
    text: String,
    start: usize,
    end: usize,
    original: String,
}

impl Target {
    fn load(path: &Path, lines: Option<cli::LineSpan>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let document = TextDocument::new(text.as_str());
        let (start, end) = match lines {
            Some(span) => document.line_range(span.first, span.last).with_context(|| {
                format!("{} has no line {}", path.display(), span.first)
            })?,
            None => (0, document.len_chars()),
        };
        let original = document.slice(start, end).unwrap_or_default();
        Ok(Self {
            path: path.to_owned(),
            text,
            start,
            end,
            original,
        })
    }

    fn label(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

fn build_generator(cli: &cli::Cli, config: &Config) -> anyhow::Result<Box<dyn Generator + Send>> {
    if let Some(path) = &cli.suggested {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading suggested text {}", path.display()))?;
        return Ok(Box::new(FixedGenerator::new(text)));
    }
    let generator =
        CommandGenerator::new(config.generator.command.clone(), config.generator.timeout())
            .context("pass --command or --suggested, or set generator.command in the config file")?;
    Ok(Box::new(generator))
}

/// Resolves when the live review settles; never resolves without one.
async fn wait_outcome(pending: &mut Option<PendingOutcome>) -> Option<Outcome> {
    match pending {
        Some(outcome) => outcome.await,
        None => std::future::pending().await,
    }
}

/// Confirms a dialog and splices its span result back into the whole file.
fn finish_dialog(dialog: ReviewDialog, target: &Target) -> anyhow::Result<Outcome> {
    let span = dialog.confirm();
    let mut document = TextDocument::new(target.text.as_str());
    span.apply_to(&mut document, target.start, target.end)
        .context("applying the dialog result")?;
    Ok(Outcome {
        text: document.into_string(),
        rename_to: span.rename_to,
    })
}

/// Prints what happened and writes the file if its text changed.
fn report(target: &Target, outcome: Option<Outcome>) -> anyhow::Result<()> {
    let Some(outcome) = outcome else {
        println!("redline: review dismissed, nothing written");
        return Ok(());
    };
    if outcome.text == target.text {
        println!("redline: no changes accepted, {} left untouched", target.path.display());
    } else {
        std::fs::write(&target.path, &outcome.text)
            .with_context(|| format!("writing {}", target.path.display()))?;
        info!(path = %target.path.display(), "review written");
        println!("redline: wrote {}", target.path.display());
    }
    if let Some(title) = outcome.rename_to {
        println!("redline: proposed title: {title}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Logging is best effort; the review works without it.
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("redline: logging disabled: {e:#}");
    }

    let mut config = Config::load(&config::config_path());
    config.apply_cli(&cli);
    config.review.validate().context("invalid [review] configuration")?;

    let target = Target::load(&cli.file, cli.lines)?;
    let generator = build_generator(&cli, &config)?;
    info!(
        file = %target.path.display(),
        start = target.start,
        end = target.end,
        dialog = cli.dialog,
        "starting review"
    );

    let theme = theme::Theme::from_name(&config.theme);
    let mut state = AppState::new(target.label(), target.text.as_str());

    tui::install_panic_hook();
    let term_flag = tui::watch_termination().context("registering signal handlers")?;
    let mut guard = tui::TerminalGuard::enter().context("taking over the terminal")?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let cancel = CancelToken::new();
    let job_tx = generate::worker::spawn_worker(generator, handler.tx.clone());
    let job = GenerateJob {
        request: GenerateRequest::new(target.original.as_str(), &config.review),
        cancel: cancel.clone(),
    };
    if job_tx.send(job).is_err() {
        state.fail("generator worker is not running");
    }

    let mut session: Option<Session<TextDocument>> = None;
    let mut pending: Option<PendingOutcome> = None;
    // `Some` once the review produced its single result.
    let mut result: Option<Option<Outcome>> = None;
    let mut draw_error = None;

    'event_loop: loop {
        tokio::select! {
            // Heartbeat: termination signals are checked at least every 50ms even when no
            // other event arrives.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            outcome = wait_outcome(&mut pending) => {
                result = Some(outcome);
                break 'event_loop;
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        // Exactly one draw() call per Render event.
                        let drawn = guard.terminal().draw(|frame| ui::render(frame, &mut state, &theme));
                        if let Err(e) = drawn {
                            draw_error = Some(e);
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Tick) => state.tick(),
                    Some(AppEvent::Resize(_, _)) => {
                        // frame.area() picks up the new size on the next Render.
                    }
                    Some(AppEvent::Key(key)) => match handle_key(key, &mut state) {
                        KeyAction::Continue => {}
                        KeyAction::Quit => break 'event_loop,
                        KeyAction::Review(intent) => {
                            if let Some(session) = session.as_mut() {
                                session.dispatch(intent);
                            }
                        }
                        KeyAction::ConfirmDialog => {
                            if let Some(dialog) = state.dialog.take() {
                                match finish_dialog(dialog, &target) {
                                    Ok(outcome) => {
                                        result = Some(Some(outcome));
                                        break 'event_loop;
                                    }
                                    Err(e) => state.fail(format!("{e:#}")),
                                }
                            }
                        }
                        KeyAction::CancelDialog => {
                            if let Some(dialog) = state.dialog.take() {
                                result = Some(dialog.cancel());
                                break 'event_loop;
                            }
                        }
                    },
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(AppEvent::Fragment(fragment)) => state.push_fragment(&fragment),
                    Some(AppEvent::Generated(Ok(rewrite))) => {
                        let modified = generate::match_trailing_newline(&target.original, rewrite);
                        let title = TitleProposal::from_headings(
                            cli.title.clone(),
                            &target.original,
                            &modified,
                        );
                        if cli.dialog {
                            let dialog = ReviewDialog::new(
                                &target.original,
                                &modified,
                                config.review.granularity,
                                title,
                            );
                            if dialog.change_indices().is_empty() && dialog.title().is_none() {
                                match finish_dialog(dialog, &target) {
                                    Ok(outcome) => {
                                        result = Some(Some(outcome));
                                        break 'event_loop;
                                    }
                                    Err(e) => state.fail(format!("{e:#}")),
                                }
                            } else {
                                state.enter_dialog(dialog);
                            }
                        } else {
                            match begin_review(
                                TextDocument::new(target.text.as_str()),
                                &target.original,
                                &modified,
                                target.start,
                                target.end,
                                title,
                                &config.review,
                            ) {
                                Ok((mut live, outcome)) => {
                                    state.enter_review();
                                    let renderer = ChannelRenderer::new(handler.tx.clone());
                                    live.set_renderer(Box::new(renderer));
                                    session = Some(live);
                                    pending = Some(outcome);
                                }
                                Err(e) => {
                                    warn!(error = %e, "review could not start");
                                    state.fail(format!("review could not start: {e}"));
                                }
                            }
                        }
                    }
                    Some(AppEvent::Generated(Err(e))) => {
                        state.fail(format!("generation failed: {e}"));
                    }
                    Some(AppEvent::ReviewChanged(snapshot)) => {
                        let text = session
                            .as_ref()
                            .map(|s| s.document().text())
                            .unwrap_or_default();
                        state.apply_snapshot(*snapshot, text);
                    }
                    Some(AppEvent::Quit) | None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    // Stop the generator and settle a review that is still open.
    cancel.cancel();
    drop(job_tx);
    if let Some(session) = session.as_mut() {
        session.cancel();
    }

    guard.restore().context("restoring the terminal")?;
    if let Some(e) = draw_error {
        return Err(e).context("drawing the terminal");
    }

    match result {
        Some(outcome) => report(&target, outcome),
        None if state.screen_mode() == Mode::Failed => {
            let reason = state.status.unwrap_or_else(|| "review failed".to_owned());
            bail!(reason)
        }
        None => report(&target, None),
    }
}
