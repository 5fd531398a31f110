//! Suggestion session: live review state over a mutable document.
//!
//! A [`Session`] owns the document under review, the live suggestions, and
//! an optional rename proposal. Every operation is synchronous; after each
//! one the render adapter is told the new state and the resolution check
//! runs. Once the last suggestion and the title are decided the registered
//! resolver fires exactly once and the session becomes inert.
//!
//! Suggestion ranges are remapped through every document change, including
//! the session's own accepted edits. A suggestion whose range cannot be
//! remapped cleanly is dropped rather than repaired.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ReviewConfig;
use crate::document::{Bias, ChangeSet, Document, Replacement};
use crate::error::{DocumentError, ReviewError};
use crate::render::{Intent, RenderAdapter, ReviewView};
use crate::suggest::build_with;
use crate::title::TitleProposal;
use crate::types::{Outcome, Suggestion, SuggestionId};

/// Callback receiving the final outcome, or `None` for a cancelled review.
pub type Resolver = Box<dyn FnOnce(Option<Outcome>) + Send>;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Suggestions or a title are still pending, or no resolver has fired yet.
    Open,
    /// The resolver has fired; every further operation is a no-op.
    Resolved,
}

/// What happened to a single-suggestion operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The suggested text was written to the document.
    Accepted,
    /// An accept failed validation and was treated as a reject.
    Downgraded,
    Rejected,
    /// No live suggestion has this id.
    Unknown,
    /// The session is already resolved.
    Inactive,
}

/// Live review state for one interaction.
pub struct Session<D> {
    id: Uuid,
    document: D,
    suggestions: Vec<Suggestion>,
    proposed_title: Option<String>,
    current_title: Option<String>,
    accepted_title: Option<String>,
    resolver: Option<Resolver>,
    renderer: Option<Box<dyn RenderAdapter + Send>>,
    phase: Phase,
}

impl<D: Document> Session<D> {
    /// Creates an open session over `document`.
    ///
    /// Suggestions that do not describe the current document (out of bounds,
    /// or covering different text) and suggestions overlapping an earlier one
    /// are discarded. A title proposal that would not change anything is
    /// ignored.
    pub fn new(document: D, suggestions: Vec<Suggestion>, title: Option<TitleProposal>) -> Self {
        let (current_title, proposed_title) = match title {
            Some(t) if t.is_actionable() => (t.current, Some(t.proposed.trim().to_owned())),
            Some(t) => (t.current, None),
            None => (None, None),
        };
        let mut session = Self {
            id: Uuid::new_v4(),
            document,
            suggestions: Vec::with_capacity(suggestions.len()),
            proposed_title,
            current_title,
            accepted_title: None,
            resolver: None,
            renderer: None,
            phase: Phase::Open,
        };
        for suggestion in suggestions {
            if !session.is_applicable(&suggestion)
                || session.suggestions.iter().any(|s| s.overlaps(&suggestion))
            {
                debug!(
                    session = %session.id,
                    id = %suggestion.id,
                    "discarding unusable suggestion"
                );
                continue;
            }
            session.suggestions.push(suggestion);
        }
        session
    }

    /// Registers the callback fired on resolution.
    ///
    /// If nothing is pending the callback fires immediately.
    pub fn on_resolve(&mut self, resolver: impl FnOnce(Option<Outcome>) + Send + 'static) {
        if self.phase == Phase::Resolved {
            return;
        }
        self.resolver = Some(Box::new(resolver));
        self.settle();
    }

    /// Attaches the render adapter and paints the current state.
    pub fn set_renderer(&mut self, renderer: Box<dyn RenderAdapter + Send>) {
        self.renderer = Some(renderer);
        self.notify();
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_resolved(&self) -> bool {
        self.phase == Phase::Resolved
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Live suggestions in stable order.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn suggestion(&self, id: &SuggestionId) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| &s.id == id)
    }

    pub fn proposed_title(&self) -> Option<&str> {
        self.proposed_title.as_deref()
    }

    pub fn current_title(&self) -> Option<&str> {
        self.current_title.as_deref()
    }

    /// Title accepted so far, if any.
    pub fn accepted_title(&self) -> Option<&str> {
        self.accepted_title.as_deref()
    }

    /// Routes a user intent from the review surface.
    pub fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::Accept(id) => {
                self.accept_one(&id);
            }
            Intent::Reject(id) => {
                self.reject_one(&id);
            }
            Intent::AcceptAll => {
                self.accept_all();
            }
            Intent::RejectAll => self.reject_all(),
            Intent::AcceptTitle => {
                self.accept_title();
            }
            Intent::RejectTitle => self.reject_title(),
            Intent::Cancel => self.cancel(),
        }
    }

    /// Writes one suggestion into the document.
    ///
    /// A suggestion whose range is no longer valid, or whose covered text no
    /// longer matches, is rejected instead. Remaining suggestions are
    /// remapped through the applied edit.
    pub fn accept_one(&mut self, id: &SuggestionId) -> Disposition {
        if self.is_resolved() {
            return Disposition::Inactive;
        }
        let Some(index) = self.suggestions.iter().position(|s| &s.id == id) else {
            return Disposition::Unknown;
        };
        let suggestion = self.suggestions.remove(index);

        let disposition = if !self.is_applicable(&suggestion) {
            warn!(session = %self.id, %id, "suggestion no longer matches the document; rejecting");
            Disposition::Downgraded
        } else {
            match self.document.replace_range(
                suggestion.from,
                suggestion.to,
                &suggestion.suggested_text,
            ) {
                Ok(change) => {
                    debug!(
                        session = %self.id,
                        %id,
                        from = suggestion.from,
                        to = suggestion.to,
                        "accepted"
                    );
                    self.remap(&change);
                    Disposition::Accepted
                }
                Err(err) => {
                    warn!(session = %self.id, %id, %err, "document refused edit; rejecting");
                    Disposition::Downgraded
                }
            }
        };
        self.finish();
        disposition
    }

    /// Withdraws one suggestion without touching the document.
    pub fn reject_one(&mut self, id: &SuggestionId) -> Disposition {
        if self.is_resolved() {
            return Disposition::Inactive;
        }
        let Some(index) = self.suggestions.iter().position(|s| &s.id == id) else {
            return Disposition::Unknown;
        };
        self.suggestions.remove(index);
        debug!(session = %self.id, %id, "rejected");
        self.finish();
        Disposition::Rejected
    }

    /// Applies every valid suggestion as one combined edit.
    ///
    /// Invalid suggestions are dropped. A pending title is accepted too.
    /// Returns the number of suggestions written.
    pub fn accept_all(&mut self) -> usize {
        if self.is_resolved() {
            return 0;
        }
        let pending = std::mem::take(&mut self.suggestions);
        let mut kept: Vec<Suggestion> = Vec::with_capacity(pending.len());
        for suggestion in pending {
            if !self.is_applicable(&suggestion) || kept.iter().any(|k| k.overlaps(&suggestion)) {
                debug!(
                    session = %self.id,
                    id = %suggestion.id,
                    "dropping invalid suggestion from bulk accept"
                );
                continue;
            }
            kept.push(suggestion);
        }
        kept.sort_by(|a, b| b.from.cmp(&a.from));

        let replacements: Vec<Replacement> = kept
            .iter()
            .map(|s| Replacement::new(s.from, s.to, s.suggested_text.as_str()))
            .collect();
        let applied = if replacements.is_empty() {
            0
        } else {
            match self.document.replace_ranges(&replacements) {
                Ok(_) => replacements.len(),
                Err(err) => {
                    warn!(
                        session = %self.id,
                        %err,
                        "bulk accept refused by document; rejecting all"
                    );
                    0
                }
            }
        };
        if let Some(title) = self.proposed_title.take() {
            self.accepted_title = Some(title);
        }
        info!(session = %self.id, applied, "accepted all suggestions");
        self.finish();
        applied
    }

    /// Dismisses the review surface: withdraws every suggestion, discards a
    /// pending title, and resolves with `None`.
    ///
    /// Edits already accepted stay in the document.
    pub fn reject_all(&mut self) {
        self.dismiss("rejected all suggestions");
    }

    /// Accepts the pending rename. Returns `false` if none was pending.
    pub fn accept_title(&mut self) -> bool {
        if self.is_resolved() {
            return false;
        }
        let accepted = match self.proposed_title.take() {
            Some(title) => {
                self.accepted_title = Some(title);
                true
            }
            None => false,
        };
        self.finish();
        accepted
    }

    pub fn reject_title(&mut self) {
        if self.is_resolved() {
            return;
        }
        self.proposed_title = None;
        self.finish();
    }

    /// Dismisses the review: resolves with `None` and leaves the document as is.
    pub fn cancel(&mut self) {
        self.dismiss("review cancelled");
    }

    /// Remaps live suggestions through a change already applied to the document.
    ///
    /// Suggestions whose endpoints fall inside deleted text, leave the
    /// document, invert, or no longer cover their original text are dropped.
    pub fn on_document_changed(&mut self, change: &ChangeSet) {
        if self.is_resolved() {
            return;
        }
        self.remap(change);
        self.finish();
    }

    /// Applies a concurrent edit to the owned document and remaps suggestions.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the document rejects the change; nothing
    /// is remapped in that case.
    pub fn apply_edit(&mut self, change: &ChangeSet) -> Result<(), DocumentError> {
        if self.is_resolved() {
            return Ok(());
        }
        self.document.apply(change)?;
        self.on_document_changed(change);
        Ok(())
    }

    /// Replaces `[from, to)` on behalf of the user, outside any suggestion flow.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] for a range the document cannot take.
    pub fn edit(&mut self, from: usize, to: usize, text: &str) -> Result<(), DocumentError> {
        let replacement = Replacement::new(from, to, text);
        let change = ChangeSet::from_replacements(self.document.len_chars(), &[replacement])?;
        self.apply_edit(&change)
    }

    fn is_applicable(&self, suggestion: &Suggestion) -> bool {
        suggestion.fits(self.document.len_chars())
            && self.document.slice(suggestion.from, suggestion.to).as_deref()
                == Some(suggestion.original_text.as_str())
    }

    // Non-empty ranges grow to the right: `from` follows text inserted at it
    // while `to` stays put. Empty ranges stay ahead of text inserted at them.
    fn remap(&mut self, change: &ChangeSet) {
        let len = self.document.len_chars();
        let document = &self.document;
        let session = self.id;
        self.suggestions.retain_mut(|s| {
            let mapped = if s.from == s.to {
                change.map_pos(s.from, Bias::Left).map(|p| (p, p))
            } else {
                change.map_pos(s.from, Bias::Right).zip(change.map_pos(s.to, Bias::Left))
            };
            match mapped {
                Some((from, to))
                    if from <= to
                        && to <= len
                        && document.slice(from, to).as_deref() == Some(s.original_text.as_str()) =>
                {
                    s.from = from;
                    s.to = to;
                    true
                }
                _ => {
                    debug!(
                        %session,
                        id = %s.id,
                        "dropping suggestion invalidated by document change"
                    );
                    false
                }
            }
        });
    }

    fn dismiss(&mut self, reason: &'static str) {
        if self.is_resolved() {
            return;
        }
        self.phase = Phase::Resolved;
        self.suggestions.clear();
        self.proposed_title = None;
        self.notify();
        info!(session = %self.id, reason, "review dismissed");
        if let Some(resolve) = self.resolver.take() {
            resolve(None);
        }
    }

    fn notify(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&ReviewView {
                suggestions: &self.suggestions,
                proposed_title: self.proposed_title.as_deref(),
                current_title: self.current_title.as_deref(),
            });
        }
    }

    fn finish(&mut self) {
        self.notify();
        self.settle();
    }

    /// Resolution check: fires the resolver once nothing is pending.
    fn settle(&mut self) {
        if self.is_resolved() || !self.suggestions.is_empty() || self.proposed_title.is_some() {
            return;
        }
        if let Some(resolve) = self.resolver.take() {
            self.phase = Phase::Resolved;
            let outcome = Outcome {
                text: self.document.text(),
                rename_to: self.accepted_title.clone(),
            };
            info!(session = %self.id, renamed = outcome.rename_to.is_some(), "review resolved");
            resolve(Some(outcome));
        }
    }
}

/// The awaitable result of [`begin_review`].
///
/// Yields `None` when the review is cancelled or the session is dropped
/// before resolving.
#[derive(Debug)]
pub struct PendingOutcome {
    rx: oneshot::Receiver<Option<Outcome>>,
}

impl PendingOutcome {
    /// Returns the outcome if the session has already resolved.
    pub fn try_take(&mut self) -> Option<Option<Outcome>> {
        use tokio::sync::oneshot::error::TryRecvError;
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(None),
        }
    }
}

impl Future for PendingOutcome {
    type Output = Option<Outcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| received.ok().flatten())
    }
}

/// Starts a review of `original` (occupying `[range_start, range_end)` of
/// `document`) against the generator's `modified` text.
///
/// # Errors
///
/// Returns [`ReviewError`] if the configuration is invalid, the range is
/// inverted or out of bounds, or the document text in the range is not
/// `original`. No session exists in that case.
pub fn begin_review<D: Document>(
    document: D,
    original: &str,
    modified: &str,
    range_start: usize,
    range_end: usize,
    title: Option<TitleProposal>,
    config: &ReviewConfig,
) -> Result<(Session<D>, PendingOutcome), ReviewError> {
    config.validate()?;
    if range_start > range_end {
        return Err(ReviewError::InvertedRange {
            start: range_start,
            end: range_end,
        });
    }
    let len = document.len_chars();
    if range_end > len {
        return Err(ReviewError::RangeOutOfBounds {
            start: range_start,
            end: range_end,
            len,
        });
    }
    if document.slice(range_start, range_end).as_deref() != Some(original) {
        return Err(ReviewError::OriginalMismatch {
            start: range_start,
            end: range_end,
        });
    }

    let suggestions = build_with(original, modified, range_start, range_end, config.granularity);
    let mut session = Session::new(document, suggestions, title);
    info!(
        session = %session.id(),
        suggestions = session.suggestions().len(),
        title = session.proposed_title().is_some(),
        "review started"
    );

    let (tx, rx) = oneshot::channel();
    session.on_resolve(move |outcome| {
        let _ = tx.send(outcome);
    });
    Ok((session, PendingOutcome { rx }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;
    use std::sync::{Arc, Mutex};

    fn counting_session(
        text: &str,
        suggestions: Vec<Suggestion>,
    ) -> (Session<TextDocument>, Arc<Mutex<Vec<Option<Outcome>>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut session = Session::new(TextDocument::new(text), suggestions, None);
        let sink = Arc::clone(&fired);
        session.on_resolve(move |outcome| sink.lock().unwrap().push(outcome));
        (session, fired)
    }

    fn suggestion(id: &str, from: usize, to: usize, original: &str, suggested: &str) -> Suggestion {
        Suggestion {
            id: id.into(),
            from,
            to,
            original_text: original.into(),
            suggested_text: suggested.into(),
        }
    }

    #[test]
    fn mismatched_suggestions_are_discarded_up_front() {
        let session = Session::new(
            TextDocument::new("hello"),
            vec![
                suggestion("a", 0, 5, "hello", "hi"),
                suggestion("b", 0, 5, "jello", "hi"),
                suggestion("c", 2, 9, "llo", "x"),
            ],
            None,
        );
        let ids: Vec<&str> = session.suggestions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn empty_session_resolves_on_registration() {
        let (session, fired) = counting_session("text", Vec::new());
        assert!(session.is_resolved());
        assert_eq!(
            *fired.lock().unwrap(),
            vec![Some(Outcome { text: "text".into(), rename_to: None })]
        );
    }

    #[test]
    fn retyping_inside_a_suggestion_drops_it() {
        let (mut session, fired) =
            counting_session("hello world", vec![suggestion("s1", 6, 11, "world", "earth")]);
        // Endpoints survive the edit but the covered text no longer matches.
        session.edit(7, 8, "0").unwrap();
        assert!(session.suggestions().is_empty());
        assert_eq!(session.document().text(), "hello w0rld");
        assert_eq!(fired.lock().unwrap().len(), 1);
    }

    #[test]
    fn operations_after_resolution_are_inert() {
        let (mut session, fired) =
            counting_session("abc", vec![suggestion("s1", 0, 1, "a", "A")]);
        assert_eq!(session.reject_one(&"s1".into()), Disposition::Rejected);
        assert!(session.is_resolved());
        assert_eq!(session.accept_one(&"s1".into()), Disposition::Inactive);
        assert_eq!(session.accept_all(), 0);
        session.reject_all();
        session.cancel();
        assert!(session.edit(0, 0, "x").is_ok());
        assert_eq!(session.document().text(), "abc");
        assert_eq!(fired.lock().unwrap().len(), 1);
    }

    #[test]
    fn cancel_resolves_with_none() {
        let (mut session, fired) =
            counting_session("abc", vec![suggestion("s1", 0, 1, "a", "A")]);
        session.cancel();
        session.cancel();
        assert_eq!(*fired.lock().unwrap(), vec![None]);
        assert_eq!(session.document().text(), "abc");
    }

    #[test]
    fn reject_all_keeps_accepted_edits_and_resolves_with_none() {
        let (mut session, fired) = counting_session(
            "ab cd",
            vec![suggestion("s1", 0, 2, "ab", "AB"), suggestion("s2", 3, 5, "cd", "CD")],
        );
        assert_eq!(session.accept_one(&"s1".into()), Disposition::Accepted);
        session.reject_all();
        session.reject_all();
        assert!(session.is_resolved());
        assert!(session.suggestions().is_empty());
        assert_eq!(session.document().text(), "AB cd");
        assert_eq!(*fired.lock().unwrap(), vec![None]);
    }

    #[test]
    fn unknown_id_is_reported() {
        let (mut session, _) = counting_session("abc", vec![suggestion("s1", 0, 1, "a", "A")]);
        assert_eq!(session.accept_one(&"nope".into()), Disposition::Unknown);
        assert_eq!(session.suggestions().len(), 1);
    }

    #[test]
    fn accepting_before_an_insertion_keeps_it_in_front_of_the_neighbour() {
        let (mut session, _) = counting_session(
            "ab cd",
            vec![suggestion("ins", 3, 3, "", "X "), suggestion("rep", 3, 5, "cd", "CD")],
        );
        assert_eq!(session.accept_one(&"rep".into()), Disposition::Accepted);
        let ins = session.suggestion(&"ins".into()).unwrap();
        assert_eq!((ins.from, ins.to), (3, 3));
        assert_eq!(session.accept_one(&"ins".into()), Disposition::Accepted);
        assert_eq!(session.document().text(), "ab X CD");
    }

    #[test]
    fn title_is_shown_once() {
        let mut session = Session::new(
            TextDocument::new("x"),
            Vec::new(),
            Some(TitleProposal::new(Some("Old".into()), "New")),
        );
        assert_eq!(session.proposed_title(), Some("New"));
        assert_eq!(session.current_title(), Some("Old"));
        assert!(session.accept_title());
        assert_eq!(session.proposed_title(), None);
        assert!(!session.accept_title());
        assert_eq!(session.accepted_title(), Some("New"));
    }
}
