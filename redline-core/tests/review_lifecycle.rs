//! Integration tests for the review lifecycle.
//!
//! Exercises: begin_review, accept_one, reject_one, accept_all, reject_all,
//! title decisions, concurrent and stale edits, cancellation, and the
//! awaited outcome.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use redline_core::{
    begin_review, ChangeSet, Disposition, Document, DocumentError, Granularity, Intent, Outcome,
    RenderAdapter, ReviewConfig, ReviewError, ReviewView, Session, Suggestion, SuggestionId,
    TextDocument, TitleProposal,
};

const THREE_LINES: &str = "alpha\nbeta\ngamma\n";
const THREE_LINES_REWRITE: &str = "ALPHA\nbeta\nGAMMA\n";

fn id(s: &str) -> SuggestionId {
    SuggestionId::from(s)
}

fn review_all(
    original: &str,
    modified: &str,
) -> (Session<TextDocument>, redline_core::PendingOutcome) {
    let len = original.chars().count();
    begin_review(
        TextDocument::new(original),
        original,
        modified,
        0,
        len,
        None,
        &ReviewConfig::default(),
    )
    .unwrap()
}

#[derive(Clone, Default)]
struct Recorder {
    frames: Arc<Mutex<Vec<Vec<(usize, usize)>>>>,
}

impl RenderAdapter for Recorder {
    fn render(&mut self, view: &ReviewView<'_>) {
        let ranges = view.suggestions.iter().map(|s| (s.from, s.to)).collect();
        self.frames.lock().unwrap().push(ranges);
    }
}

/// A buffer another party can edit without going through the session.
#[derive(Clone)]
struct SharedDocument {
    inner: Arc<Mutex<TextDocument>>,
}

impl SharedDocument {
    fn new(text: &str) -> Self {
        Self { inner: Arc::new(Mutex::new(TextDocument::new(text))) }
    }

    fn edit_behind(&self, from: usize, to: usize, text: &str) {
        self.inner.lock().unwrap().replace_range(from, to, text).unwrap();
    }
}

impl Document for SharedDocument {
    fn len_chars(&self) -> usize {
        self.inner.lock().unwrap().len_chars()
    }

    fn text(&self) -> String {
        self.inner.lock().unwrap().text()
    }

    fn slice(&self, from: usize, to: usize) -> Option<String> {
        self.inner.lock().unwrap().slice(from, to)
    }

    fn apply(&mut self, changes: &ChangeSet) -> Result<(), DocumentError> {
        self.inner.lock().unwrap().apply(changes)
    }
}

/// "hello world" with one suggestion per word, the second gone stale.
fn stale_review() -> (Session<SharedDocument>, Arc<Mutex<Vec<Option<Outcome>>>>) {
    let shared = SharedDocument::new("hello world");
    let suggestion = |name: &str, from, to, original: &str, suggested: &str| Suggestion {
        id: id(name),
        from,
        to,
        original_text: original.into(),
        suggested_text: suggested.into(),
    };
    let mut session = Session::new(
        shared.clone(),
        vec![
            suggestion("hello", 0, 5, "hello", "howdy"),
            suggestion("world", 6, 11, "world", "earth"),
        ],
        None,
    );
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    session.on_resolve(move |outcome| sink.lock().unwrap().push(outcome));

    shared.edit_behind(6, 11, "there");
    (session, fired)
}

#[test]
fn accepting_a_stale_suggestion_degrades_to_reject() {
    let (mut session, fired) = stale_review();

    assert_eq!(session.accept_one(&id("world")), Disposition::Downgraded);
    assert_eq!(session.document().text(), "hello there");
    assert!(session.suggestion(&id("world")).is_none());
    assert!(fired.lock().unwrap().is_empty());

    assert_eq!(session.accept_one(&id("hello")), Disposition::Accepted);
    assert_eq!(
        *fired.lock().unwrap(),
        vec![Some(Outcome { text: "howdy there".into(), rename_to: None })]
    );
}

#[test]
fn accept_all_skips_stale_suggestions() {
    let (mut session, fired) = stale_review();

    assert_eq!(session.accept_all(), 1);
    assert_eq!(session.document().text(), "howdy there");
    session.accept_all();
    assert_eq!(
        *fired.lock().unwrap(),
        vec![Some(Outcome { text: "howdy there".into(), rename_to: None })]
    );
}

#[tokio::test]
async fn accepting_a_replacement_resolves_with_new_text() {
    let (mut session, outcome) = review_all("hello world", "hello big earth");
    let suggestions = session.suggestions().to_vec();
    assert_eq!(suggestions.len(), 1);
    assert_eq!((suggestions[0].from, suggestions[0].to), (6, 11));
    assert_eq!(suggestions[0].suggested_text, "big earth");

    assert_eq!(session.accept_one(&suggestions[0].id), Disposition::Accepted);
    assert_eq!(session.document().len_chars(), 15);
    assert!(session.suggestions().is_empty());
    assert!(session.is_resolved());

    assert_eq!(
        outcome.await,
        Some(Outcome { text: "hello big earth".into(), rename_to: None })
    );
}

#[tokio::test]
async fn partial_acceptance_waits_for_every_decision() {
    let (mut session, mut outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    let ranges: Vec<(usize, usize)> =
        session.suggestions().iter().map(|s| (s.from, s.to)).collect();
    assert_eq!(ranges, vec![(0, 5), (11, 16)]);

    assert_eq!(session.reject_one(&id("s1")), Disposition::Rejected);
    assert!(outcome.try_take().is_none(), "one suggestion is still pending");

    assert_eq!(session.accept_one(&id("s2")), Disposition::Accepted);
    assert_eq!(
        outcome.await,
        Some(Outcome { text: "alpha\nbeta\nGAMMA\n".into(), rename_to: None })
    );
}

#[tokio::test]
async fn unrelated_edit_shifts_suggestions() {
    let (mut session, outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    session.edit(0, 0, "intro\n").unwrap();

    let ranges: Vec<(usize, usize)> =
        session.suggestions().iter().map(|s| (s.from, s.to)).collect();
    assert_eq!(ranges, vec![(6, 11), (17, 22)]);

    assert_eq!(session.accept_one(&id("s2")), Disposition::Accepted);
    assert_eq!(session.document().text(), "intro\nalpha\nbeta\nGAMMA\n");
    session.reject_one(&id("s1"));

    assert_eq!(outcome.await.map(|o| o.text).as_deref(), Some("intro\nalpha\nbeta\nGAMMA\n"));
}

#[test]
fn edit_overlapping_a_suggestion_drops_only_that_one() {
    let (mut session, _outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    // Deletes "pha\nbe", cutting into the first suggestion.
    session.edit(2, 8, "").unwrap();

    let remaining: Vec<(&str, usize, usize)> = session
        .suggestions()
        .iter()
        .map(|s| (s.id.as_str(), s.from, s.to))
        .collect();
    assert_eq!(remaining, vec![("s2", 5, 10)]);
    assert_eq!(session.document().slice(5, 10).as_deref(), Some("gamma"));
}

#[test]
fn rejecting_twice_equals_rejecting_once() {
    let (mut session, _outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    assert_eq!(session.reject_one(&id("s1")), Disposition::Rejected);
    let after_first = session.suggestions().to_vec();
    assert_eq!(session.reject_one(&id("s1")), Disposition::Unknown);
    assert_eq!(session.suggestions(), after_first.as_slice());
    assert_eq!(session.document().text(), THREE_LINES);
}

#[test]
fn resolver_fires_exactly_once() {
    let fired = Arc::new(AtomicUsize::new(0));
    let suggestions = redline_core::suggest::build(THREE_LINES, THREE_LINES_REWRITE, 0, 17);
    let mut session = Session::new(TextDocument::new(THREE_LINES), suggestions, None);
    let counter = Arc::clone(&fired);
    session.on_resolve(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    session.accept_all();
    session.accept_all();
    session.reject_all();
    session.cancel();
    session.dispatch(Intent::Accept(id("s1")));

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(session.document().text(), THREE_LINES_REWRITE);
}

#[tokio::test]
async fn accept_all_applies_everything_in_one_edit() {
    let original = "one two three four";
    let modified = "one 2 three 4";
    let config = ReviewConfig { granularity: Granularity::Word, ..Default::default() };
    let (mut session, outcome) =
        begin_review(TextDocument::new(original), original, modified, 0, 18, None, &config)
            .unwrap();
    let pending = session.suggestions().len();
    assert!(pending > 0);
    assert_eq!(session.accept_all(), pending);
    assert_eq!(outcome.await.map(|o| o.text).as_deref(), Some(modified));
}

#[tokio::test]
async fn reject_all_dismisses_with_none() {
    let (mut session, outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    session.accept_one(&id("s1"));
    session.dispatch(Intent::RejectAll);
    assert!(session.is_resolved());
    assert!(session.suggestions().is_empty());
    assert_eq!(outcome.await, None);
    assert_eq!(session.document().text(), "ALPHA\nbeta\ngamma\n");
}

#[tokio::test]
async fn cancel_resolves_with_none() {
    let (mut session, outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    session.accept_one(&id("s1"));
    session.dispatch(Intent::Cancel);
    assert_eq!(outcome.await, None);
    assert_eq!(session.document().text(), "ALPHA\nbeta\ngamma\n");
}

#[tokio::test]
async fn dropping_an_open_session_yields_none() {
    let (session, outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    drop(session);
    assert_eq!(outcome.await, None);
}

#[tokio::test]
async fn identical_texts_resolve_immediately() {
    let (session, outcome) = review_all("same\n", "same\n");
    assert!(session.is_resolved());
    assert_eq!(outcome.await, Some(Outcome { text: "same\n".into(), rename_to: None }));
}

#[tokio::test]
async fn heading_rewrite_offers_body_edit_and_rename() {
    let original = "# Old Title\nBody text";
    let modified = "# New Title\nBody text";
    let title = TitleProposal::from_headings(None, original, modified);
    let (mut session, outcome) = begin_review(
        TextDocument::new(original),
        original,
        modified,
        0,
        21,
        title,
        &ReviewConfig::default(),
    )
    .unwrap();

    assert_eq!(session.suggestions().len(), 1);
    assert_eq!(session.proposed_title(), Some("New Title"));
    assert_eq!(session.current_title(), Some("Old Title"));

    session.accept_one(&id("s1"));
    assert!(!session.is_resolved(), "title is still pending");
    session.dispatch(Intent::AcceptTitle);

    assert_eq!(
        outcome.await,
        Some(Outcome { text: modified.into(), rename_to: Some("New Title".into()) })
    );
}

#[tokio::test]
async fn rejected_title_is_not_renamed() {
    let (mut session, outcome) = begin_review(
        TextDocument::new("body"),
        "body",
        "body",
        0,
        4,
        Some(TitleProposal::new(Some("Draft".into()), "Final")),
        &ReviewConfig::default(),
    )
    .unwrap();
    assert!(!session.is_resolved());
    session.reject_title();
    assert_eq!(outcome.await, Some(Outcome { text: "body".into(), rename_to: None }));
}

#[test]
fn renderer_sees_every_state_change() {
    let (mut session, _outcome) = review_all(THREE_LINES, THREE_LINES_REWRITE);
    let recorder = Recorder::default();
    session.set_renderer(Box::new(recorder.clone()));
    session.reject_one(&id("s1"));
    session.accept_one(&id("s2"));

    let frames = recorder.frames.lock().unwrap();
    assert_eq!(*frames, vec![vec![(0, 5), (11, 16)], vec![(11, 16)], vec![]]);
}

#[test]
fn review_range_inside_a_larger_document() {
    let document = TextDocument::new("# Notes\nalpha\nbeta\ngamma\n-- end");
    let (start, end) = document.line_range(2, 4).unwrap();
    let original = document.slice(start, end).unwrap();
    assert_eq!(original, THREE_LINES);

    let (mut session, _outcome) = begin_review(
        document,
        &original,
        THREE_LINES_REWRITE,
        start,
        end,
        None,
        &ReviewConfig::default(),
    )
    .unwrap();
    session.accept_all();
    assert_eq!(session.document().text(), "# Notes\nALPHA\nbeta\nGAMMA\n-- end");
}

#[test]
fn setup_failures_create_no_session() {
    let config = ReviewConfig::default();
    let doc = || TextDocument::new("abcdef");

    assert!(matches!(
        begin_review(doc(), "cd", "xy", 4, 2, None, &config),
        Err(ReviewError::InvertedRange { start: 4, end: 2 })
    ));
    assert!(matches!(
        begin_review(doc(), "ef", "xy", 4, 9, None, &config),
        Err(ReviewError::RangeOutOfBounds { len: 6, .. })
    ));
    assert!(matches!(
        begin_review(doc(), "zz", "xy", 2, 4, None, &config),
        Err(ReviewError::OriginalMismatch { start: 2, end: 4 })
    ));

    let blank = ReviewConfig { custom_prompt: Some(" ".into()), ..Default::default() };
    assert!(matches!(
        begin_review(doc(), "cd", "xy", 2, 4, None, &blank),
        Err(ReviewError::Config(_))
    ));
}
