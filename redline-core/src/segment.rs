//! Segmenter: turns an original/modified text pair into typed segments.
//!
//! The base comparison is a line-level Myers diff from `similar`. A run of
//! removed lines directly followed by added lines becomes a single `Replace`
//! so that a rewritten paragraph is reviewed as one unit. At
//! [`Granularity::Word`] each replace hunk is then narrowed to the words that
//! actually changed, with the shared prefix and suffix turned into context.

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::config::Granularity;
use crate::types::{Segment, SegmentKind};

/// Segments `original` against `modified` at the default granularity.
pub fn segment(original: &str, modified: &str) -> Vec<Segment> {
    segment_with(original, modified, Granularity::default())
}

/// Segments `original` against `modified`.
///
/// The result is in document order and covers both texts exactly: joining
/// every `original` yields `original`, joining every `modified` yields
/// `modified`. Identical inputs produce exactly one context segment, even
/// when both are empty.
pub fn segment_with(original: &str, modified: &str, granularity: Granularity) -> Vec<Segment> {
    if original == modified {
        return vec![Segment::context(original)];
    }
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(original, modified);

    let mut hunks = HunkBuilder::default();
    for change in diff.iter_all_changes() {
        let line = change.value();
        match change.tag() {
            ChangeTag::Equal => hunks.context(line),
            ChangeTag::Delete => hunks.removed(line),
            ChangeTag::Insert => hunks.added(line),
        }
    }
    let segments = hunks.finish();

    match granularity {
        Granularity::Line => segments,
        Granularity::Word => refine(segments),
    }
}

/// Accumulates diff lines into context runs and pending removed/added runs.
#[derive(Default)]
struct HunkBuilder {
    out: Vec<Segment>,
    context: String,
    removed: String,
    added: String,
}

impl HunkBuilder {
    fn context(&mut self, line: &str) {
        self.flush_change();
        self.context.push_str(line);
    }

    fn removed(&mut self, line: &str) {
        self.flush_context();
        // A removal after additions starts a new hunk.
        if !self.added.is_empty() {
            self.flush_change();
        }
        self.removed.push_str(line);
    }

    fn added(&mut self, line: &str) {
        self.flush_context();
        self.added.push_str(line);
    }

    fn flush_context(&mut self) {
        if !self.context.is_empty() {
            self.out.push(Segment::context(std::mem::take(&mut self.context)));
        }
    }

    fn flush_change(&mut self) {
        let removed = std::mem::take(&mut self.removed);
        let added = std::mem::take(&mut self.added);
        if let Some(segment) = Segment::from_sides(removed, added) {
            self.out.push(segment);
        }
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush_change();
        self.flush_context();
        self.out
    }
}

/// Narrows every replace hunk and re-merges the context around it.
fn refine(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.kind == SegmentKind::Replace {
            for piece in narrow(&segment.original, &segment.modified) {
                push_merged(&mut out, piece);
            }
        } else {
            push_merged(&mut out, segment);
        }
    }
    out
}

fn push_merged(out: &mut Vec<Segment>, segment: Segment) {
    if segment.kind == SegmentKind::Context {
        if let Some(last) = out.last_mut().filter(|s| s.kind == SegmentKind::Context) {
            last.original.push_str(&segment.original);
            last.modified.push_str(&segment.modified);
            return;
        }
    }
    out.push(segment);
}

/// Splits one replace hunk into `[context] core [context]`.
///
/// The common suffix is peeled first, then the common prefix of what
/// remains; both are shortened until they sit on a word boundary.
fn narrow(original: &str, modified: &str) -> Vec<Segment> {
    let old: Vec<char> = original.chars().collect();
    let new: Vec<char> = modified.chars().collect();

    let mut suffix = old.iter().rev().zip(new.iter().rev()).take_while(|(a, b)| a == b).count();
    while suffix > 0 && !suffix_at_boundary(&old, &new, suffix) {
        suffix -= 1;
    }
    let old_rest = &old[..old.len() - suffix];
    let new_rest = &new[..new.len() - suffix];

    let mut prefix = old_rest.iter().zip(new_rest).take_while(|(a, b)| a == b).count();
    while prefix > 0 && !prefix_at_boundary(old_rest, new_rest, prefix) {
        prefix -= 1;
    }

    let text = |chars: &[char]| chars.iter().collect::<String>();
    let mut pieces = Vec::with_capacity(3);
    if prefix > 0 {
        pieces.push(Segment::context(text(&old_rest[..prefix])));
    }
    if let Some(core) = Segment::from_sides(text(&old_rest[prefix..]), text(&new_rest[prefix..])) {
        pieces.push(core);
    }
    if suffix > 0 {
        pieces.push(Segment::context(text(&old[old.len() - suffix..])));
    }
    pieces
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True if the last `n` chars of both texts start on a word boundary.
fn suffix_at_boundary(old: &[char], new: &[char], n: usize) -> bool {
    if !is_word(old[old.len() - n]) {
        return true;
    }
    let clear_before = |s: &[char]| s.len() == n || !is_word(s[s.len() - n - 1]);
    clear_before(old) && clear_before(new)
}

/// True if the first `n` chars of both texts end on a word boundary.
fn prefix_at_boundary(old: &[char], new: &[char], n: usize) -> bool {
    if !is_word(old[n - 1]) {
        return true;
    }
    let clear_after = |s: &[char]| s.len() == n || !is_word(s[n]);
    clear_after(old) && clear_after(new)
}
