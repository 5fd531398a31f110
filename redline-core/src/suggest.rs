//! Suggestion builder: binds segments to absolute document positions.

use tracing::debug;

use crate::config::Granularity;
use crate::segment::segment_with;
use crate::types::{Suggestion, SuggestionId};

/// Builds suggestions for `original` (occupying `[range_start, range_end]` of
/// the document) rewritten as `modified`, at the default granularity.
pub fn build(
    original: &str,
    modified: &str,
    range_start: usize,
    range_end: usize,
) -> Vec<Suggestion> {
    build_with(original, modified, range_start, range_end, Granularity::default())
}

/// Builds suggestions at an explicit granularity.
///
/// A cursor starts at `range_start` and advances by the char length of each
/// segment's original text. Every changed segment becomes a suggestion over
/// the cursor span it was met at, as long as that span stays inside
/// `[range_start, range_end]`; spans outside are dropped, which protects
/// against a range that does not exactly match `original`. No-op suggestions
/// are filtered out. Ids are `s1`, `s2`, … in document order.
///
/// The returned ranges are pairwise disjoint and sorted by `from`.
pub fn build_with(
    original: &str,
    modified: &str,
    range_start: usize,
    range_end: usize,
    granularity: Granularity,
) -> Vec<Suggestion> {
    debug_assert!(range_start <= range_end);

    let mut suggestions = Vec::new();
    let mut cursor = range_start;
    let mut next_id = 0;

    for segment in segment_with(original, modified, granularity) {
        let from = cursor;
        let to = cursor + segment.original_len();
        cursor = to;

        if !segment.is_change() {
            continue;
        }
        if from < range_start || to > range_end {
            debug!(from, to, range_start, range_end, "dropping segment outside review range");
            continue;
        }
        next_id += 1;
        suggestions.push(Suggestion {
            id: SuggestionId::nth(next_id),
            from,
            to,
            original_text: segment.original,
            suggested_text: segment.modified,
        });
    }

    suggestions.retain(|s| s.original_text != s.suggested_text);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SuggestionKind;

    #[test]
    fn identical_texts_build_nothing() {
        let text = "one\ntwo\nthree";
        assert!(build(text, text, 0, text.chars().count()).is_empty());
    }

    #[test]
    fn inserted_word_lands_after_hello() {
        let suggestions = build("hello world", "hello brave world", 0, 11);
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.kind(), SuggestionKind::Insertion);
        assert_eq!((s.from, s.to), (5, 5));
        assert_eq!(s.suggested_text, " brave");
        assert_eq!(s.id.as_str(), "s1");
    }

    #[test]
    fn heading_change_yields_single_replacement() {
        let suggestions = build("# Old Title\nBody text", "# New Title\nBody text", 0, 21);
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.kind(), SuggestionKind::Replacement);
        assert_eq!((s.from, s.to), (2, 5));
        assert_eq!(s.original_text, "Old");
        assert_eq!(s.suggested_text, "New");
    }

    #[test]
    fn positions_are_offset_by_range_start() {
        let suggestions = build("b c", "b x c", 10, 13);
        assert_eq!(suggestions.len(), 1);
        assert_eq!((suggestions[0].from, suggestions[0].to), (11, 11));
        assert_eq!(suggestions[0].suggested_text, " x");
    }

    #[test]
    fn segments_beyond_the_range_are_dropped() {
        // The caller claims a shorter range than the original text covers.
        let suggestions = build_with("a\nb\nc\n", "a\nb\nz\n", 0, 3, Granularity::Line);
        assert!(suggestions.is_empty());
        let suggestions = build_with("a\nb\nc\n", "z\nb\nc\n", 0, 3, Granularity::Line);
        assert_eq!(suggestions.len(), 1);
        assert_eq!((suggestions[0].from, suggestions[0].to), (0, 2));
    }

    #[test]
    fn multi_hunk_ids_follow_document_order() {
        let suggestions =
            build_with("a\nb\nc\nd\n", "A\nb\nc\nD\n", 0, 8, Granularity::Line);
        let ids: Vec<&str> = suggestions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert_eq!((suggestions[0].from, suggestions[0].to), (0, 2));
        assert_eq!((suggestions[1].from, suggestions[1].to), (6, 8));
    }

    #[test]
    fn deletion_spans_removed_text() {
        let suggestions = build_with("keep\ndrop\n", "keep\n", 0, 10, Granularity::Line);
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.kind(), SuggestionKind::Deletion);
        assert_eq!((s.from, s.to), (5, 10));
        assert_eq!(s.original_text, "drop\n");
    }
}
