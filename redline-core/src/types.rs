//! Shared data model for the review engine.
//!
//! All types here are fully owned so they can be handed to a render adapter,
//! sent across the front-end's event bus, or stored in application state
//! without borrowing from the session that produced them.

use std::fmt;

/// The kind of edit a [`Segment`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Text present unchanged in both inputs.
    Context,
    /// Text only present in the modified input.
    Insert,
    /// Text only present in the original input.
    Delete,
    /// A removed run immediately followed by an added run, reviewed as one unit.
    Replace,
}

/// One unit of segmenter output over two whole texts.
///
/// Concatenating every segment's `original` reproduces the original text and
/// concatenating every `modified` reproduces the modified text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Portion of the original text covered by this segment (empty for inserts).
    pub original: String,
    /// Portion of the modified text covered by this segment (empty for deletes).
    pub modified: String,
}

impl Segment {
    pub fn context(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: SegmentKind::Context,
            original: text.clone(),
            modified: text,
        }
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Insert,
            original: String::new(),
            modified: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Delete,
            original: text.into(),
            modified: String::new(),
        }
    }

    pub fn replace(original: impl Into<String>, modified: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Replace,
            original: original.into(),
            modified: modified.into(),
        }
    }

    /// Builds the segment whose kind follows from which side is empty.
    ///
    /// Returns `None` when both sides are empty.
    pub fn from_sides(original: String, modified: String) -> Option<Self> {
        match (original.is_empty(), modified.is_empty()) {
            (true, true) => None,
            (true, false) => Some(Self::insert(modified)),
            (false, true) => Some(Self::delete(original)),
            (false, false) if original == modified => Some(Self::context(original)),
            (false, false) => Some(Self::replace(original, modified)),
        }
    }

    /// True for segments that propose a change.
    pub fn is_change(&self) -> bool {
        self.kind != SegmentKind::Context
    }

    /// Length of `original` in characters, i.e. how far it advances a document cursor.
    pub fn original_len(&self) -> usize {
        self.original.chars().count()
    }
}

/// Opaque identifier of a suggestion, unique within one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuggestionId(String);

impl SuggestionId {
    /// Builds the id for the `n`th suggestion of a build call.
    pub(crate) fn nth(n: usize) -> Self {
        Self(format!("s{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SuggestionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Content-derived variant of a [`Suggestion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Insertion,
    Deletion,
    Replacement,
}

/// One discrete proposed edit over a half-open character range of the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: SuggestionId,
    /// Start of the covered range (inclusive, character offset).
    pub from: usize,
    /// End of the covered range (exclusive, character offset).
    pub to: usize,
    /// Text currently occupying `[from, to)`.
    pub original_text: String,
    /// Text that replaces `[from, to)` when accepted.
    pub suggested_text: String,
}

impl Suggestion {
    pub fn kind(&self) -> SuggestionKind {
        if self.original_text.is_empty() {
            SuggestionKind::Insertion
        } else if self.suggested_text.is_empty() {
            SuggestionKind::Deletion
        } else {
            SuggestionKind::Replacement
        }
    }

    /// True if `[from, to)` is a well-formed range inside a document of `len` chars.
    pub fn fits(&self, len: usize) -> bool {
        self.from <= self.to && self.to <= len
    }

    /// True if the two suggestions cover intersecting text.
    ///
    /// Touching ranges do not overlap, and an empty range only overlaps a
    /// range that strictly contains its position.
    pub fn overlaps(&self, other: &Suggestion) -> bool {
        self.from < other.to && other.from < self.to
            || (self.from == self.to && other.from < self.from && self.from < other.to)
            || (other.from == other.to && self.from < other.from && other.from < self.to)
    }
}

/// Final resolved result of a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Full document content after the review.
    pub text: String,
    /// Accepted title, if a rename was proposed and accepted.
    pub rename_to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(from: usize, to: usize) -> Suggestion {
        Suggestion {
            id: SuggestionId::nth(1),
            from,
            to,
            original_text: "x".repeat(to - from),
            suggested_text: "y".into(),
        }
    }

    #[test]
    fn from_sides_picks_kind_by_emptiness() {
        assert_eq!(Segment::from_sides(String::new(), String::new()), None);
        assert_eq!(
            Segment::from_sides(String::new(), "a".into()).map(|s| s.kind),
            Some(SegmentKind::Insert)
        );
        assert_eq!(
            Segment::from_sides("a".into(), String::new()).map(|s| s.kind),
            Some(SegmentKind::Delete)
        );
        assert_eq!(
            Segment::from_sides("a".into(), "b".into()).map(|s| s.kind),
            Some(SegmentKind::Replace)
        );
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        assert!(!suggestion(0, 5).overlaps(&suggestion(5, 9)));
        assert!(!suggestion(5, 5).overlaps(&suggestion(0, 5)));
        assert!(suggestion(0, 5).overlaps(&suggestion(4, 9)));
        assert!(suggestion(3, 3).overlaps(&suggestion(0, 5)));
    }

    #[test]
    fn kind_follows_content() {
        let mut s = suggestion(2, 2);
        assert_eq!(s.kind(), SuggestionKind::Insertion);
        s.to = 4;
        s.original_text = "ab".into();
        assert_eq!(s.kind(), SuggestionKind::Replacement);
        s.suggested_text.clear();
        assert_eq!(s.kind(), SuggestionKind::Deletion);
    }
}
