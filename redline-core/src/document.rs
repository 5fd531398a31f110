//! Document surface, change sets, and position mapping.
//!
//! A [`ChangeSet`] describes one edit to a document as a sequence of retain,
//! delete and insert operations over character offsets. Besides applying the
//! edit it can map any position of the old document into the new one, which
//! is how a session keeps its suggestion ranges valid while the text changes
//! underneath them.

use ropey::Rope;

use crate::error::DocumentError;

/// How a position sitting exactly at an insertion point is mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Stay before text inserted at the position.
    Left,
    /// Move after text inserted at the position.
    Right,
}

/// A single operation in a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Keep the next N characters of the old document.
    Retain(usize),
    /// Remove the next N characters of the old document.
    Delete(usize),
    /// Insert text at the current position; `chars` caches its char count.
    Insert { text: String, chars: usize },
}

/// One `[from, to) -> text` replacement in old-document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub from: usize,
    pub to: usize,
    pub text: String,
}

impl Replacement {
    pub fn new(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self { from, to, text: text.into() }
    }

    /// A pure insertion at `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// A pure deletion of `[from, to)`.
    pub fn delete(from: usize, to: usize) -> Self {
        Self::new(from, to, String::new())
    }
}

/// A retain/delete/insert description of one edit to a document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Operation>,
    /// Length of the document before the change.
    len: usize,
    /// Length of the document after the change.
    len_after: usize,
}

impl ChangeSet {
    /// Builds the change set for a batch of replacements over a document of `doc_len` chars.
    ///
    /// Replacements may be given in any order; they are sorted by position and
    /// must not overlap. Two insertions at the same offset are kept in the
    /// order given.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] for inverted, out-of-bounds, or overlapping ranges.
    pub fn from_replacements(
        doc_len: usize,
        replacements: &[Replacement],
    ) -> Result<Self, DocumentError> {
        let mut sorted: Vec<&Replacement> = replacements.iter().collect();
        sorted.sort_by_key(|r| (r.from, r.to));

        let mut changes = ChangeSet::default();
        let mut cursor = 0;
        for r in sorted {
            if r.from > r.to {
                return Err(DocumentError::Inverted { from: r.from, to: r.to });
            }
            if r.to > doc_len {
                return Err(DocumentError::OutOfBounds {
                    from: r.from,
                    to: r.to,
                    len: doc_len,
                });
            }
            if r.from < cursor {
                return Err(DocumentError::Overlapping {
                    first: cursor,
                    second: r.from,
                });
            }
            changes.retain(r.from - cursor);
            changes.insert(&r.text);
            changes.delete(r.to - r.from);
            cursor = r.to;
        }
        changes.retain(doc_len - cursor);
        changes.len = doc_len;
        Ok(changes)
    }

    /// Length of the document this change applies to.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Length of the document after the change.
    pub fn len_after(&self) -> usize {
        self.len_after
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0 && self.len_after == 0
    }

    /// True if applying the change leaves the document untouched.
    pub fn is_identity(&self) -> bool {
        self.changes.iter().all(|op| matches!(op, Operation::Retain(_)))
    }

    pub fn operations(&self) -> &[Operation] {
        &self.changes
    }

    fn retain(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.len += n;
        self.len_after += n;
        if let Some(Operation::Retain(count)) = self.changes.last_mut() {
            *count += n;
        } else {
            self.changes.push(Operation::Retain(n));
        }
    }

    fn delete(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.len += n;
        if let Some(Operation::Delete(count)) = self.changes.last_mut() {
            *count += n;
        } else {
            self.changes.push(Operation::Delete(n));
        }
    }

    // Inserts are kept ahead of an adjacent delete so that a replacement is
    // always `Insert, Delete` and consecutive replacements merge cleanly.
    fn insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let chars = text.chars().count();
        self.len_after += chars;
        match self.changes.as_mut_slice() {
            [.., Operation::Insert { text: prev, chars: prev_chars }]
            | [.., Operation::Insert { text: prev, chars: prev_chars }, Operation::Delete(_)] => {
                prev.push_str(text);
                *prev_chars += chars;
            }
            [.., last @ Operation::Delete(_)] => {
                let del = std::mem::replace(
                    last,
                    Operation::Insert { text: text.to_owned(), chars },
                );
                self.changes.push(del);
            }
            _ => self.changes.push(Operation::Insert { text: text.to_owned(), chars }),
        }
    }

    /// Maps a position of the old document into the new document.
    ///
    /// Returns `None` when the position no longer exists: it lies strictly
    /// inside a deleted span, or beyond the old document.
    pub fn map_pos(&self, pos: usize, bias: Bias) -> Option<usize> {
        if pos > self.len {
            return None;
        }
        let mut old_pos = 0;
        let mut new_pos = 0;
        for op in &self.changes {
            match op {
                Operation::Retain(n) => {
                    if old_pos + n > pos {
                        return Some(new_pos + (pos - old_pos));
                    }
                    old_pos += n;
                    new_pos += n;
                }
                Operation::Delete(n) => {
                    if old_pos < pos && pos < old_pos + n {
                        return None;
                    }
                    if old_pos + n > pos {
                        return Some(new_pos);
                    }
                    old_pos += n;
                }
                Operation::Insert { chars, .. } => {
                    if !(old_pos == pos && bias == Bias::Left) {
                        new_pos += chars;
                    }
                }
            }
        }
        Some(new_pos + (pos - old_pos))
    }

    /// Applies the change to `doc` in place.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::LengthMismatch`] if `doc` is not the document
    /// this change was built for; `doc` is untouched in that case.
    pub fn apply(&self, doc: &mut Rope) -> Result<(), DocumentError> {
        let found = doc.len_chars();
        if found != self.len {
            return Err(DocumentError::LengthMismatch {
                expected: self.len,
                found,
            });
        }
        let mut pos = 0;
        for op in &self.changes {
            match op {
                Operation::Retain(n) => pos += n,
                Operation::Delete(n) => doc.remove(pos..pos + n),
                Operation::Insert { text, chars } => {
                    doc.insert(pos, text);
                    pos += chars;
                }
            }
        }
        Ok(())
    }

    /// Applies the change to `text`, returning the new content.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::LengthMismatch`] if `text` is not the document
    /// this change was built for.
    pub fn apply_to(&self, text: &str) -> Result<String, DocumentError> {
        let mut rope = Rope::from_str(text);
        self.apply(&mut rope)?;
        Ok(rope.to_string())
    }
}

/// The host document surface a session edits.
///
/// Offsets are character indices. Implementations must apply each call
/// atomically: either the whole edit lands or the document is unchanged.
pub trait Document {
    /// Current length in characters.
    fn len_chars(&self) -> usize;

    /// Current full text.
    fn text(&self) -> String;

    /// Text of `[from, to)`, or `None` if the range is not valid.
    fn slice(&self, from: usize, to: usize) -> Option<String>;

    /// Applies a change set built against the current content.
    fn apply(&mut self, changes: &ChangeSet) -> Result<(), DocumentError>;

    /// Replaces `[from, to)` with `text` and returns the change that was applied.
    fn replace_range(
        &mut self,
        from: usize,
        to: usize,
        text: &str,
    ) -> Result<ChangeSet, DocumentError> {
        self.replace_ranges(&[Replacement::new(from, to, text)])
    }

    /// Applies several disjoint replacements as one edit.
    fn replace_ranges(&mut self, replacements: &[Replacement]) -> Result<ChangeSet, DocumentError> {
        let changes = ChangeSet::from_replacements(self.len_chars(), replacements)?;
        self.apply(&changes)?;
        Ok(changes)
    }
}

/// An in-memory document backed by a [`Rope`].
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    rope: Rope,
}

impl TextDocument {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self { rope: Rope::from_str(text.as_ref()) }
    }

    pub fn into_string(self) -> String {
        self.rope.to_string()
    }

    /// Number of lines, not counting the empty line after a final terminator.
    fn line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        if self.rope.line(lines - 1).len_chars() == 0 {
            lines - 1
        } else {
            lines
        }
    }

    /// Char range covering 1-based lines `first..=last`, including the final
    /// line's terminator.
    ///
    /// Returns `None` when `first` is zero, `first > last`, or `first` is past
    /// the last line. A `last` beyond the end is clamped.
    pub fn line_range(&self, first: usize, last: usize) -> Option<(usize, usize)> {
        let count = self.line_count();
        if first == 0 || first > last || first > count {
            return None;
        }
        let start = self.rope.line_to_char(first - 1);
        let end = if last >= count {
            self.rope.len_chars()
        } else {
            self.rope.line_to_char(last)
        };
        Some((start, end))
    }
}

impl Document for TextDocument {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn slice(&self, from: usize, to: usize) -> Option<String> {
        if from > to {
            return None;
        }
        self.rope.get_slice(from..to).map(|s| s.to_string())
    }

    fn apply(&mut self, changes: &ChangeSet) -> Result<(), DocumentError> {
        changes.apply(&mut self.rope)
    }
}
