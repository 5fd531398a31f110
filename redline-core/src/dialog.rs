//! Review dialog: the modal, synchronous alternative to a live session.
//!
//! Segments are computed once when the dialog opens. The user flips
//! per-segment acceptance and the final text is materialized on confirm;
//! nothing touches the host document while the dialog is open.

use tracing::info;

use crate::config::Granularity;
use crate::document::{ChangeSet, Document};
use crate::error::DocumentError;
use crate::segment::segment_with;
use crate::title::TitleProposal;
use crate::types::{Outcome, Segment, SegmentKind};

/// One segment shown in the dialog together with its acceptance flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogEntry {
    pub segment: Segment,
    /// Only meaningful for change segments; context is always kept.
    pub accepted: bool,
}

impl DialogEntry {
    /// Text this entry contributes to the final result.
    pub fn materialize(&self) -> &str {
        let Segment { kind, original, modified } = &self.segment;
        match (kind, self.accepted) {
            (SegmentKind::Context, _) => original.as_str(),
            (SegmentKind::Replace | SegmentKind::Insert, true) => modified.as_str(),
            (SegmentKind::Replace, false) => original.as_str(),
            (SegmentKind::Insert, false) | (SegmentKind::Delete, true) => "",
            (SegmentKind::Delete, false) => original.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewDialog {
    entries: Vec<DialogEntry>,
    title: Option<TitleProposal>,
    title_accepted: bool,
}

impl ReviewDialog {
    /// Opens a dialog with every change accepted.
    pub fn new(
        original: &str,
        modified: &str,
        granularity: Granularity,
        title: Option<TitleProposal>,
    ) -> Self {
        let entries: Vec<DialogEntry> = segment_with(original, modified, granularity)
            .into_iter()
            .map(|segment| DialogEntry { accepted: segment.is_change(), segment })
            .collect();
        let title = title.filter(TitleProposal::is_actionable);
        let title_accepted = title.is_some();
        Self { entries, title, title_accepted }
    }

    pub fn entries(&self) -> &[DialogEntry] {
        &self.entries
    }

    /// Indices into [`Self::entries`] of the change segments.
    pub fn change_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.segment.is_change())
            .map(|(i, _)| i)
            .collect()
    }

    /// Flips acceptance of the entry at `index`.
    ///
    /// Returns the new flag, or `None` for a context entry or a bad index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let entry = self.entries.get_mut(index).filter(|e| e.segment.is_change())?;
        entry.accepted = !entry.accepted;
        Some(entry.accepted)
    }

    pub fn set_all(&mut self, accepted: bool) {
        for entry in self.entries.iter_mut().filter(|e| e.segment.is_change()) {
            entry.accepted = accepted;
        }
    }

    pub fn title(&self) -> Option<&TitleProposal> {
        self.title.as_ref()
    }

    pub fn title_accepted(&self) -> bool {
        self.title_accepted
    }

    /// Flips the rename decision; a no-op returning `false` without a proposal.
    pub fn toggle_title(&mut self) -> bool {
        if self.title.is_some() {
            self.title_accepted = !self.title_accepted;
        }
        self.title_accepted
    }

    /// The text confirm would produce right now.
    pub fn preview(&self) -> String {
        self.entries.iter().map(DialogEntry::materialize).collect()
    }

    /// Resolves the dialog with the materialized text of the reviewed span.
    pub fn confirm(self) -> Outcome {
        let text = self.preview();
        let accepted = self.entries.iter().filter(|e| e.segment.is_change() && e.accepted).count();
        let rename_to = match self.title {
            Some(title) if self.title_accepted => Some(title.proposed.trim().to_owned()),
            _ => None,
        };
        info!(accepted, renamed = rename_to.is_some(), "review dialog confirmed");
        Outcome { text, rename_to }
    }

    /// Dismisses the dialog. Nothing is produced or mutated.
    pub fn cancel(self) -> Option<Outcome> {
        info!("review dialog cancelled");
        None
    }
}

impl Outcome {
    /// Splices a dialog result over `[range_start, range_end)` of `document`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the range is not valid for `document`.
    pub fn apply_to<D: Document>(
        &self,
        document: &mut D,
        range_start: usize,
        range_end: usize,
    ) -> Result<ChangeSet, DocumentError> {
        document.replace_range(range_start, range_end, &self.text)
    }
}
