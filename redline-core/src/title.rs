//! Rename proposals offered alongside body suggestions.

/// A proposed new title for the reviewed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleProposal {
    /// Title the document has now, if known.
    pub current: Option<String>,
    /// Title the generator suggests.
    pub proposed: String,
}

impl TitleProposal {
    pub fn new(current: Option<String>, proposed: impl Into<String>) -> Self {
        Self { current, proposed: proposed.into() }
    }

    /// Derives a proposal from the first ATX heading of each text.
    ///
    /// Returns `None` when the modified text has no heading or its heading
    /// matches the original's. `current` defaults to the original heading.
    pub fn from_headings(current: Option<String>, original: &str, modified: &str) -> Option<Self> {
        let proposed = first_heading(modified)?;
        let before = first_heading(original);
        if before == Some(proposed) {
            return None;
        }
        let current = current.or_else(|| before.map(str::to_owned));
        Some(Self::new(current, proposed))
    }

    /// True if the proposal would actually change anything.
    ///
    /// Blank proposals and proposals equal to the current title (ignoring
    /// surrounding whitespace) are not worth asking about.
    pub fn is_actionable(&self) -> bool {
        let proposed = self.proposed.trim();
        !proposed.is_empty() && self.current.as_deref().map(str::trim) != Some(proposed)
    }
}

/// Text of the first `#`-style heading in `text`, trimmed.
pub fn first_heading(text: &str) -> Option<&str> {
    text.lines().find_map(|line| {
        let line = line.trim_start();
        let hashes = line.chars().take_while(|&c| c == '#').count();
        if hashes == 0 || hashes > 6 {
            return None;
        }
        let rest = &line[hashes..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let title = rest.trim().trim_end_matches('#').trim_end();
        (!title.is_empty()).then_some(title)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_change_becomes_proposal() {
        let proposal =
            TitleProposal::from_headings(None, "# Old Title\nBody", "# New Title\nBody").unwrap();
        assert_eq!(proposal.current.as_deref(), Some("Old Title"));
        assert_eq!(proposal.proposed, "New Title");
        assert!(proposal.is_actionable());
    }

    #[test]
    fn unchanged_heading_is_no_proposal() {
        assert_eq!(TitleProposal::from_headings(None, "# Same\na", "# Same\nb"), None);
        assert_eq!(TitleProposal::from_headings(None, "# Same", "no heading"), None);
    }

    #[test]
    fn first_heading_skips_non_headings() {
        assert_eq!(first_heading("intro\n#tag\n## Real one ##\n"), Some("Real one"));
        assert_eq!(first_heading("####### seven"), None);
        assert_eq!(first_heading("#"), None);
    }

    #[test]
    fn proposal_equal_to_current_is_not_actionable() {
        assert!(!TitleProposal::new(Some("Notes".into()), " Notes ").is_actionable());
        assert!(!TitleProposal::new(None, "   ").is_actionable());
        assert!(TitleProposal::new(None, "Notes").is_actionable());
    }
}
