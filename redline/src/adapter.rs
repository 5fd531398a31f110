//! The terminal's render adapter.
//!
//! The session calls [`ChannelRenderer::render`] synchronously after every
//! state change. The adapter copies the view into an owned
//! [`ReviewSnapshot`] and posts it on the event bus; the next frame paints
//! it. Draw calls never happen here.

use redline_core::{RenderAdapter, ReviewView, Suggestion};
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;

/// Owned copy of a [`ReviewView`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSnapshot {
    pub suggestions: Vec<Suggestion>,
    pub proposed_title: Option<String>,
    pub current_title: Option<String>,
}

impl From<&ReviewView<'_>> for ReviewSnapshot {
    fn from(view: &ReviewView<'_>) -> Self {
        Self {
            suggestions: view.suggestions.to_vec(),
            proposed_title: view.proposed_title.map(str::to_owned),
            current_title: view.current_title.map(str::to_owned),
        }
    }
}

impl ReviewSnapshot {
    /// True when nothing is left to decide.
    pub fn is_settled(&self) -> bool {
        self.suggestions.is_empty() && self.proposed_title.is_none()
    }
}

pub struct ChannelRenderer {
    tx: UnboundedSender<AppEvent>,
}

impl ChannelRenderer {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl RenderAdapter for ChannelRenderer {
    fn render(&mut self, view: &ReviewView<'_>) {
        // A closed bus means the app is exiting; nothing left to paint.
        let _ = self.tx.send(AppEvent::ReviewChanged(Box::new(ReviewSnapshot::from(view))));
    }
}
