//! Render adapter boundary.
//!
//! The session pushes a read-only [`ReviewView`] to its adapter after every
//! state change; the adapter never mutates the session directly. User actions
//! travel the other way as [`Intent`] messages passed to
//! [`crate::session::Session::dispatch`].

use crate::types::{Suggestion, SuggestionId};

/// Snapshot of what a review surface should currently show.
#[derive(Debug, Clone, Copy)]
pub struct ReviewView<'a> {
    /// Live suggestions in stable rendering order.
    pub suggestions: &'a [Suggestion],
    /// Rename awaiting a decision, if any.
    pub proposed_title: Option<&'a str>,
    /// Title the document currently has, if known.
    pub current_title: Option<&'a str>,
}

/// Paints pending suggestions on a host surface.
///
/// `render` receives the complete current set each time and must reflect
/// exactly that set; rendering the same view twice is a visual no-op.
pub trait RenderAdapter {
    fn render(&mut self, view: &ReviewView<'_>);
}

/// A user decision sent from the review surface to its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Accept(SuggestionId),
    Reject(SuggestionId),
    AcceptAll,
    RejectAll,
    AcceptTitle,
    RejectTitle,
    /// Dismiss the review without a result.
    Cancel,
}
