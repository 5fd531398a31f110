//! Suggestion diffing and position-tracking engine for reviewing AI rewrites.
//!
//! [`segment`] splits an original/rewritten text pair into typed segments,
//! [`suggest`] anchors the changed ones at document offsets, and
//! [`session`] keeps those suggestions live over a mutable [`document`]
//! until each is accepted or rejected and the review resolves exactly once.
//! [`dialog`] is the modal variant that materializes the result in one go.

pub mod config;
pub mod dialog;
pub mod document;
pub mod error;
pub mod generate;
pub mod render;
pub mod segment;
pub mod session;
pub mod suggest;
pub mod title;
pub mod types;

pub use config::{Granularity, ReviewConfig};
pub use dialog::{DialogEntry, ReviewDialog};
pub use document::{Bias, ChangeSet, Document, Replacement, TextDocument};
pub use error::{ConfigError, DocumentError, GenerateError, ReviewError};
pub use render::{Intent, RenderAdapter, ReviewView};
pub use session::{begin_review, Disposition, PendingOutcome, Phase, Session};
pub use title::TitleProposal;
pub use types::{Outcome, Segment, SegmentKind, Suggestion, SuggestionId, SuggestionKind};
