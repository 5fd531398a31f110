//! Error taxonomy for the review engine.
//!
//! Range and mapping problems that arise *during* a review are never surfaced
//! as errors: the session drops the affected suggestion and carries on. The
//! types here cover the document surface itself and setup-time failures.

use std::process::ExitStatus;

use thiserror::Error;

/// Failure applying an edit to a [`crate::document::Document`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("range {from}..{to} is out of bounds for a document of {len} chars")]
    OutOfBounds { from: usize, to: usize, len: usize },
    #[error("range {from}..{to} is inverted")]
    Inverted { from: usize, to: usize },
    #[error("replacements at {first} and {second} overlap")]
    Overlapping { first: usize, second: usize },
    #[error("change set expects a document of {expected} chars, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Failure talking to the language-model collaborator.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to start generator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("generator i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("generator exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
    #[error("generation was cancelled")]
    Cancelled,
    #[error("generator timed out after {0:?}")]
    TimedOut(std::time::Duration),
    #[error("generator produced no output")]
    Empty,
    #[error("no generator command configured")]
    NotConfigured,
}

/// Invalid review configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("custom prompt is blank")]
    BlankPrompt,
}

/// Setup-time failure of [`crate::session::begin_review`].
///
/// When one of these is returned no session exists.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("review range {start}..{end} is inverted")]
    InvertedRange { start: usize, end: usize },
    #[error("review range {start}..{end} exceeds the document length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("document text at {start}..{end} does not match the reviewed original")]
    OriginalMismatch { start: usize, end: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),
}
