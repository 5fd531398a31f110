//! Language-model collaborator boundary.
//!
//! The engine never talks to a model directly. A [`Generator`] turns a
//! [`GenerateRequest`] into rewritten text, either in one call or as a
//! cancellable stream of fragments that the front-end can show while it
//! arrives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::config::ReviewConfig;
use crate::error::GenerateError;

const DEFAULT_INSTRUCTION: &str = "Rewrite the following text to improve clarity, grammar and \
flow. Keep its meaning, structure and markup. Reply with the rewritten text only, without \
commentary or code fences.";

const COMMENT_INSTRUCTION: &str =
    "Keep every code comment, tidying its wording and formatting where needed.";

/// Everything a generator needs for one rewrite.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// The text to rewrite.
    pub original: String,
    /// Fully assembled instruction text.
    pub prompt: String,
}

impl GenerateRequest {
    pub fn new(original: impl Into<String>, config: &ReviewConfig) -> Self {
        let original = original.into();
        let prompt = build_prompt(&original, config);
        Self { original, prompt }
    }
}

/// Assembles the instruction text sent to the model.
///
/// A custom prompt replaces the built-in instruction; the comment rule and
/// the delimited original text are always appended.
pub fn build_prompt(original: &str, config: &ReviewConfig) -> String {
    let instruction = config
        .custom_prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_INSTRUCTION);

    let mut prompt = String::with_capacity(instruction.len() + original.len() + 64);
    prompt.push_str(instruction);
    if config.format_comments {
        prompt.push('\n');
        prompt.push_str(COMMENT_INSTRUCTION);
    }
    prompt.push_str("\n\n<text>\n");
    prompt.push_str(original);
    if !original.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str("</text>\n");
    prompt
}

/// Shared cancellation flag for one generation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A finite, non-restartable sequence of output fragments.
pub type FragmentStream = Box<dyn Iterator<Item = Result<String, GenerateError>> + Send>;

/// Produces a rewrite of a request's original text.
pub trait Generator {
    /// Starts a generation whose fragments are yielded as they arrive.
    ///
    /// The stream ends early once `cancel` is set.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] if the generation cannot be started.
    fn stream(
        &self,
        request: &GenerateRequest,
        cancel: CancelToken,
    ) -> Result<FragmentStream, GenerateError>;

    /// Runs a whole generation and returns its output.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] on failure or when nothing was produced.
    fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        let cancel = CancelToken::new();
        collect_stream(self.stream(request, cancel.clone())?, &cancel)
    }
}

/// Drains a fragment stream into one string.
///
/// # Errors
///
/// Propagates the first fragment error, and returns
/// [`GenerateError::Cancelled`] or [`GenerateError::Empty`] when the stream
/// was cut short or produced only whitespace.
pub fn collect_stream(
    stream: FragmentStream,
    cancel: &CancelToken,
) -> Result<String, GenerateError> {
    let mut text = String::new();
    for fragment in stream {
        if cancel.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }
        text.push_str(&fragment?);
    }
    if cancel.is_cancelled() {
        return Err(GenerateError::Cancelled);
    }
    if text.trim().is_empty() {
        return Err(GenerateError::Empty);
    }
    debug!(chars = text.chars().count(), "generation collected");
    Ok(text)
}

/// A generator that replays a fixed rewrite line by line.
///
/// Used when the rewrite is supplied up front instead of generated.
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    text: String,
}

impl FixedGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Generator for FixedGenerator {
    fn stream(
        &self,
        _request: &GenerateRequest,
        cancel: CancelToken,
    ) -> Result<FragmentStream, GenerateError> {
        let lines: Vec<String> = self.text.split_inclusive('\n').map(str::to_owned).collect();
        Ok(Box::new(
            lines.into_iter().take_while(move |_| !cancel.is_cancelled()).map(Ok),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_wraps_original() {
        let prompt = build_prompt("some text", &ReviewConfig::default());
        assert!(prompt.starts_with(DEFAULT_INSTRUCTION));
        assert!(prompt.ends_with("<text>\nsome text\n</text>\n"));
        assert!(!prompt.contains(COMMENT_INSTRUCTION));
    }

    #[test]
    fn custom_prompt_replaces_instruction() {
        let config = ReviewConfig {
            custom_prompt: Some("  Make it formal.  ".into()),
            format_comments: true,
            ..Default::default()
        };
        let prompt = build_prompt("x\n", &config);
        assert!(prompt.starts_with("Make it formal.\n"));
        assert!(prompt.contains(COMMENT_INSTRUCTION));
        assert!(!prompt.contains(DEFAULT_INSTRUCTION));
        assert!(prompt.ends_with("<text>\nx\n</text>\n"));
    }

    #[test]
    fn fixed_generator_round_trips_text() {
        let generator = FixedGenerator::new("one\ntwo\nthree");
        let request = GenerateRequest::new("ignored", &ReviewConfig::default());
        assert_eq!(generator.generate(&request).unwrap(), "one\ntwo\nthree");
    }

    #[test]
    fn cancelled_stream_stops_early() {
        let generator = FixedGenerator::new("a\nb\nc\n");
        let request = GenerateRequest::new("x", &ReviewConfig::default());
        let cancel = CancelToken::new();
        let mut stream = generator.stream(&request, cancel.clone()).unwrap();
        assert_eq!(stream.next().unwrap().unwrap(), "a\n");
        cancel.cancel();
        assert!(stream.next().is_none());
    }

    #[test]
    fn blank_output_is_an_error() {
        let generator = FixedGenerator::new("  \n");
        let request = GenerateRequest::new("x", &ReviewConfig::default());
        assert!(matches!(generator.generate(&request), Err(GenerateError::Empty)));
    }

    #[test]
    fn collect_reports_first_error() {
        let fragments: Vec<Result<String, GenerateError>> =
            vec![Ok("partial".into()), Err(GenerateError::NotConfigured), Ok("more".into())];
        let stream: FragmentStream = Box::new(fragments.into_iter());
        assert!(matches!(
            collect_stream(stream, &CancelToken::new()),
            Err(GenerateError::NotConfigured)
        ));
    }
}
