//! Review configuration.
//!
//! Options arrive as one explicit record, deserialized from the front-end's
//! config file and validated once before a review starts.

use serde::Deserialize;

use crate::error::ConfigError;

/// How finely the segmenter splits changed hunks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Whole changed lines, one unit per hunk.
    Line,
    /// Changed hunks narrowed to the words that actually differ.
    #[default]
    Word,
}

/// Options for one review.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Ask the generator to keep and tidy code comments.
    pub format_comments: bool,
    /// Instruction text replacing the built-in rewrite instruction.
    pub custom_prompt: Option<String>,
    pub granularity: Granularity,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            format_comments: false,
            custom_prompt: None,
            granularity: Granularity::Word,
        }
    }
}

impl ReviewConfig {
    /// Checks the record once at entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BlankPrompt`] when `custom_prompt` is present but
    /// contains only whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.custom_prompt {
            Some(prompt) if prompt.trim().is_empty() => Err(ConfigError::BlankPrompt),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_prompt_is_rejected() {
        let config = ReviewConfig { custom_prompt: Some("  \n".into()), ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::BlankPrompt));
        let config = ReviewConfig {
            custom_prompt: Some("fix typos".into()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(ReviewConfig::default().validate(), Ok(()));
    }
}
