//! Command-line interface.
//!
//! Flags override the matching keys of the config file (see `config.rs`).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use redline_core::Granularity;

/// Review an AI rewrite of a text file, edit by edit.
#[derive(Parser, Debug)]
#[command(name = "redline", version)]
#[command(about = "Review an AI rewrite of a text file, edit by edit")]
pub struct Cli {
    /// File to review
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Review only lines A through B (1-based, inclusive)
    #[arg(long, value_name = "A:B", value_parser = parse_line_span)]
    pub lines: Option<LineSpan>,

    /// Use this file as the rewrite instead of running the generator
    #[arg(long, value_name = "FILE")]
    pub suggested: Option<PathBuf>,

    /// Generator shell command; the prompt is written to its stdin
    #[arg(long, value_name = "CMD")]
    pub command: Option<String>,

    /// Review in a single modal dialog instead of live suggestions
    #[arg(long)]
    pub dialog: bool,

    /// Color theme (`dark` or `catppuccin-mocha`)
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Instruction replacing the built-in rewrite prompt
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Current title of the document, for rename proposals
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// How finely changes are split for review
    #[arg(long, value_enum, value_name = "GRAIN")]
    pub granularity: Option<GrainArg>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GrainArg {
    Line,
    Word,
}

impl From<GrainArg> for Granularity {
    fn from(arg: GrainArg) -> Self {
        match arg {
            GrainArg::Line => Granularity::Line,
            GrainArg::Word => Granularity::Word,
        }
    }
}

/// A 1-based inclusive line span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub first: usize,
    pub last: usize,
}

fn parse_line_span(raw: &str) -> Result<LineSpan, String> {
    let (first, last) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected A:B, got `{raw}`"))?;
    let number = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("bad line number `{s}`: {e}"))
    };
    let span = LineSpan { first: number(first)?, last: number(last)? };
    if span.first == 0 || span.first > span.last {
        return Err(format!("line span {}:{} is empty or not 1-based", span.first, span.last));
    }
    Ok(span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_span_parses() {
        assert_eq!(parse_line_span("3:7"), Ok(LineSpan { first: 3, last: 7 }));
        assert_eq!(parse_line_span(" 2 : 2 "), Ok(LineSpan { first: 2, last: 2 }));
        assert!(parse_line_span("7:3").is_err());
        assert!(parse_line_span("0:3").is_err());
        assert!(parse_line_span("3").is_err());
        assert!(parse_line_span("a:b").is_err());
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "redline",
            "notes.md",
            "--lines",
            "2:4",
            "--dialog",
            "--granularity",
            "line",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.file, PathBuf::from("notes.md"));
        assert_eq!(cli.lines, Some(LineSpan { first: 2, last: 4 }));
        assert!(cli.dialog && cli.verbose);
        assert_eq!(cli.granularity.map(Granularity::from), Some(Granularity::Line));
    }

    #[test]
    fn file_is_required() {
        assert!(Cli::try_parse_from(["redline"]).is_err());
    }
}
