//! Rewrite generation for redline.
//!
//! Generation runs on a dedicated `std::thread` worker so a slow or blocking
//! generator never stalls the event loop. The main thread sends a
//! [`GenerateJob`] over a `crossbeam_channel`; fragments and the final result
//! come back as `AppEvent`s.

pub mod command;
pub mod worker;

pub use command::CommandGenerator;

use redline_core::generate::{CancelToken, GenerateRequest};

/// One generation request for the worker thread.
#[derive(Debug)]
pub struct GenerateJob {
    pub request: GenerateRequest,
    pub cancel: CancelToken,
}

/// Makes the rewrite end the same way the original does.
///
/// Line-oriented generators always terminate their last line, while the
/// reviewed span may not; without this every review would carry a spurious
/// trailing-newline suggestion.
pub fn match_trailing_newline(original: &str, mut modified: String) -> String {
    match (original.ends_with('\n'), modified.ends_with('\n')) {
        (false, true) => {
            modified.pop();
            if modified.ends_with('\r') {
                modified.pop();
            }
        }
        (true, false) => modified.push('\n'),
        _ => {}
    }
    modified
}
