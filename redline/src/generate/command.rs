//! Generator backed by an external command.
//!
//! The prompt is written to the command's stdin and its stdout is streamed
//! back line by line. Reading happens on helper threads so that a silent
//! child can still be cancelled or timed out.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use redline_core::generate::{CancelToken, FragmentStream, GenerateRequest, Generator};
use redline_core::GenerateError;
use tracing::{debug, warn};

/// How often a waiting stream re-checks cancellation and its deadline.
const POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct CommandGenerator {
    argv: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandGenerator {
    /// # Errors
    ///
    /// Returns [`GenerateError::NotConfigured`] for an empty argv.
    pub fn new(argv: Vec<String>, timeout: Option<Duration>) -> Result<Self, GenerateError> {
        if argv.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(GenerateError::NotConfigured);
        }
        Ok(Self { argv, timeout })
    }
}

impl Generator for CommandGenerator {
    fn stream(
        &self,
        request: &GenerateRequest,
        cancel: CancelToken,
    ) -> Result<FragmentStream, GenerateError> {
        let program = &self.argv[0];
        let mut child = Command::new(program)
            .args(&self.argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GenerateError::Spawn {
                program: program.clone(),
                source,
            })?;
        debug!(program, pid = child.id(), "generator started");

        if let Some(mut stdin) = child.stdin.take() {
            let prompt = request.prompt.clone();
            // Dropping stdin at the end of the thread closes the pipe.
            std::thread::spawn(move || {
                if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                    debug!(error = %e, "generator closed stdin early");
                }
            });
        }

        let (line_tx, lines) = crossbeam_channel::unbounded();
        if let Some(stdout) = child.stdout.take() {
            std::thread::spawn(move || {
                let mut reader = BufReader::new(stdout);
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            if line_tx.send(Ok(line)).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            let _ = line_tx.send(Err(e));
                            break;
                        }
                    }
                }
            });
        }

        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        Ok(Box::new(CommandStream {
            child,
            lines,
            stderr,
            cancel,
            timeout: self.timeout,
            deadline: self.timeout.map(|t| Instant::now() + t),
            done: false,
        }))
    }
}

struct CommandStream {
    child: Child,
    lines: Receiver<std::io::Result<String>>,
    stderr: Option<JoinHandle<String>>,
    cancel: CancelToken,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    done: bool,
}

impl CommandStream {
    fn stop(&mut self) {
        self.done = true;
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "generator already exited");
        }
        let _ = self.child.wait();
    }

    /// Reaps the child after stdout closed.
    fn finish(&mut self) -> Option<Result<String, GenerateError>> {
        self.done = true;
        let status = match self.child.wait() {
            Ok(status) => status,
            Err(e) => return Some(Err(e.into())),
        };
        if status.success() {
            return None;
        }
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        warn!(%status, "generator failed");
        Some(Err(GenerateError::Exit {
            status,
            stderr: stderr.trim().to_owned(),
        }))
    }
}

impl Iterator for CommandStream {
    type Item = Result<String, GenerateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.cancel.is_cancelled() {
                self.stop();
                return None;
            }
            if let (Some(deadline), Some(timeout)) = (self.deadline, self.timeout) {
                if Instant::now() >= deadline {
                    self.stop();
                    return Some(Err(GenerateError::TimedOut(timeout)));
                }
            }
            match self.lines.recv_timeout(POLL) {
                Ok(Ok(line)) => return Some(Ok(line)),
                Ok(Err(e)) => {
                    self.stop();
                    return Some(Err(e.into()));
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return self.finish(),
            }
        }
    }
}

impl Drop for CommandStream {
    fn drop(&mut self) {
        if !self.done {
            self.stop();
        }
    }
}
