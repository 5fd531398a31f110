//! Background thread that owns the generator for its lifetime.
//!
//! All communication is via channels: `GenerateJob` in, `AppEvent::Fragment`
//! and `AppEvent::Generated` out.

use crossbeam_channel::{Receiver, Sender};
use redline_core::generate::{collect_stream, FragmentStream, Generator};
use redline_core::GenerateError;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::event::AppEvent;
use crate::generate::GenerateJob;

/// Spawns the worker thread and returns the job sender.
///
/// The thread exits when the returned sender is dropped.
pub fn spawn_worker(
    generator: Box<dyn Generator + Send>,
    event_tx: UnboundedSender<AppEvent>,
) -> Sender<GenerateJob> {
    let (job_tx, job_rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || generate_worker_loop(generator, job_rx, event_tx));
    job_tx
}

/// Runs jobs until the channel is closed, reporting each result as
/// `AppEvent::Generated`.
pub fn generate_worker_loop(
    generator: Box<dyn Generator + Send>,
    rx: Receiver<GenerateJob>,
    event_tx: UnboundedSender<AppEvent>,
) {
    for job in rx {
        let result = run_job(generator.as_ref(), &job, &event_tx);
        match &result {
            Ok(text) => info!(chars = text.chars().count(), "generation finished"),
            Err(e) => warn!(error = %e, "generation failed"),
        }
        if event_tx.send(AppEvent::Generated(result)).is_err() {
            break;
        }
    }
}

fn run_job(
    generator: &(dyn Generator + Send),
    job: &GenerateJob,
    event_tx: &UnboundedSender<AppEvent>,
) -> Result<String, GenerateError> {
    let stream = generator.stream(&job.request, job.cancel.clone())?;
    let tx = event_tx.clone();
    let forwarded: FragmentStream = Box::new(stream.inspect(move |fragment| {
        if let Ok(text) = fragment {
            let _ = tx.send(AppEvent::Fragment(text.clone()));
        }
    }));
    collect_stream(forwarded, &job.cancel)
}
