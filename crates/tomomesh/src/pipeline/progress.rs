//! Per-job progress listeners.
//!
//! Listeners are registered by job id before a job starts and removed by
//! the registry itself once the terminal event has gone out. Delivery
//! guarantees:
//!
//! - reported progress never decreases (regressions are clamped upward to
//!   the furthest milestone already reported),
//! - exactly one terminal event (`Completed` or `Failed`) per job,
//! - nothing after the terminal event.
//!
//! Listeners are always invoked with the registry lock released, so a
//! listener may call back into the registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver};
use tracing::trace;

use super::types::{JobId, ProgressEvent};

/// Callback invoked for each progress event of one job.
pub type ProgressListener = Box<dyn Fn(ProgressEvent) + Send + Sync + 'static>;

struct ListenerEntry {
    listener: Option<Arc<ProgressListener>>,
    furthest: u8,
    terminal_sent: bool,
}

/// Registry of progress listeners, keyed by job id.
///
/// Cloning shares the underlying map, so worker threads can notify through
/// their own handle.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<HashMap<JobId, ListenerEntry>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener for a job. Replaces any previous listener and
    /// resets the job's delivery state.
    pub fn register(&self, job_id: JobId, listener: ProgressListener) {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(
            job_id,
            ListenerEntry {
                listener: Some(Arc::new(listener)),
                furthest: 0,
                terminal_sent: false,
            },
        );
    }

    /// Ensure progress tracking exists for a job even without a listener,
    /// so the monotonicity and terminal bookkeeping still apply.
    pub fn track(&self, job_id: JobId) {
        let mut inner = self.inner.lock().unwrap();
        inner.entry(job_id).or_insert(ListenerEntry {
            listener: None,
            furthest: 0,
            terminal_sent: false,
        });
    }

    /// Deliver an event to the job's listener, enforcing the guarantees
    /// above. Events for unknown or already-terminated jobs are dropped.
    pub fn notify(&self, mut event: ProgressEvent) {
        let listener = {
            let mut inner = self.inner.lock().unwrap();
            let Some(entry) = inner.get_mut(&event.job_id) else {
                return;
            };
            if entry.terminal_sent {
                return;
            }

            event.progress = event.progress.max(entry.furthest);
            entry.furthest = event.progress;

            if event.stage.is_terminal() {
                entry.terminal_sent = true;
                let taken = entry.listener.take();
                inner.remove(&event.job_id);
                taken
            } else {
                entry.listener.clone()
            }
        };

        if let Some(listener) = listener {
            trace!(job = %event.job_id, stage = ?event.stage, progress = event.progress, "progress");
            listener(event);
        }
    }

    /// Drop a job's listener without delivering anything further.
    pub fn unregister(&self, job_id: JobId) {
        self.inner.lock().unwrap().remove(&job_id);
    }

    pub fn is_registered(&self, job_id: JobId) -> bool {
        self.inner.lock().unwrap().contains_key(&job_id)
    }
}

/// Build a listener that forwards every event into a channel.
///
/// The receiver end is what tests and CLI frontends consume.
pub fn channel_listener() -> (ProgressListener, Receiver<ProgressEvent>) {
    let (tx, rx) = unbounded();
    let listener: ProgressListener = Box::new(move |event| {
        // Receiver may be gone; progress delivery is best-effort.
        let _ = tx.send(event);
    });
    (listener, rx)
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod progress_test;
