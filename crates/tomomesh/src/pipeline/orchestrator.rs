//! Fire-and-forget job orchestration.
//!
//! `Reconstructor` owns the shared job state and submits each job to
//! rayon's thread pool. Callers get a `JobHandle` back immediately and
//! either poll it or attach a progress listener before starting.
//!
//! Duplicate-start rules: a job id is rejected while it is running and
//! forever after it completes. A failed id may be retried.
//!
//! The outcome is held in a slot owned by the `JobHandle`; dropping the
//! handle without polling drops the outcome with it, so fire-and-forget
//! callers retain nothing per job beyond the completed-id record.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{ReconError, Result};
use crate::types::ProcessingOptions;

use super::process::run_stages;
use super::progress::{ListenerRegistry, ProgressListener};
use super::types::{ImageSource, JobId, JobOutcome, JobStage, ProgressEvent};

type OutcomeSlot = Mutex<Option<JobOutcome>>;

/// Shared, clonable orchestrator for reconstruction jobs.
#[derive(Clone)]
pub struct Reconstructor {
    output_dir: PathBuf,
    active: Arc<Mutex<HashSet<JobId>>>,
    completed: Arc<Mutex<HashSet<JobId>>>,
    listeners: ListenerRegistry,
}

impl Reconstructor {
    /// Create an orchestrator writing artifacts under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            active: Arc::new(Mutex::new(HashSet::new())),
            completed: Arc::new(Mutex::new(HashSet::new())),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Attach a progress listener for a job. Call before
    /// [`start_reconstruction`](Self::start_reconstruction) or early events
    /// are missed.
    pub fn register_listener(&self, job_id: JobId, listener: ProgressListener) {
        self.listeners.register(job_id, listener);
    }

    /// Start a job in the background (non-blocking).
    ///
    /// Fails with [`ReconError::AlreadyInProgress`] if the id is running or
    /// has already completed.
    pub fn start_reconstruction(
        &self,
        job_id: JobId,
        source: ImageSource,
        options: ProcessingOptions,
    ) -> Result<JobHandle> {
        self.try_claim(job_id)?;
        self.listeners.track(job_id);
        info!(job = %job_id, "starting reconstruction");

        let slot = Arc::new(OutcomeSlot::new(None));
        let slot_for_worker: Weak<OutcomeSlot> = Arc::downgrade(&slot);

        let listeners = self.listeners.clone();
        let active = Arc::clone(&self.active);
        let completed = Arc::clone(&self.completed);
        let output_dir = self.output_dir.clone();

        rayon::spawn(move || {
            let mut emit =
                |stage| listeners.notify(ProgressEvent::at_stage(job_id, stage));
            let result = run_stages(job_id, source, &options, &output_dir, &mut emit);

            // Completed ids are recorded before the id is released, so a
            // duplicate start can never slip through the transition.
            if result.is_ok() {
                completed.lock().unwrap().insert(job_id);
            }
            active.lock().unwrap().remove(&job_id);

            match result {
                Ok(output) => {
                    // A dropped handle leaves no one to poll; the upgrade
                    // fails and the outcome is discarded.
                    if let Some(slot) = slot_for_worker.upgrade() {
                        *slot.lock().unwrap() = Some(JobOutcome::Completed(output));
                    }
                    listeners.notify(ProgressEvent::at_stage(job_id, JobStage::Completed));
                }
                Err(err) => {
                    warn!(job = %job_id, error = %err, "reconstruction failed");
                    let message = err.summary();
                    if let Some(slot) = slot_for_worker.upgrade() {
                        *slot.lock().unwrap() = Some(JobOutcome::Failed(err));
                    }
                    listeners.notify(ProgressEvent::failed(job_id, message));
                }
            }
        });

        Ok(JobHandle {
            job_id,
            active: Arc::clone(&self.active),
            slot,
        })
    }

    /// Reserve a job id, failing if it is running or already completed.
    pub(crate) fn try_claim(&self, job_id: JobId) -> Result<()> {
        if self.completed.lock().unwrap().contains(&job_id) {
            return Err(ReconError::AlreadyInProgress(job_id));
        }
        let mut active = self.active.lock().unwrap();
        if !active.insert(job_id) {
            return Err(ReconError::AlreadyInProgress(job_id));
        }
        Ok(())
    }

    /// Whether a job is currently running.
    pub fn is_active(&self, job_id: JobId) -> bool {
        self.active.lock().unwrap().contains(&job_id)
    }

    /// Whether a job has run to successful completion.
    pub fn is_completed(&self, job_id: JobId) -> bool {
        self.completed.lock().unwrap().contains(&job_id)
    }

    /// Number of jobs currently running.
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Directory artifacts are written to.
    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }
}

/// Handle to one submitted job.
#[derive(Debug)]
pub struct JobHandle {
    job_id: JobId,
    active: Arc<Mutex<HashSet<JobId>>>,
    slot: Arc<OutcomeSlot>,
}

impl JobHandle {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Take the job's outcome if it has finished (non-blocking).
    ///
    /// The outcome is consumed; a second poll returns `None`.
    pub fn poll(&self) -> Option<JobOutcome> {
        self.slot.lock().unwrap().take()
    }

    /// Whether the job has stopped running. The outcome may still be
    /// waiting to be polled.
    pub fn is_finished(&self) -> bool {
        !self.active.lock().unwrap().contains(&self.job_id)
    }

    /// Block until the outcome is available or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Option<JobOutcome> {
        let deadline = web_time::Instant::now() + timeout;
        loop {
            if let Some(outcome) = self.poll() {
                return Some(outcome);
            }
            if web_time::Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod orchestrator_test;
