use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use super::*;
use crate::pipeline::progress::channel_listener;
use crate::pipeline::test_images::checkerboard_png;

const WAIT: Duration = Duration::from_secs(30);

fn temp_output_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tomomesh-{tag}-{}", JobId::generate().value()))
}

#[test]
fn fire_and_forget_job_completes() {
    let dir = temp_output_dir("orch-complete");
    let reconstructor = Reconstructor::new(&dir);
    let job = JobId::generate();

    let handle = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(checkerboard_png(48, 48, 6)),
            ProcessingOptions::default(),
        )
        .unwrap();
    assert_eq!(handle.job_id(), job);

    let outcome = handle.wait(WAIT).expect("job did not finish in time");
    let JobOutcome::Completed(output) = outcome else {
        panic!("expected completion");
    };
    assert_eq!(output.job_id, job);
    assert!(output.face_count > 0);
    for (_, path) in &output.artifacts {
        assert!(path.exists());
    }
    assert!(!reconstructor.is_active(job));
    assert!(handle.is_finished());
    assert!(handle.poll().is_none(), "outcome is consumed by wait");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn duplicate_job_id_is_rejected_while_active() {
    let dir = temp_output_dir("orch-dup");
    let reconstructor = Reconstructor::new(&dir);
    let job = JobId::generate();

    reconstructor.try_claim(job).unwrap();
    let err = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(checkerboard_png(16, 16, 4)),
            ProcessingOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, crate::error::ReconError::AlreadyInProgress(id) if id == job));
}

#[test]
fn completed_job_id_rejects_duplicate_start() {
    let dir = temp_output_dir("orch-completed-dup");
    let reconstructor = Reconstructor::new(&dir);
    let job = JobId::generate();

    let first = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(checkerboard_png(16, 16, 4)),
            ProcessingOptions::default(),
        )
        .unwrap();
    assert!(first.wait(WAIT).expect("job did not finish").is_completed());
    assert!(reconstructor.is_completed(job));

    // Completed ids stay claimed: restarting would clobber the artifacts.
    let err = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(checkerboard_png(16, 16, 4)),
            ProcessingOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, crate::error::ReconError::AlreadyInProgress(id) if id == job));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn failed_job_id_may_be_retried() {
    let dir = temp_output_dir("orch-retry");
    let reconstructor = Reconstructor::new(&dir);
    let job = JobId::generate();

    let first = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(vec![0xba, 0xad]),
            ProcessingOptions::default(),
        )
        .unwrap();
    let outcome = first.wait(WAIT).expect("job did not finish");
    assert!(!outcome.is_completed());
    assert!(!reconstructor.is_completed(job));

    // Failure releases the id so the caller can retry with fixed input.
    let retry = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(checkerboard_png(16, 16, 4)),
            ProcessingOptions::default(),
        )
        .unwrap();
    assert!(retry.wait(WAIT).expect("retry did not finish").is_completed());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn dropped_handle_does_not_block_completion() {
    let dir = temp_output_dir("orch-dropped");
    let reconstructor = Reconstructor::new(&dir);
    let job = JobId::generate();

    let (listener, rx) = channel_listener();
    reconstructor.register_listener(job, listener);
    let handle = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(checkerboard_png(24, 24, 4)),
            ProcessingOptions::default(),
        )
        .unwrap();
    drop(handle);

    // The job still runs to completion with nobody polling; the outcome is
    // discarded with the handle instead of being retained.
    let mut terminal = None;
    while let Ok(event) = rx.recv_timeout(WAIT) {
        if event.stage.is_terminal() {
            terminal = Some(event);
            break;
        }
    }
    let terminal = terminal.expect("terminal event");
    assert_eq!(terminal.stage, JobStage::Completed);
    assert!(reconstructor.is_completed(job));
    assert!(!reconstructor.is_active(job));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn progress_is_monotone_and_ends_at_hundred() {
    let dir = temp_output_dir("orch-progress");
    let reconstructor = Reconstructor::new(&dir);
    let job = JobId::generate();

    let (listener, rx) = channel_listener();
    reconstructor.register_listener(job, listener);
    let handle = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(checkerboard_png(32, 32, 4)),
            ProcessingOptions::default(),
        )
        .unwrap();
    handle.wait(WAIT).expect("job did not finish in time");

    let events: Vec<_> = rx.try_iter().collect();
    assert!(!events.is_empty());
    for pair in events.windows(2) {
        assert!(
            pair[0].progress <= pair[1].progress,
            "progress regressed: {} -> {}",
            pair[0].progress,
            pair[1].progress
        );
    }
    let last = events.last().unwrap();
    assert_eq!(last.stage, JobStage::Completed);
    assert_eq!(last.progress, 100);
    assert_eq!(
        events.iter().filter(|e| e.stage.is_terminal()).count(),
        1,
        "exactly one terminal event"
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn failed_job_notifies_and_leaves_no_artifacts() {
    let dir = temp_output_dir("orch-fail");
    let reconstructor = Reconstructor::new(&dir);
    let job = JobId::generate();

    let (listener, rx) = channel_listener();
    reconstructor.register_listener(job, listener);
    let handle = reconstructor
        .start_reconstruction(
            job,
            ImageSource::Bytes(vec![1, 2, 3]),
            ProcessingOptions::default(),
        )
        .unwrap();

    let outcome = handle.wait(WAIT).expect("job did not finish in time");
    assert!(!outcome.is_completed());
    assert!(!reconstructor.is_active(job));

    let events: Vec<_> = rx.try_iter().collect();
    let last = events.last().unwrap();
    assert_eq!(last.stage, JobStage::Failed);
    assert!(last.message.is_some());

    // Nothing reached the export stage, so the output dir was never created.
    assert!(!dir.exists());
}

#[test]
fn handle_wait_times_out_without_outcome() {
    let dir = temp_output_dir("orch-timeout");
    let reconstructor = Reconstructor::new(&dir);
    let handle = JobHandle {
        job_id: JobId::generate(),
        active: Arc::new(Mutex::new(std::collections::HashSet::new())),
        slot: Arc::new(OutcomeSlot::new(None)),
    };
    assert!(handle.wait(Duration::from_millis(10)).is_none());
    drop(reconstructor);
}

#[test]
fn independent_jobs_run_concurrently() {
    let dir = temp_output_dir("orch-multi");
    let reconstructor = Reconstructor::new(&dir);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            reconstructor
                .start_reconstruction(
                    JobId::generate(),
                    ImageSource::Bytes(checkerboard_png(24, 24, 4)),
                    ProcessingOptions::default(),
                )
                .unwrap()
        })
        .collect();

    for handle in &handles {
        let outcome = handle.wait(WAIT).expect("job did not finish in time");
        assert!(outcome.is_completed());
    }
    assert_eq!(reconstructor.active_count(), 0);

    fs::remove_dir_all(&dir).ok();
}
