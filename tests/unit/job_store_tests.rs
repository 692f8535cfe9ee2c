/*!
 * Tests for conversion job tracking
 */

use std::path::PathBuf;
use std::sync::Arc;

use talespeak::job_store::{InMemoryJobStore, JobStatus, JobStore};

/// Test the full lifecycle of a successful job
#[test]
fn test_jobLifecycle_withSuccessfulRun_shouldEndCompleted() {
    let store = InMemoryJobStore::new();
    let id = store.create_job();

    store.update_progress(id, JobStatus::Processing, 0.0, "Segmenting text");
    store.update_progress(id, JobStatus::Processing, 0.5, "Chunk 2 of 4 done");
    store.add_artifact(id, PathBuf::from("out/story_001.mp3"));
    store.add_artifact(id, PathBuf::from("out/story_002.mp3"));
    store.update_progress(id, JobStatus::Completed, 1.0, "Completed");

    let job = store.get_job(id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 1.0);
    assert_eq!(job.artifacts.len(), 2);
    assert!(job.is_finished());
    assert!(job.error.is_none());
    assert!(job.updated_at >= job.created_at);
}

/// Test that failure keeps the artifacts recorded before the error
#[test]
fn test_jobLifecycle_withFailure_shouldKeepPartialArtifacts() {
    let store = InMemoryJobStore::new();
    let id = store.create_job();

    store.update_progress(id, JobStatus::Processing, 0.25, "Chunk 1 of 4 done");
    store.add_artifact(id, PathBuf::from("out/story_001.mp3"));
    store.mark_failed(id, "engine unreachable");

    let job = store.get_job(id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.artifacts.len(), 1);
    assert_eq!(job.error.as_deref(), Some("engine unreachable"));
}

/// Test that listing returns newest jobs first
#[test]
fn test_listJobs_withMultipleJobs_shouldOrderNewestFirst() {
    let store = InMemoryJobStore::new();
    let first = store.create_job();
    let second = store.create_job();
    let third = store.create_job();

    let jobs = store.list_jobs();
    assert_eq!(jobs.len(), 3);
    // Creation timestamps may tie at millisecond resolution, so just check
    // membership and that ordering is by created_at descending
    let ids: Vec<_> = jobs.iter().map(|j| j.id).collect();
    assert!(ids.contains(&first));
    assert!(ids.contains(&second));
    assert!(ids.contains(&third));
    for pair in jobs.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

/// Test that cancellation only applies to unfinished jobs
#[test]
fn test_cancel_withRunningJob_shouldFinishCancelled() {
    let store = InMemoryJobStore::new();
    let running = store.create_job();
    let done = store.create_job();

    store.update_progress(running, JobStatus::Processing, 0.5, "Chunk 2 of 4 done");
    store.update_progress(done, JobStatus::Completed, 1.0, "Completed");

    store.cancel(running);
    store.cancel(done);

    assert_eq!(store.get_job(running).unwrap().status, JobStatus::Cancelled);
    assert!(store.get_job(running).unwrap().is_finished());
    // A finished job is not retroactively cancelled
    assert_eq!(store.get_job(done).unwrap().status, JobStatus::Completed);
}

/// Test that deletion removes the record and reports whether it existed
#[test]
fn test_deleteJob_shouldRemoveRecord() {
    let store = InMemoryJobStore::new();
    let id = store.create_job();

    assert!(store.delete_job(id));
    assert!(store.get_job(id).is_none());
    assert!(!store.delete_job(id));
}

/// Test that the store works through a shared trait object
#[test]
fn test_jobStore_asSharedTraitObject_shouldBeUsableAcrossThreads() {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let id = store.create_job();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store.update_progress(
                    id,
                    JobStatus::Processing,
                    i as f32 / 4.0,
                    &format!("step {}", i),
                );
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let job = store.get_job(id).unwrap();
    assert_eq!(job.status, JobStatus::Processing);
    assert!(job.progress <= 1.0);
}
