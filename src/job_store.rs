use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

// @module: Tracking of conversion jobs

/// Lifecycle state of a conversion job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Created but not yet started
    Pending,
    /// Conversion in progress
    Processing,
    /// All work finished, artifacts available
    Completed,
    /// Conversion aborted with an error
    Failed,
    /// Conversion stopped on request before finishing
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Record of one conversion job
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Unique job id
    pub id: Uuid,
    /// Current lifecycle state
    pub status: JobStatus,
    /// Completion fraction in `0.0..=1.0`
    pub progress: f32,
    /// Last status message
    pub message: String,
    /// Error description when status is `Failed`
    pub error: Option<String>,
    /// Artifacts produced so far
    pub artifacts: Vec<PathBuf>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            progress: 0.0,
            message: "Created".to_string(),
            error: None,
            artifacts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the job has reached a terminal state
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Storage interface for job records
pub trait JobStore: Send + Sync {
    /// Create a new pending job and return its id
    fn create_job(&self) -> Uuid;

    /// Fetch a snapshot of a job record
    fn get_job(&self, id: Uuid) -> Option<JobRecord>;

    /// Update status, progress and message of a job
    fn update_progress(&self, id: Uuid, status: JobStatus, progress: f32, message: &str);

    /// Record an artifact path on a job
    fn add_artifact(&self, id: Uuid, path: PathBuf);

    /// Mark a job failed with an error description
    fn mark_failed(&self, id: Uuid, error: &str);

    /// Mark a job cancelled unless it already finished
    fn cancel(&self, id: Uuid);

    /// Remove a job record, returning whether it existed
    fn delete_job(&self, id: Uuid) -> bool;

    /// List all jobs, newest first
    fn list_jobs(&self) -> Vec<JobRecord>;
}

/// In-memory job store.
///
/// Records live for the lifetime of the process; there is no persistence
/// across restarts.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<Uuid, JobRecord>>,
}

impl InMemoryJobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn create_job(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.jobs.write().insert(id, JobRecord::new(id));
        debug!("Created job {}", id);
        id
    }

    fn get_job(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().get(&id).cloned()
    }

    fn update_progress(&self, id: Uuid, status: JobStatus, progress: f32, message: &str) {
        if let Some(job) = self.jobs.write().get_mut(&id) {
            job.status = status;
            job.progress = progress.clamp(0.0, 1.0);
            job.message = message.to_string();
            job.updated_at = Utc::now();
        }
    }

    fn add_artifact(&self, id: Uuid, path: PathBuf) {
        if let Some(job) = self.jobs.write().get_mut(&id) {
            job.artifacts.push(path);
            job.updated_at = Utc::now();
        }
    }

    fn mark_failed(&self, id: Uuid, error: &str) {
        if let Some(job) = self.jobs.write().get_mut(&id) {
            job.status = JobStatus::Failed;
            job.error = Some(error.to_string());
            job.message = "Failed".to_string();
            job.updated_at = Utc::now();
        }
    }

    fn cancel(&self, id: Uuid) {
        if let Some(job) = self.jobs.write().get_mut(&id) {
            if !job.is_finished() {
                job.status = JobStatus::Cancelled;
                job.message = "Cancelled".to_string();
                job.updated_at = Utc::now();
            }
        }
    }

    fn delete_job(&self, id: Uuid) -> bool {
        self.jobs.write().remove(&id).is_some()
    }

    fn list_jobs(&self) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self.jobs.read().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }
}
