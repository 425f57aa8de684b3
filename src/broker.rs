//! Queue broker capability used by the submitter.
//!
//! The broker owns job records; this crate only reads a record's state by
//! fingerprint and asks for one to be created.

use std::time::Duration;

use serde::Serialize;

use crate::domain::{Fingerprint, JobState};
use crate::error::Era5Error;
use crate::profile::ArchivePayload;

/// One year, the horizon for keeping finished and failed jobs queryable.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(31_536_000);
/// Maximum runtime of a single retrieval job.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(3600);
pub const DEFAULT_QUEUE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueMode {
    /// Create the record only if none exists under the id. An existing record
    /// is returned untouched.
    CreateIfAbsent,
    /// Drop any existing record under the id and create a fresh one.
    Replace,
}

#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    pub job_id: Fingerprint,
    pub payload: ArchivePayload,
    pub description: String,
    pub queue: String,
    pub result_retention: Duration,
    pub failure_retention: Duration,
    pub timeout: Duration,
    pub mode: EnqueueMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobHandle {
    pub id: Fingerprint,
    pub state: JobState,
    /// False when the broker already held a record under this id.
    pub created: bool,
}

pub trait Broker: Send + Sync {
    /// Current state of the job stored under `job_id`, `None` if absent.
    fn fetch_status(&self, job_id: &Fingerprint) -> Result<Option<JobState>, Era5Error>;

    /// Creates a job record. With [`EnqueueMode::CreateIfAbsent`] at most one
    /// record exists per id; a duplicate create returns the existing record.
    fn enqueue(&self, request: &EnqueueRequest) -> Result<JobHandle, Era5Error>;
}

impl<B: Broker + ?Sized> Broker for &B {
    fn fetch_status(&self, job_id: &Fingerprint) -> Result<Option<JobState>, Era5Error> {
        (**self).fetch_status(job_id)
    }

    fn enqueue(&self, request: &EnqueueRequest) -> Result<JobHandle, Era5Error> {
        (**self).enqueue(request)
    }
}
