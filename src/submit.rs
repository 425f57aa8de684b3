use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::broker::{
    Broker, DEFAULT_JOB_TIMEOUT, DEFAULT_QUEUE, DEFAULT_RETENTION, EnqueueMode, EnqueueRequest,
    JobHandle,
};
use crate::domain::{Dataset, Fingerprint, JobState};
use crate::error::Era5Error;
use crate::profile::ArchivePayload;
use crate::request::RequestSpec;

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitSettings {
    pub queue: String,
    pub result_retention: Duration,
    pub failure_retention: Duration,
    pub job_timeout: Duration,
    /// Allow a new submission while the previous job is `started`.
    pub resubmit_started: bool,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            queue: DEFAULT_QUEUE.to_string(),
            result_retention: DEFAULT_RETENTION,
            failure_retention: DEFAULT_RETENTION,
            job_timeout: DEFAULT_JOB_TIMEOUT,
            resubmit_started: false,
        }
    }
}

impl SubmitSettings {
    /// Whether an existing job in `state` suppresses a new submission.
    pub fn blocks_resubmission(&self, state: JobState) -> bool {
        match state {
            JobState::Queued
            | JobState::Finished
            | JobState::Failed
            | JobState::Deferred
            | JobState::Scheduled => true,
            JobState::Started => !self.resubmit_started,
            JobState::Stopped | JobState::Canceled => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitAction {
    /// An existing job already covers the request.
    Reused,
    /// No job existed; a new one was created.
    Enqueued,
    /// An existing job in a resubmittable state was replaced.
    Replaced,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    pub dataset: Dataset,
    pub target: Utf8PathBuf,
    pub action: SubmitAction,
    pub job: JobHandle,
}

/// Payload and identity of a request, computed without touching the broker.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitPlan {
    pub fingerprint: Fingerprint,
    pub payload: ArchivePayload,
}

impl SubmitPlan {
    pub fn new(spec: &RequestSpec, target: &Utf8Path) -> Result<Self, Era5Error> {
        let payload = spec.dataset().build_request_payload(spec, target);
        let fingerprint = payload.request.fingerprint()?;
        Ok(Self {
            fingerprint,
            payload,
        })
    }
}

/// Submits each distinct request at most once.
///
/// The status lookup and the enqueue are not atomic; two callers racing on
/// the same fingerprint both reach the broker, which keeps a single record
/// per id and reports the loser as `created == false`.
#[derive(Clone)]
pub struct Submitter<B: Broker> {
    broker: B,
    settings: SubmitSettings,
}

impl<B: Broker> Submitter<B> {
    pub fn new(broker: B, settings: SubmitSettings) -> Self {
        Self { broker, settings }
    }

    pub fn settings(&self) -> &SubmitSettings {
        &self.settings
    }

    pub fn status(&self, fingerprint: &Fingerprint) -> Result<Option<JobState>, Era5Error> {
        self.broker.fetch_status(fingerprint)
    }

    pub fn submit_or_reuse(
        &self,
        spec: &RequestSpec,
        target: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<SubmitResult, Era5Error> {
        sink.event(ProgressEvent {
            message: format!("phase=Canonicalize; {} -> {target}", spec.dataset()),
            elapsed: None,
        });
        let plan = SubmitPlan::new(spec, target)?;

        sink.event(ProgressEvent {
            message: format!("phase=Lookup; job {}", plan.fingerprint),
            elapsed: None,
        });
        let start = Instant::now();
        let existing = self.broker.fetch_status(&plan.fingerprint)?;
        sink.event(ProgressEvent {
            message: format!(
                "broker.status state={}",
                existing.map(|state| state.as_str()).unwrap_or("absent")
            ),
            elapsed: Some(start.elapsed()),
        });

        let mode = match existing {
            Some(state) if self.settings.blocks_resubmission(state) => {
                tracing::info!(job_id = %plan.fingerprint, %state, "reusing existing job");
                return Ok(SubmitResult {
                    dataset: spec.dataset(),
                    target: target.to_path_buf(),
                    action: SubmitAction::Reused,
                    job: JobHandle {
                        id: plan.fingerprint,
                        state,
                        created: false,
                    },
                });
            }
            Some(_) => EnqueueMode::Replace,
            None => EnqueueMode::CreateIfAbsent,
        };

        sink.event(ProgressEvent {
            message: format!("phase=Enqueue; queue {}", self.settings.queue),
            elapsed: None,
        });
        let start = Instant::now();
        let request = EnqueueRequest {
            job_id: plan.fingerprint,
            description: target.to_string(),
            payload: plan.payload,
            queue: self.settings.queue.clone(),
            result_retention: self.settings.result_retention,
            failure_retention: self.settings.failure_retention,
            timeout: self.settings.job_timeout,
            mode,
        };
        let job = self.broker.enqueue(&request)?;
        sink.event(ProgressEvent {
            message: format!("broker.enqueue created={}", job.created),
            elapsed: Some(start.elapsed()),
        });

        let action = match (job.created, mode) {
            (false, _) => SubmitAction::Reused,
            (true, EnqueueMode::CreateIfAbsent) => SubmitAction::Enqueued,
            (true, EnqueueMode::Replace) => SubmitAction::Replaced,
        };
        tracing::info!(job_id = %job.id, state = %job.state, ?action, "submitted request");

        Ok(SubmitResult {
            dataset: spec.dataset(),
            target: target.to_path_buf(),
            action,
            job,
        })
    }
}
