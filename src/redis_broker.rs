use std::time::Duration;

use chrono::Utc;
use redis::{Client, Commands, Connection, Script};

use crate::broker::{Broker, EnqueueMode, EnqueueRequest, JobHandle};
use crate::domain::{Fingerprint, JobState};
use crate::error::Era5Error;

const JOB_PREFIX: &str = "rq:job:";
const QUEUE_PREFIX: &str = "rq:queue:";
const QUEUES_KEY: &str = "rq:queues";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Claims and writes a job in one step.
///
/// KEYS: job hash, queue list, queue registry.
/// ARGV: replace flag, job id, then field/value pairs of the job body.
/// Returns `{created, status}`.
const CREATE_JOB_SCRIPT: &str = r"
if ARGV[1] == '1' then
    redis.call('DEL', KEYS[1])
end
local status = redis.call('HGET', KEYS[1], 'status')
if status then
    return {0, status}
end
redis.call('HSET', KEYS[1], 'status', 'queued', unpack(ARGV, 3))
redis.call('RPUSH', KEYS[2], ARGV[2])
redis.call('SADD', KEYS[3], KEYS[2])
return {1, 'queued'}
";

/// Job records stored as Redis hashes under `rq:job:<id>`.
///
/// A connection is opened per call; the client itself holds no connection
/// state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct RedisBroker {
    client: Client,
}

/// Keys and arguments of one invocation of the job creation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateJob {
    pub keys: [String; 3],
    pub args: Vec<String>,
}

impl CreateJob {
    pub fn new(request: &EnqueueRequest, enqueued_at: &str) -> Result<Self, Era5Error> {
        let queue_key = RedisBroker::queue_key(&request.queue);
        let replace = match request.mode {
            EnqueueMode::CreateIfAbsent => "0",
            EnqueueMode::Replace => "1",
        };
        let fields = [
            ("data", serde_json::to_string(&request.payload)?),
            ("description", request.description.clone()),
            ("origin", request.queue.clone()),
            ("enqueued_at", enqueued_at.to_string()),
            ("timeout", request.timeout.as_secs().to_string()),
            ("result_ttl", request.result_retention.as_secs().to_string()),
            ("failure_ttl", request.failure_retention.as_secs().to_string()),
        ];

        let mut args = vec![replace.to_string(), request.job_id.to_string()];
        for (field, value) in fields {
            args.push(field.to_string());
            args.push(value);
        }

        Ok(Self {
            keys: [
                RedisBroker::job_key(&request.job_id),
                queue_key,
                QUEUES_KEY.to_string(),
            ],
            args,
        })
    }
}

/// Decodes the `{created, status}` reply of the creation script.
pub fn parse_create_reply(
    job_id: &Fingerprint,
    created: i64,
    status: &str,
) -> Result<JobHandle, Era5Error> {
    let created = match created {
        0 => false,
        1 => true,
        other => {
            return Err(Era5Error::BrokerProtocol(format!(
                "unexpected creation flag {other}"
            )));
        }
    };
    Ok(JobHandle {
        id: job_id.clone(),
        state: status.parse()?,
        created,
    })
}

impl RedisBroker {
    pub fn new(url: &str) -> Result<Self, Era5Error> {
        let client = Client::open(url)?;
        Ok(Self { client })
    }

    pub fn job_key(job_id: &Fingerprint) -> String {
        format!("{JOB_PREFIX}{job_id}")
    }

    pub fn queue_key(queue: &str) -> String {
        format!("{QUEUE_PREFIX}{queue}")
    }

    fn connection(&self) -> Result<Connection, Era5Error> {
        Ok(self.client.get_connection_with_timeout(CONNECT_TIMEOUT)?)
    }

    fn read_state(conn: &mut Connection, key: &str) -> Result<Option<JobState>, Era5Error> {
        let status: Option<String> = conn.hget(key, "status")?;
        status.map(|value| value.parse()).transpose()
    }
}

impl Broker for RedisBroker {
    fn fetch_status(&self, job_id: &Fingerprint) -> Result<Option<JobState>, Era5Error> {
        let mut conn = self.connection()?;
        let state = Self::read_state(&mut conn, &Self::job_key(job_id))?;
        tracing::debug!(job_id = %job_id, state = ?state, "fetched job status");
        Ok(state)
    }

    fn enqueue(&self, request: &EnqueueRequest) -> Result<JobHandle, Era5Error> {
        let enqueued_at = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
        let command = CreateJob::new(request, &enqueued_at)?;

        let mut conn = self.connection()?;
        let script = Script::new(CREATE_JOB_SCRIPT);
        let mut invocation = script.prepare_invoke();
        for key in &command.keys {
            invocation.key(key);
        }
        for arg in &command.args {
            invocation.arg(arg);
        }
        let (created, status): (i64, String) = invocation.invoke(&mut conn)?;

        let handle = parse_create_reply(&request.job_id, created, &status)?;
        tracing::debug!(
            job_id = %handle.id,
            queue = %request.queue,
            created = handle.created,
            state = %handle.state,
            "enqueue finished"
        );
        Ok(handle)
    }
}
