use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::broker::{DEFAULT_JOB_TIMEOUT, DEFAULT_QUEUE, DEFAULT_RETENTION};
use crate::domain::Dataset;
use crate::error::Era5Error;
use crate::request::RawRequest;
use crate::submit::SubmitSettings;

pub const CONFIG_FILE: &str = "era5-rq.json";
pub const DEFAULT_BROKER_URL: &str = "redis://redis/";
pub const BROKER_URL_ENV: &str = "ERA5_RQ_REDIS_URL";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub requests: Vec<RequestEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub result_ttl_secs: Option<u64>,
    #[serde(default)]
    pub failure_ttl_secs: Option<u64>,
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,
    #[serde(default)]
    pub resubmit_started: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RequestEntry {
    pub dataset: Dataset,
    pub target: Utf8PathBuf,
    #[serde(flatten)]
    pub fields: RawRequest,
}

#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub dataset: Dataset,
    pub target: Utf8PathBuf,
    pub raw: RawRequest,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub broker_url: String,
    pub settings: SubmitSettings,
    pub requests: Vec<ResolvedRequest>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the config from `path`, or from `./era5-rq.json`, or from the
    /// user config directory, in that order. The broker URL environment
    /// variable overrides the file.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, Era5Error> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => Self::discover().ok_or(Era5Error::MissingConfig)?,
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| Era5Error::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| Era5Error::ConfigParse(err.to_string()))?;

        let mut resolved = Self::resolve_config(config);
        if let Some(url) = broker_url_from_env() {
            resolved.broker_url = url;
        }
        Ok(resolved)
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let broker = config.broker;
        let settings = SubmitSettings {
            queue: broker.queue.unwrap_or_else(|| DEFAULT_QUEUE.to_string()),
            result_retention: broker
                .result_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RETENTION),
            failure_retention: broker
                .failure_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RETENTION),
            job_timeout: broker
                .job_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_JOB_TIMEOUT),
            resubmit_started: broker.resubmit_started.unwrap_or(false),
        };

        let requests = config
            .requests
            .into_iter()
            .map(|entry| ResolvedRequest {
                dataset: entry.dataset,
                target: entry.target,
                raw: entry.fields,
            })
            .collect();

        ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            broker_url: broker
                .url
                .unwrap_or_else(|| DEFAULT_BROKER_URL.to_string()),
            settings,
            requests,
        }
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("era5-rq").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }
}

pub fn broker_url_from_env() -> Option<String> {
    std::env::var(BROKER_URL_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Broker URL used when no config file is given.
pub fn default_broker_url() -> String {
    broker_url_from_env().unwrap_or_else(|| DEFAULT_BROKER_URL.to_string())
}
