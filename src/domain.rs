use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Era5Error;

/// Output format requested from the archive for every dataset.
pub const FORMAT: &str = "netcdf";
/// Product type requested from the archive for every dataset.
pub const PRODUCT_TYPE: &str = "reanalysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    PressureLevels,
    SingleLevels,
}

impl Dataset {
    /// Dataset identifier used by the remote archive.
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::PressureLevels => "reanalysis-era5-pressure-levels",
            Dataset::SingleLevels => "reanalysis-era5-single-levels",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::PressureLevels => write!(f, "pressure-levels"),
            Dataset::SingleLevels => write!(f, "single-levels"),
        }
    }
}

impl FromStr for Dataset {
    type Err = Era5Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "pressure-levels" | "reanalysis-era5-pressure-levels" => Ok(Dataset::PressureLevels),
            "single-levels" | "reanalysis-era5-single-levels" => Ok(Dataset::SingleLevels),
            _ => Err(Era5Error::InvalidDataset(value.to_string())),
        }
    }
}

/// Bounding box in degrees, ordered north, west, south, east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct Area {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
}

impl Area {
    pub const GLOBE: Area = Area {
        north: 90.0,
        west: -180.0,
        south: -90.0,
        east: 180.0,
    };

    pub fn as_array(&self) -> [f64; 4] {
        [self.north, self.west, self.south, self.east]
    }
}

impl Default for Area {
    fn default() -> Self {
        Area::GLOBE
    }
}

impl From<Area> for [f64; 4] {
    fn from(area: Area) -> Self {
        area.as_array()
    }
}

impl From<[f64; 4]> for Area {
    fn from(bounds: [f64; 4]) -> Self {
        Area {
            north: bounds[0],
            west: bounds[1],
            south: bounds[2],
            east: bounds[3],
        }
    }
}

/// Content identity of a canonical request: lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub const LEN: usize = 64;

    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = Era5Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let is_valid = normalized.len() == Self::LEN
            && normalized.chars().all(|ch| ch.is_ascii_hexdigit());
        if !is_valid {
            return Err(Era5Error::InvalidFingerprint(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Lifecycle state of a job as reported by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Started,
    Finished,
    Failed,
    Deferred,
    Scheduled,
    Stopped,
    Canceled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Started => "started",
            JobState::Finished => "finished",
            JobState::Failed => "failed",
            JobState::Deferred => "deferred",
            JobState::Scheduled => "scheduled",
            JobState::Stopped => "stopped",
            JobState::Canceled => "canceled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = Era5Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "queued" => Ok(JobState::Queued),
            "started" => Ok(JobState::Started),
            "finished" => Ok(JobState::Finished),
            "failed" => Ok(JobState::Failed),
            "deferred" => Ok(JobState::Deferred),
            "scheduled" => Ok(JobState::Scheduled),
            "stopped" => Ok(JobState::Stopped),
            "canceled" => Ok(JobState::Canceled),
            other => Err(Era5Error::BrokerProtocol(format!("unknown job status {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_dataset_short_and_archive_names() {
        assert_eq!(
            "pressure-levels".parse::<Dataset>().unwrap(),
            Dataset::PressureLevels
        );
        assert_eq!(
            "reanalysis-era5-single-levels".parse::<Dataset>().unwrap(),
            Dataset::SingleLevels
        );
        let err = "land".parse::<Dataset>().unwrap_err();
        assert_matches!(err, Era5Error::InvalidDataset(_));
    }

    #[test]
    fn area_serializes_as_bounds_array() {
        let json = serde_json::to_string(&Area::GLOBE).unwrap();
        assert_eq!(json, "[90.0,-180.0,-90.0,180.0]");
    }

    #[test]
    fn parse_fingerprint_normalizes_case() {
        let raw = "AB".repeat(32);
        let fp: Fingerprint = raw.parse().unwrap();
        assert_eq!(fp.as_str(), "ab".repeat(32));
    }

    #[test]
    fn parse_fingerprint_invalid() {
        let err = "not-a-hash".parse::<Fingerprint>().unwrap_err();
        assert_matches!(err, Era5Error::InvalidFingerprint(_));
    }

    #[test]
    fn job_state_unknown_is_protocol_error() {
        assert_eq!("started".parse::<JobState>().unwrap(), JobState::Started);
        let err = "exploded".parse::<JobState>().unwrap_err();
        assert_matches!(err, Era5Error::BrokerProtocol(_));
    }

    #[test]
    fn job_state_parses_every_queue_status() {
        let statuses = [
            ("queued", JobState::Queued),
            ("started", JobState::Started),
            ("finished", JobState::Finished),
            ("failed", JobState::Failed),
            ("deferred", JobState::Deferred),
            ("scheduled", JobState::Scheduled),
            ("stopped", JobState::Stopped),
            ("canceled", JobState::Canceled),
        ];
        for (status, state) in statuses {
            assert_eq!(status.parse::<JobState>().unwrap(), state);
            assert_eq!(state.as_str(), status);
        }
    }
}
