use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Era5Error {
    #[error("{field} value {value} is out of range [{min}, {max})")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{axis} boundary {value} is outside the valid range")]
    AreaOutOfRange { axis: String, value: f64 },

    #[error("none of the requested {0} values are allowed")]
    NoAllowedValues(String),

    #[error("at least one variable is required")]
    MissingVariable,

    #[error("dataset {dataset} does not accept the field {field}")]
    UnsupportedField { dataset: String, field: String },

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("broker returned an unexpected value: {0}")]
    BrokerProtocol(String),

    #[error("failed to serialize request: {0}")]
    Serialization(String),

    #[error("missing config file era5-rq.json")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}

impl Era5Error {
    /// True for errors raised while building a request, before any broker call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Era5Error::OutOfRange { .. }
                | Era5Error::AreaOutOfRange { .. }
                | Era5Error::NoAllowedValues(_)
                | Era5Error::MissingVariable
                | Era5Error::UnsupportedField { .. }
                | Era5Error::InvalidDataset(_)
                | Era5Error::InvalidFingerprint(_)
        )
    }

    pub fn is_broker(&self) -> bool {
        matches!(
            self,
            Era5Error::BrokerUnavailable(_) | Era5Error::BrokerProtocol(_)
        )
    }
}

impl From<redis::RedisError> for Era5Error {
    fn from(err: redis::RedisError) -> Self {
        Era5Error::BrokerUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for Era5Error {
    fn from(err: serde_json::Error) -> Self {
        Era5Error::Serialization(err.to_string())
    }
}
