//! Validated ERA5 retrieval requests, submitted once per distinct request.
//!
//! A [`request::RawRequest`] is normalized by a dataset profile into an
//! immutable [`request::RequestSpec`]; its canonical form yields a
//! [`domain::Fingerprint`] that keys the job in the broker, so re-issuing the
//! same logical request reuses the existing job instead of downloading again.

pub mod broker;
pub mod canonical;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod profile;
pub mod redis_broker;
pub mod request;
pub mod submit;
pub mod validate;
pub mod variables;
