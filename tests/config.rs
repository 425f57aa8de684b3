use std::time::Duration;

use assert_matches::assert_matches;

use era5_requests::config::{Config, ConfigLoader, DEFAULT_BROKER_URL};
use era5_requests::domain::Dataset;
use era5_requests::error::Era5Error;
use era5_requests::request::RequestSpec;

const SAMPLE: &str = r#"{
    "schema_version": 1,
    "broker": {
        "url": "redis://queue.internal:6380/2",
        "queue": "era5",
        "result_ttl_secs": 86400,
        "job_timeout_secs": 7200
    },
    "requests": [
        {
            "dataset": "pressure-levels",
            "target": "/downloads/redic.nc",
            "variable": ["temperature"],
            "year": [1986],
            "month": [1],
            "day": [17],
            "time": ["11:00"],
            "pressure_level": [800]
        },
        {
            "dataset": "single-levels",
            "target": "/downloads/t2m.nc",
            "variable": ["2m_temperature"],
            "lon_boundary": [30, -20]
        }
    ]
}"#;

#[test]
fn loads_requests_and_broker_settings_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("era5-rq.json");
    std::fs::write(&path, SAMPLE).unwrap();

    let resolved = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(resolved.settings.queue, "era5");
    assert_eq!(resolved.settings.result_retention, Duration::from_secs(86_400));
    assert_eq!(
        resolved.settings.failure_retention,
        Duration::from_secs(31_536_000)
    );
    assert_eq!(resolved.settings.job_timeout, Duration::from_secs(7200));
    assert!(!resolved.settings.resubmit_started);
    assert_eq!(resolved.requests.len(), 2);

    let single = &resolved.requests[1];
    assert_eq!(single.dataset, Dataset::SingleLevels);
    let spec = RequestSpec::build(single.dataset, &single.raw).unwrap().spec;
    assert_eq!(spec.area().as_array(), [90.0, -20.0, -90.0, 30.0]);
}

#[test]
fn broker_url_defaults_to_queue_host() {
    let config: Config = serde_json::from_str(r#"{ "requests": [] }"#).unwrap();
    let resolved = ConfigLoader::resolve_config(config);
    assert_eq!(resolved.broker_url, DEFAULT_BROKER_URL);
}

#[test]
fn unreadable_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, Era5Error::ConfigRead(_));
}

#[test]
fn malformed_json_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("era5-rq.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, Era5Error::ConfigParse(_));
}

#[test]
fn pressure_levels_may_be_written_as_strings() {
    let config: Config = serde_json::from_str(
        r#"{ "requests": [{
            "dataset": "pressure-levels",
            "target": "t.nc",
            "variable": ["temperature"],
            "pressure_level": ["800", 500]
        }] }"#,
    )
    .unwrap();
    let resolved = ConfigLoader::resolve_config(config);
    let spec = RequestSpec::build(Dataset::PressureLevels, &resolved.requests[0].raw)
        .unwrap()
        .spec;
    assert_eq!(
        spec.pressure_level(),
        Some(&["500".to_string(), "800".to_string()][..])
    );
}

#[test]
fn unknown_dataset_is_a_parse_error() {
    let result = serde_json::from_str::<Config>(
        r#"{ "requests": [{ "dataset": "land", "target": "x.nc", "variable": ["t"] }] }"#,
    );
    assert!(result.is_err());
}
