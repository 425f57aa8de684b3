use camino::Utf8Path;
use serde_json::json;

use era5_requests::canonical::CanonicalForm;
use era5_requests::domain::{Dataset, Fingerprint};
use era5_requests::request::{RawRequest, RequestSpec};
use era5_requests::submit::SubmitPlan;

fn fingerprint(dataset: Dataset, raw: &RawRequest) -> Fingerprint {
    let spec = RequestSpec::build(dataset, raw).unwrap().spec;
    CanonicalForm::from_spec(&spec).fingerprint().unwrap()
}

fn redic() -> RawRequest {
    RawRequest {
        variable: vec!["temperature".to_string()],
        year: Some(vec![1986]),
        month: Some(vec![1]),
        day: Some(vec![17]),
        time: Some(vec!["11:00".to_string()]),
        pressure_level: Some(vec![800]),
        ..RawRequest::default()
    }
}

#[test]
fn permutations_share_a_fingerprint() {
    let base = RawRequest {
        variable: vec!["temperature".to_string(), "geopotential".to_string()],
        year: Some(vec![1986, 1990, 2000]),
        month: Some(vec![1, 6, 12]),
        time: Some(vec!["00:00".to_string(), "12:00".to_string()]),
        ..RawRequest::default()
    };
    let permuted = RawRequest {
        variable: vec!["geopotential".to_string(), "temperature".to_string()],
        year: Some(vec![2000, 1986, 1990]),
        month: Some(vec![12, 1, 6]),
        time: Some(vec!["12:00".to_string(), "00:00".to_string()]),
        ..RawRequest::default()
    };
    assert_eq!(
        fingerprint(Dataset::PressureLevels, &base),
        fingerprint(Dataset::PressureLevels, &permuted)
    );
}

#[test]
fn narrowed_request_matches_already_valid_request() {
    let narrowed = RawRequest {
        time: Some(vec!["25:00".to_string(), "11:00".to_string()]),
        ..redic()
    };
    assert_eq!(
        fingerprint(Dataset::PressureLevels, &narrowed),
        fingerprint(Dataset::PressureLevels, &redic())
    );
}

#[test]
fn different_requests_have_different_fingerprints() {
    let other_year = RawRequest {
        year: Some(vec![1987]),
        ..redic()
    };
    assert_ne!(
        fingerprint(Dataset::PressureLevels, &redic()),
        fingerprint(Dataset::PressureLevels, &other_year)
    );
}

#[test]
fn negative_zero_boundary_shares_fingerprint() {
    let negative = RawRequest {
        lat_boundary: Some((-0.0, 10.0)),
        lon_boundary: Some((20.0, -0.0)),
        ..redic()
    };
    let positive = RawRequest {
        lat_boundary: Some((0.0, 10.0)),
        lon_boundary: Some((20.0, 0.0)),
        ..redic()
    };
    assert_eq!(
        fingerprint(Dataset::PressureLevels, &negative),
        fingerprint(Dataset::PressureLevels, &positive)
    );
}

#[test]
fn output_target_is_not_part_of_the_fingerprint() {
    let spec = RequestSpec::build(Dataset::PressureLevels, &redic())
        .unwrap()
        .spec;
    let a = SubmitPlan::new(&spec, Utf8Path::new("/downloads/redic.nc")).unwrap();
    let b = SubmitPlan::new(&spec, Utf8Path::new("redic.nc")).unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_ne!(a.payload.target, b.payload.target);
}

#[test]
fn end_to_end_canonical_form() {
    let spec = RequestSpec::build(Dataset::PressureLevels, &redic())
        .unwrap()
        .spec;
    let form = CanonicalForm::from_spec(&spec);
    assert_eq!(
        serde_json::to_value(&form).unwrap(),
        json!({
            "area": [90.0, -180.0, -90.0, 180.0],
            "day": ["17"],
            "format": "netcdf",
            "month": ["01"],
            "pressure_level": ["800"],
            "product_type": "reanalysis",
            "time": ["11:00"],
            "variable": ["temperature"],
            "year": ["1986"]
        })
    );

    // Same inputs assigned in a different order.
    let reordered = RawRequest {
        pressure_level: Some(vec![800]),
        time: Some(vec!["11:00".to_string()]),
        day: Some(vec![17]),
        month: Some(vec![1]),
        year: Some(vec![1986]),
        variable: vec!["temperature".to_string()],
        ..RawRequest::default()
    };
    let first = form.fingerprint().unwrap();
    assert_eq!(first, fingerprint(Dataset::PressureLevels, &reordered));
    assert_eq!(first, form.fingerprint().unwrap());
}

#[test]
fn single_levels_form_has_no_pressure_level() {
    let raw = RawRequest {
        year: Some(vec![2000]),
        ..RawRequest::new(["2m_temperature"])
    };
    let spec = RequestSpec::build(Dataset::SingleLevels, &raw).unwrap().spec;
    let form = CanonicalForm::from_spec(&spec);
    assert!(form.get("pressure_level").is_none());
    assert!(form.get("day").is_some());
}
