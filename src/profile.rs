use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalForm;
use crate::domain::Dataset;
use crate::error::Era5Error;
use crate::request::{ExtraFields, RawRequest, RequestSpec};
use crate::validate::{DAY, Validator};
use crate::variables::{PRESSURE_LEVEL_VARIABLES, PRESSURE_LEVELS, SINGLE_LEVEL_VARIABLES};

/// Retrieval payload in the shape the archive client expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivePayload {
    pub name: String,
    pub request: CanonicalForm,
    pub target: Utf8PathBuf,
}

impl Dataset {
    pub fn allowed_variables(&self) -> &'static [&'static str] {
        match self {
            Dataset::PressureLevels => PRESSURE_LEVEL_VARIABLES,
            Dataset::SingleLevels => SINGLE_LEVEL_VARIABLES,
        }
    }

    /// Validates the fields only some datasets define.
    pub fn validate_extra(
        &self,
        raw: &RawRequest,
        validator: &mut Validator,
    ) -> Result<ExtraFields, Era5Error> {
        let day = validator.check_range("day", raw.day.as_deref(), DAY)?;
        match self {
            Dataset::PressureLevels => {
                let requested = raw
                    .pressure_level
                    .clone()
                    .unwrap_or_else(|| PRESSURE_LEVELS.to_vec());
                let levels =
                    validator.check_membership("pressure_level", &requested, PRESSURE_LEVELS)?;
                Ok(ExtraFields {
                    day: Some(day),
                    pressure_level: Some(levels.iter().map(u32::to_string).collect()),
                })
            }
            Dataset::SingleLevels => {
                if raw.pressure_level.is_some() {
                    return Err(Era5Error::UnsupportedField {
                        dataset: self.to_string(),
                        field: "pressure_level".to_string(),
                    });
                }
                Ok(ExtraFields {
                    day: Some(day),
                    pressure_level: None,
                })
            }
        }
    }

    pub fn build_request_payload(&self, spec: &RequestSpec, target: &Utf8Path) -> ArchivePayload {
        ArchivePayload {
            name: self.name().to_string(),
            request: CanonicalForm::from_spec(spec),
            target: target.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pressure_levels_default_to_every_level() {
        let raw = RawRequest::new(["temperature"]);
        let mut validator = Validator::new();
        let extra = Dataset::PressureLevels
            .validate_extra(&raw, &mut validator)
            .unwrap();
        assert_eq!(extra.pressure_level.map(|levels| levels.len()), Some(37));
    }

    #[test]
    fn unknown_pressure_levels_are_dropped() {
        let raw = RawRequest {
            pressure_level: Some(vec![800, 801]),
            ..RawRequest::new(["temperature"])
        };
        let mut validator = Validator::new();
        let extra = Dataset::PressureLevels
            .validate_extra(&raw, &mut validator)
            .unwrap();
        assert_eq!(extra.pressure_level, Some(vec!["800".to_string()]));
        assert_eq!(validator.notices()[0].dropped, vec!["801"]);
    }

    #[test]
    fn single_levels_reject_pressure_level() {
        let raw = RawRequest {
            pressure_level: Some(vec![500]),
            ..RawRequest::new(["2m_temperature"])
        };
        let mut validator = Validator::new();
        let err = Dataset::SingleLevels
            .validate_extra(&raw, &mut validator)
            .unwrap_err();
        assert_matches!(err, Era5Error::UnsupportedField { .. });
    }

    #[test]
    fn payload_nests_request_under_archive_name() {
        let raw = RawRequest {
            year: Some(vec![1986]),
            ..RawRequest::new(["temperature"])
        };
        let spec = RequestSpec::build(Dataset::PressureLevels, &raw).unwrap().spec;
        let payload = Dataset::PressureLevels
            .build_request_payload(&spec, Utf8Path::new("/downloads/redic.nc"));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["name"], "reanalysis-era5-pressure-levels");
        assert_eq!(json["target"], "/downloads/redic.nc");
        assert_eq!(json["request"]["year"], serde_json::json!(["1986"]));
        assert_eq!(json["request"]["format"], "netcdf");
    }
}
