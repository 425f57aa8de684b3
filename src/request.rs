use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Area, Dataset};
use crate::error::Era5Error;
use crate::validate::{self, MONTH, Notice, Validator, YEAR};
use crate::variables;

/// Request fields as supplied by a caller, before validation.
///
/// Omitted calendar and time fields default to the dataset's full range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRequest {
    pub variable: Vec<String>,
    #[serde(default)]
    pub lat_boundary: Option<(f64, f64)>,
    #[serde(default)]
    pub lon_boundary: Option<(f64, f64)>,
    #[serde(default)]
    pub year: Option<Vec<i64>>,
    #[serde(default)]
    pub month: Option<Vec<i64>>,
    #[serde(default)]
    pub day: Option<Vec<i64>>,
    #[serde(default)]
    pub time: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_levels")]
    pub pressure_level: Option<Vec<u32>>,
}

/// A pressure level written either as a number or as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelInput {
    Number(u32),
    Text(String),
}

fn deserialize_levels<'de, D>(deserializer: D) -> Result<Option<Vec<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let levels: Option<Vec<LevelInput>> = Option::deserialize(deserializer)?;
    levels
        .map(|levels| {
            levels
                .into_iter()
                .map(|level| match level {
                    LevelInput::Number(value) => Ok(value),
                    LevelInput::Text(text) => text.trim().parse().map_err(|_| {
                        D::Error::custom(format!("invalid pressure level {text:?}"))
                    }),
                })
                .collect()
        })
        .transpose()
}

impl RawRequest {
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variable: variables.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// A validated request. Every list is range- or membership-checked,
/// deduplicated and sorted; the value cannot be changed after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    dataset: Dataset,
    variable: Vec<String>,
    area: Area,
    year: Vec<String>,
    month: Vec<String>,
    day: Option<Vec<String>>,
    time: Vec<String>,
    pressure_level: Option<Vec<String>>,
}

/// Dataset-specific fields produced by a profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields {
    pub day: Option<Vec<String>>,
    pub pressure_level: Option<Vec<String>>,
}

/// Outcome of a successful validation: the request plus any fields that were
/// narrowed on the way.
#[derive(Debug, Clone)]
pub struct Validated {
    pub spec: RequestSpec,
    pub notices: Vec<Notice>,
}

impl RequestSpec {
    pub fn build(dataset: Dataset, raw: &RawRequest) -> Result<Validated, Era5Error> {
        if raw.variable.is_empty() {
            return Err(Era5Error::MissingVariable);
        }

        let mut validator = Validator::new();
        let area = validate::resolve_area(raw.lat_boundary, raw.lon_boundary)?;
        let month = validator.check_range("month", raw.month.as_deref(), MONTH)?;
        let year = validator.check_range("year", raw.year.as_deref(), YEAR)?;

        let hours = variables::hours();
        let allowed_hours: Vec<&str> = hours.iter().map(String::as_str).collect();
        let requested_hours: Vec<&str> = match &raw.time {
            Some(time) => time.iter().map(String::as_str).collect(),
            None => allowed_hours.clone(),
        };
        let time = validator
            .check_membership("time", &requested_hours, &allowed_hours)?
            .into_iter()
            .map(str::to_string)
            .collect();

        let extra = dataset.validate_extra(raw, &mut validator)?;

        let requested_variables: Vec<&str> = raw.variable.iter().map(String::as_str).collect();
        let variable = validator
            .check_membership(
                "variable",
                &requested_variables,
                dataset.allowed_variables(),
            )?
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Validated {
            spec: RequestSpec {
                dataset,
                variable,
                area,
                year,
                month,
                day: extra.day,
                time,
                pressure_level: extra.pressure_level,
            },
            notices: validator.into_notices(),
        })
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn variable(&self) -> &[String] {
        &self.variable
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn year(&self) -> &[String] {
        &self.year
    }

    pub fn month(&self) -> &[String] {
        &self.month
    }

    pub fn day(&self) -> Option<&[String]> {
        self.day.as_deref()
    }

    pub fn time(&self) -> &[String] {
        &self.time
    }

    pub fn pressure_level(&self) -> Option<&[String]> {
        self.pressure_level.as_deref()
    }
}
