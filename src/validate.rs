//! Normalization of user-supplied request fields.
//!
//! Calendar fields are range-checked and zero-padded, enumerated fields are
//! narrowed to the allowed set, and lat/lon boundary pairs collapse into a
//! single [`Area`]. Every list that leaves this module is deduplicated and
//! sorted so that the same logical request always normalizes identically.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::domain::Area;
use crate::error::Era5Error;

/// Half-open integer range `[min, max)` and the zero-padded width of its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
    pub width: usize,
}

pub const YEAR: Bounds = Bounds {
    min: 1979,
    max: 2021,
    width: 4,
};

pub const MONTH: Bounds = Bounds {
    min: 1,
    max: 13,
    width: 2,
};

pub const DAY: Bounds = Bounds {
    min: 1,
    max: 32,
    width: 2,
};

const LATITUDE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE: RangeInclusive<f64> = -180.0..=180.0;

/// A field that was narrowed to its allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub field: String,
    pub dropped: Vec<String>,
    pub kept: Vec<String>,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "not all {} allowed; dropped [{}], kept [{}]",
            self.field,
            self.dropped.join(", "),
            self.kept.join(", ")
        )
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    notices: Vec<Notice>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `min <= x < max` for every candidate and renders the values
    /// zero-padded. An omitted field expands to the whole range.
    pub fn check_range(
        &self,
        field: &str,
        candidates: Option<&[i64]>,
        bounds: Bounds,
    ) -> Result<Vec<String>, Era5Error> {
        let values: BTreeSet<i64> = match candidates {
            None => (bounds.min..bounds.max).collect(),
            Some(candidates) => {
                if let Some(&value) = candidates
                    .iter()
                    .find(|&&value| value < bounds.min || value >= bounds.max)
                {
                    return Err(Era5Error::OutOfRange {
                        field: field.to_string(),
                        value,
                        min: bounds.min,
                        max: bounds.max,
                    });
                }
                candidates.iter().copied().collect()
            }
        };
        if values.is_empty() {
            return Err(Era5Error::NoAllowedValues(field.to_string()));
        }
        Ok(values
            .into_iter()
            .map(|value| format!("{value:0width$}", width = bounds.width))
            .collect())
    }

    /// Intersects the candidates with the allowed set.
    ///
    /// An empty intersection fails; a partial one succeeds with the narrowed
    /// values and records a [`Notice`].
    pub fn check_membership<T>(
        &mut self,
        field: &str,
        candidates: &[T],
        allowed: &[T],
    ) -> Result<Vec<T>, Era5Error>
    where
        T: Ord + Clone + fmt::Display,
    {
        let allowed: BTreeSet<&T> = allowed.iter().collect();
        let mut kept = BTreeSet::new();
        let mut dropped = BTreeSet::new();
        for candidate in candidates {
            if allowed.contains(candidate) {
                kept.insert(candidate.clone());
            } else {
                dropped.insert(candidate.clone());
            }
        }

        if kept.is_empty() {
            return Err(Era5Error::NoAllowedValues(field.to_string()));
        }

        if !dropped.is_empty() {
            let notice = Notice {
                field: field.to_string(),
                dropped: dropped.iter().map(ToString::to_string).collect(),
                kept: kept.iter().map(ToString::to_string).collect(),
            };
            tracing::warn!(field, dropped = ?notice.dropped, kept = ?notice.kept, "narrowed request field");
            self.notices.push(notice);
        }

        Ok(kept.into_iter().collect())
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn into_notices(self) -> Vec<Notice> {
        self.notices
    }
}

/// Collapses optional boundary pairs into an area. The larger endpoint of a
/// pair is the north/east bound whatever order the pair was given in.
pub fn resolve_area(
    lat_boundary: Option<(f64, f64)>,
    lon_boundary: Option<(f64, f64)>,
) -> Result<Area, Era5Error> {
    let mut area = Area::GLOBE;
    if let Some((a, b)) = lat_boundary {
        check_axis("latitude", &LATITUDE, a)?;
        check_axis("latitude", &LATITUDE, b)?;
        area.north = unsigned_zero(a.max(b));
        area.south = unsigned_zero(a.min(b));
    }
    if let Some((a, b)) = lon_boundary {
        check_axis("longitude", &LONGITUDE, a)?;
        check_axis("longitude", &LONGITUDE, b)?;
        area.east = unsigned_zero(a.max(b));
        area.west = unsigned_zero(a.min(b));
    }
    Ok(area)
}

/// `-0.0` and `0.0` are the same bound but serialize differently.
fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn check_axis(axis: &str, range: &RangeInclusive<f64>, value: f64) -> Result<(), Era5Error> {
    if !range.contains(&value) {
        return Err(Era5Error::AreaOutOfRange {
            axis: axis.to_string(),
            value,
        });
    }
    Ok(())
}
