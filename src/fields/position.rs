use statrs::statistics::Statistics;

use super::FieldAccessor;
use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::models::{Field, Source};

/// FIT files store coordinates as 32-bit semicircles
pub fn semicircles_to_degrees(semicircles: f64) -> f64 {
    semicircles * 180.0 / 2f64.powi(31)
}

/// Midpoint of a coordinate stream's extent
fn center_of<'a, A: FieldAccessor<'a>>(accessor: &A) -> Result<f64> {
    let values = accessor.values()?;
    if values.is_empty() {
        return Err(StrideError::missing(A::FIELD.name(), Source::Records));
    }
    Ok(0.5 * (Statistics::max(values.iter()) + Statistics::min(values.iter())))
}

/// Latitude, in degrees
#[derive(Debug, Clone, Copy)]
pub struct Lat<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Lat<'a> {
    const FIELD: Field = Field::Lat;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Lat<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    pub fn center(&self) -> Result<f64> {
        center_of(self)
    }
}

/// Longitude, in degrees
#[derive(Debug, Clone, Copy)]
pub struct Lon<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Lon<'a> {
    const FIELD: Field = Field::Lon;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Lon<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    pub fn center(&self) -> Result<f64> {
        center_of(self)
    }
}
