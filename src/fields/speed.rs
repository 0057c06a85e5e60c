use super::FieldAccessor;
use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::models::{Field, Source};

/// Speed, in meters per second
#[derive(Debug, Clone, Copy)]
pub struct Speed<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Speed<'a> {
    const FIELD: Field = Field::Speed;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Speed<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    /// Speed between consecutive samples from distance over time, aligned with the records.
    ///
    /// The first sample, samples missing either value, and zero-duration
    /// steps have no speed.
    pub fn records_from_distance(&self) -> Result<Vec<Option<f64>>> {
        let records = self.activity.records();
        for field in [Field::Time, Field::Distance] {
            if !records.has_column(field.name()) {
                return Err(StrideError::missing(field.name(), Source::Records));
            }
        }

        let mut speeds = Vec::with_capacity(records.len());
        speeds.extend(records.records().first().map(|_| None));
        speeds.extend(records.records().windows(2).map(|pair| {
            let dt = pair[1].time? - pair[0].time?;
            let dd = pair[1].distance? - pair[0].distance?;
            (dt > 0.0).then(|| dd / dt)
        }));
        Ok(speeds)
    }

    /// Speed stream from the records, derived from distance when the device recorded none
    pub fn records_or_derived(&self) -> Result<Vec<Option<f64>>> {
        match self.stream() {
            Some(stream) => Ok(stream),
            None => self.records_from_distance(),
        }
    }
}
