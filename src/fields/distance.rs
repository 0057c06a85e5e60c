use geo::{Distance as _, Haversine, Point};

use super::{unsupported, FieldAccessor};
use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::models::{Field, Source};

/// Cumulative distance, in meters
#[derive(Debug, Clone, Copy)]
pub struct Distance<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Distance<'a> {
    const FIELD: Field = Field::Distance;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Distance<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    /// Cumulative great-circle distance along the GPS track, aligned with the records.
    ///
    /// The first sample is at 0 m. Samples without coordinates repeat the
    /// previous distance.
    pub fn records_from_position(&self) -> Result<Vec<f64>> {
        let records = self.activity.records();
        for field in [Field::Lat, Field::Lon] {
            if !records.has_column(field.name()) {
                return Err(StrideError::missing(field.name(), Source::Records));
            }
        }

        let mut total = 0.0;
        let mut last: Option<Point<f64>> = None;
        let distances = records
            .iter()
            .map(|r| {
                if let (Some(lat), Some(lon)) = (r.lat, r.lon) {
                    let point = Point::new(lon, lat);
                    if let Some(prev) = last {
                        total += Haversine.distance(prev, point);
                    }
                    last = Some(point);
                }
                total
            })
            .collect();

        Ok(distances)
    }

    /// Total distance in meters.
    ///
    /// - `Records`: last distance value
    /// - `Summary`: `distance_total`
    /// - `Laps`: sum of `distance_total`
    /// - `Position`: last value of [`Distance::records_from_position`]
    pub fn total(&self, source: Source) -> Result<f64> {
        match source {
            Source::Records => self
                .values()?
                .last()
                .copied()
                .ok_or_else(|| StrideError::missing(Field::Distance.name(), Source::Records)),
            Source::Summary => self.summary_stat("total"),
            Source::Laps => self.laps_sum("total"),
            Source::Position => self
                .records_from_position()?
                .last()
                .copied()
                .ok_or_else(|| unsupported(Field::Distance, "total", source)),
        }
    }
}
