//! Per-field accessors over an [`Activity`]
//!
//! Each accessor is a borrowed view: it reads the activity's records, laps
//! and summary on demand and never caches results.

pub mod cadence;
pub mod distance;
pub mod elevation;
pub mod grade;
pub mod heartrate;
pub mod position;
pub mod power;
pub mod speed;
pub mod time;
pub mod timestamp;

pub use cadence::Cadence;
pub use distance::Distance;
pub use elevation::{gain_threshold, Elevation, ElevationConfig};
pub use grade::Grade;
pub use heartrate::Heartrate;
pub use position::{semicircles_to_degrees, Lat, Lon};
pub use power::Power;
pub use speed::Speed;
pub use time::Time;
pub use timestamp::Timestamp;

use statrs::statistics::Statistics;

use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::models::{Field, Source, Stats};

/// Behavior shared by every field accessor
pub trait FieldAccessor<'a> {
    /// Column and stat label this accessor reads
    const FIELD: Field;

    fn activity(&self) -> &'a Activity;

    /// Records column, `None` when no sample carries a value
    fn stream(&self) -> Option<Vec<Option<f64>>> {
        self.activity().records().column(Self::FIELD)
    }

    /// Present values of the records column
    fn values(&self) -> Result<Vec<f64>> {
        let stream = self
            .stream()
            .ok_or_else(|| StrideError::missing(Self::FIELD.name(), Source::Records))?;
        Ok(stream.into_iter().flatten().collect())
    }

    /// Each lap's stats for this field, keyed by stat name
    fn laps(&self) -> Vec<Stats> {
        self.activity()
            .laps()
            .iter()
            .map(|lap| lap.field_view(Self::FIELD.name()))
            .collect()
    }

    /// Summary stats for this field, keyed by stat name
    fn summary(&self) -> Stats {
        self.activity().summary().field_view(Self::FIELD.name())
    }

    /// Numeric summary stat, e.g. `elevation_gain` for stat `gain`
    fn summary_stat(&self, stat: &str) -> Result<f64> {
        self.summary()
            .number(stat)
            .ok_or_else(|| StrideError::missing(stat_label(Self::FIELD, stat), Source::Summary))
    }

    /// Sum of a stat over the laps that report it
    fn laps_sum(&self, stat: &str) -> Result<f64> {
        let values = self.lap_values(stat)?;
        Ok(values.iter().sum())
    }

    /// Largest value of a stat over the laps that report it
    fn laps_max(&self, stat: &str) -> Result<f64> {
        let values = self.lap_values(stat)?;
        Ok(Statistics::max(values.iter()))
    }

    fn lap_values(&self, stat: &str) -> Result<Vec<f64>> {
        let values: Vec<f64> = self
            .laps()
            .iter()
            .filter_map(|lap| lap.number(stat))
            .collect();
        if values.is_empty() {
            return Err(StrideError::missing(
                stat_label(Self::FIELD, stat),
                Source::Laps,
            ));
        }
        Ok(values)
    }

    /// Mean from the records column or the summary `avg` stat
    fn mean(&self, source: Source) -> Result<f64> {
        match source {
            Source::Records => {
                let values = self.values()?;
                if values.is_empty() {
                    return Err(StrideError::missing(Self::FIELD.name(), Source::Records));
                }
                Ok(Statistics::mean(values.iter()))
            }
            Source::Summary => self.summary_stat("avg"),
            other => Err(unsupported(Self::FIELD, "mean", other)),
        }
    }

    /// Maximum from the records column, the summary `max` stat or the laps' `max` stats
    fn max(&self, source: Source) -> Result<f64> {
        match source {
            Source::Records => {
                let values = self.values()?;
                if values.is_empty() {
                    return Err(StrideError::missing(Self::FIELD.name(), Source::Records));
                }
                Ok(Statistics::max(values.iter()))
            }
            Source::Summary => self.summary_stat("max"),
            Source::Laps => self.laps_max("max"),
            Source::Position => Err(unsupported(Self::FIELD, "max", Source::Position)),
        }
    }
}

/// Full label of a field stat as stored in laps and summary
pub(crate) fn stat_label(field: Field, stat: &str) -> String {
    format!("{}_{}", field.name(), stat)
}

pub(crate) fn unsupported(field: Field, operation: &str, source: Source) -> StrideError {
    StrideError::invalid(format!("{} {}", field.name(), operation), "source", source)
}
