use chrono::{DateTime, Duration, Utc};

use super::{stat_label, unsupported, FieldAccessor};
use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::models::{Field, Source};

/// Absolute start and end instants
#[derive(Debug, Clone, Copy)]
pub struct Timestamp<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Timestamp<'a> {
    const FIELD: Field = Field::Timestamp;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Timestamp<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    fn summary_instant(&self, stat: &str) -> Result<DateTime<Utc>> {
        self.summary()
            .timestamp(stat)
            .ok_or_else(|| StrideError::missing(stat_label(Field::Timestamp, stat), Source::Summary))
    }

    fn lap_instants(&self, stat: &str) -> Vec<Option<DateTime<Utc>>> {
        self.laps().iter().map(|lap| lap.timestamp(stat)).collect()
    }

    fn missing_in_laps(stat: &str) -> StrideError {
        StrideError::missing(stat_label(Field::Timestamp, stat), Source::Laps)
    }

    /// Start instant: first record, summary `timestamp_start`, or first lap start
    pub fn start(&self, source: Source) -> Result<DateTime<Utc>> {
        match source {
            Source::Records => self
                .activity
                .time_span()
                .map(|(start, _)| start)
                .ok_or_else(|| StrideError::missing(Field::Timestamp.name(), Source::Records)),
            Source::Summary => self.summary_instant("start"),
            Source::Laps => self
                .lap_instants("start")
                .into_iter()
                .flatten()
                .next()
                .ok_or_else(|| Self::missing_in_laps("start")),
            Source::Position => Err(unsupported(Field::Timestamp, "start", source)),
        }
    }

    /// End instant: last record, summary `timestamp_end`, or last lap end
    pub fn end(&self, source: Source) -> Result<DateTime<Utc>> {
        match source {
            Source::Records => self
                .activity
                .time_span()
                .map(|(_, end)| end)
                .ok_or_else(|| StrideError::missing(Field::Timestamp.name(), Source::Records)),
            Source::Summary => self.summary_instant("end"),
            Source::Laps => self
                .lap_instants("end")
                .into_iter()
                .flatten()
                .last()
                .ok_or_else(|| Self::missing_in_laps("end")),
            Source::Position => Err(unsupported(Field::Timestamp, "end", source)),
        }
    }

    /// Wall-clock duration. For laps, the sum of each lap's own span.
    pub fn elapsed(&self, source: Source) -> Result<Duration> {
        match source {
            Source::Records | Source::Summary => Ok(self.end(source)? - self.start(source)?),
            Source::Laps => {
                let starts = self.lap_instants("start");
                let ends = self.lap_instants("end");
                if starts.iter().all(Option::is_none) {
                    return Err(Self::missing_in_laps("start"));
                }
                if ends.iter().all(Option::is_none) {
                    return Err(Self::missing_in_laps("end"));
                }
                Ok(starts
                    .into_iter()
                    .zip(ends)
                    .filter_map(|(start, end)| Some(end? - start?))
                    .fold(Duration::zero(), |total, lap| total + lap))
            }
            Source::Position => Err(unsupported(Field::Timestamp, "elapsed", source)),
        }
    }
}
