use tracing::debug;

use super::{unsupported, FieldAccessor};
use crate::activity::Activity;
use crate::error::{OptionalField, Result, StrideError};
use crate::models::{Field, Source};
use crate::moving::{moving_time, MovingConfig, SpeedSamples};

/// Elapsed and moving time, in seconds
#[derive(Debug, Clone, Copy)]
pub struct Time<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Time<'a> {
    const FIELD: Field = Field::Time;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Time<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    /// Seconds since the first timestamp, aligned with the records
    pub fn records_from_timestamps(&self) -> Result<Vec<Option<f64>>> {
        let timestamps = self
            .activity
            .records()
            .timestamps()
            .ok_or_else(|| StrideError::missing(Field::Timestamp.name(), Source::Records))?;

        let start = timestamps
            .iter()
            .flatten()
            .next()
            .copied()
            .ok_or_else(|| StrideError::missing(Field::Timestamp.name(), Source::Records))?;

        Ok(timestamps
            .into_iter()
            .map(|ts| ts.map(|ts| (ts - start).num_milliseconds() as f64 / 1000.0))
            .collect())
    }

    /// Elapsed time in seconds.
    ///
    /// - `Records`: last minus first `time` value
    /// - `Summary`: `time_elapsed`, else the summary's timestamp span
    /// - `Laps`: sum of `time_elapsed`
    pub fn elapsed(&self, source: Source) -> Result<f64> {
        match source {
            Source::Records => {
                let times = self.values()?;
                if times.len() < 2 {
                    return Err(StrideError::insufficient(
                        "elapsed time",
                        format!("{} time value(s), need at least 2", times.len()),
                    ));
                }
                Ok(times[times.len() - 1] - times[0])
            }
            Source::Summary => match self.summary_stat("elapsed").optional()? {
                Some(elapsed) => Ok(elapsed),
                None => {
                    let span = self
                        .activity
                        .timestamp()
                        .elapsed(Source::Summary)
                        .map_err(|_| StrideError::missing("time_elapsed", Source::Summary))?;
                    Ok(span.num_milliseconds() as f64 / 1000.0)
                }
            },
            Source::Laps => self.laps_sum("elapsed"),
            Source::Position => Err(unsupported(Field::Time, "elapsed", source)),
        }
    }

    /// Moving (timer) time in seconds with the default stop detection
    pub fn timer(&self, source: Source) -> Result<f64> {
        self.timer_with(source, &MovingConfig::default())
    }

    /// Moving (timer) time in seconds.
    ///
    /// - `Records`: sum of intervals where the athlete was moving
    /// - `Summary`: `time_timer`
    /// - `Laps`: sum of `time_timer`
    pub fn timer_with(&self, source: Source, config: &MovingConfig) -> Result<f64> {
        match source {
            Source::Records => {
                config.validate()?;
                let samples = SpeedSamples::from_records(self.activity.records())?;
                Ok(moving_time(&samples, config))
            }
            Source::Summary => self.summary_stat("timer"),
            Source::Laps => self.laps_sum("timer"),
            Source::Position => Err(unsupported(Field::Time, "timer", source)),
        }
    }

    /// Duration used for training stress: moving time from the records, or
    /// elapsed time when there is no speed source for stop detection
    pub fn training_duration(&self, config: &MovingConfig) -> Result<f64> {
        match self.timer_with(Source::Records, config) {
            Err(StrideError::MissingField { field, .. }) if field != Field::Time.name() => {
                debug!(missing = %field, "No speed source for moving time, using elapsed time");
                self.elapsed(Source::Records)
            }
            other => other,
        }
    }
}
