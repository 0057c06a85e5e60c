//! Stop detection for moving (timer) time

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StrideError};
use crate::models::{Field, RecordsTable, Source};

/// Thresholds that decide when the athlete is stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingConfig {
    /// Samples at or below this speed are stopped
    pub stopped_speed_mps: f64,
    /// Stops shorter than this still count as moving time
    pub min_stop_seconds: f64,
}

impl Default for MovingConfig {
    fn default() -> Self {
        Self {
            stopped_speed_mps: 0.3,
            min_stop_seconds: 0.0,
        }
    }
}

impl MovingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.stopped_speed_mps.is_finite() && self.stopped_speed_mps >= 0.0) {
            return Err(StrideError::invalid(
                "moving detection",
                "stopped_speed_mps",
                self.stopped_speed_mps,
            ));
        }
        if !(self.min_stop_seconds.is_finite() && self.min_stop_seconds >= 0.0) {
            return Err(StrideError::invalid(
                "moving detection",
                "min_stop_seconds",
                self.min_stop_seconds,
            ));
        }
        Ok(())
    }
}

/// Time offsets and speeds of the samples that carry a time value
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedSamples {
    pub times: Vec<f64>,
    pub speeds: Vec<Option<f64>>,
}

impl SpeedSamples {
    /// Speeds come from the `speed` column, else from distance over time
    pub fn from_records(records: &RecordsTable) -> Result<Self> {
        if !records.has_column(Field::Time.name()) {
            return Err(StrideError::missing(Field::Time.name(), Source::Records));
        }

        let timed: Vec<_> = records.iter().filter(|r| r.time.is_some()).collect();
        let times: Vec<f64> = timed.iter().filter_map(|r| r.time).collect();

        let speeds = if records.has_column(Field::Speed.name()) {
            timed.iter().map(|r| r.speed).collect()
        } else if records.has_column(Field::Distance.name()) {
            let mut speeds = Vec::with_capacity(timed.len());
            speeds.push(None);
            for pair in timed.windows(2) {
                let speed = match (pair[0].distance, pair[1].distance, pair[0].time, pair[1].time) {
                    (Some(d0), Some(d1), Some(t0), Some(t1)) if t1 > t0 => Some((d1 - d0) / (t1 - t0)),
                    _ => None,
                };
                speeds.push(speed);
            }
            speeds
        } else {
            return Err(StrideError::missing(Field::Speed.name(), Source::Records));
        };

        Ok(Self { times, speeds })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Flag each sample as active or inactive.
///
/// Missing speeds inherit the previous state; leading gaps take the first
/// known state. A run of stopped samples is inactive when it lasts longer
/// than `min_stop_seconds`, measured up to the next moving sample (or the last
/// sample). With no minimum, every stopped sample is inactive.
pub fn active_samples(samples: &SpeedSamples, config: &MovingConfig) -> Vec<bool> {
    let first_known = samples
        .speeds
        .iter()
        .flatten()
        .next()
        .map(|&v| v <= config.stopped_speed_mps)
        .unwrap_or(false);

    let mut stopped = Vec::with_capacity(samples.len());
    let mut state = first_known;
    for speed in &samples.speeds {
        if let Some(v) = speed {
            state = *v <= config.stopped_speed_mps;
        }
        stopped.push(state);
    }

    let mut active = vec![true; samples.len()];
    let mut i = 0;
    while i < stopped.len() {
        if !stopped[i] {
            i += 1;
            continue;
        }
        let start = i;
        while i < stopped.len() && stopped[i] {
            i += 1;
        }
        let end_time = if i < stopped.len() {
            samples.times[i]
        } else {
            samples.times[i - 1]
        };
        let duration = end_time - samples.times[start];
        if config.min_stop_seconds <= 0.0 || duration > config.min_stop_seconds {
            active[start..i].iter_mut().for_each(|a| *a = false);
        }
    }
    active
}

/// Sum of the intervals whose two endpoints are both active
pub fn moving_time(samples: &SpeedSamples, config: &MovingConfig) -> f64 {
    let active = active_samples(samples, config);
    let total = samples
        .times
        .windows(2)
        .zip(active.windows(2))
        .filter(|(_, a)| a[0] && a[1])
        .fold(0.0, |acc, (t, _)| acc + (t[1] - t[0]));

    debug!(
        samples = samples.len(),
        inactive = active.iter().filter(|a| !**a).count(),
        moving_seconds = total,
        "Calculated moving time"
    );
    total
}
