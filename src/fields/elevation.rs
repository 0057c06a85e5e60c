use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{unsupported, FieldAccessor};
use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::models::{Field, Source};
use crate::smoothing::ElevationSmoother;

/// Elevation gain/loss settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationConfig {
    /// Minimum change from the last counted point before it is counted, in meters
    pub gain_threshold_m: f64,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            gain_threshold_m: 5.0,
        }
    }
}

impl ElevationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.gain_threshold_m.is_finite() && self.gain_threshold_m >= 0.0) {
            return Err(StrideError::invalid(
                "elevation gain",
                "gain_threshold_m",
                self.gain_threshold_m,
            ));
        }
        Ok(())
    }
}

/// Total climb of an elevation series with a hysteresis threshold.
///
/// A change is counted once it is at least `threshold` away from the last
/// counted point, which then moves to the current sample. With a threshold
/// of 0 every rise is counted.
pub fn gain_threshold(elevation: &[f64], threshold: f64) -> f64 {
    let Some(&first) = elevation.first() else {
        return 0.0;
    };

    let mut gain = 0.0;
    let mut last = first;
    for &e in &elevation[1..] {
        let change = e - last;
        if change.abs() >= threshold {
            if change > 0.0 {
                gain += change;
            }
            last = e;
        }
    }
    gain
}

/// Elevation above sea level, in meters
#[derive(Debug, Clone, Copy)]
pub struct Elevation<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Elevation<'a> {
    const FIELD: Field = Field::Elevation;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Elevation<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    /// Elevation gain with the default threshold and no smoothing
    pub fn gain(&self, source: Source) -> Result<f64> {
        self.gain_with(source, &ElevationConfig::default(), None)
    }

    /// Elevation loss with the default threshold and no smoothing
    pub fn loss(&self, source: Source) -> Result<f64> {
        self.loss_with(source, &ElevationConfig::default(), None)
    }

    /// Elevation gain in meters.
    ///
    /// - `Records`: thresholded climb of the (optionally smoothed) elevation stream
    /// - `Summary`: `elevation_gain`
    /// - `Laps`: sum of `elevation_gain`
    pub fn gain_with(
        &self,
        source: Source,
        config: &ElevationConfig,
        smoother: Option<&dyn ElevationSmoother>,
    ) -> Result<f64> {
        match source {
            Source::Records => {
                let series = self.prepared_series(config, smoother)?;
                let gain = gain_threshold(&series, config.gain_threshold_m);
                debug!(samples = series.len(), gain, "Calculated elevation gain");
                Ok(gain)
            }
            Source::Summary => self.summary_stat("gain"),
            Source::Laps => self.laps_sum("gain"),
            Source::Position => Err(unsupported(Field::Elevation, "gain", source)),
        }
    }

    /// Elevation loss in meters, as a positive number. The records rule is
    /// the gain of the reversed series.
    pub fn loss_with(
        &self,
        source: Source,
        config: &ElevationConfig,
        smoother: Option<&dyn ElevationSmoother>,
    ) -> Result<f64> {
        match source {
            Source::Records => {
                let mut series = self.prepared_series(config, smoother)?;
                series.reverse();
                let loss = gain_threshold(&series, config.gain_threshold_m);
                debug!(samples = series.len(), loss, "Calculated elevation loss");
                Ok(loss)
            }
            Source::Summary => self.summary_stat("loss"),
            Source::Laps => self.laps_sum("loss"),
            Source::Position => Err(unsupported(Field::Elevation, "loss", source)),
        }
    }

    fn prepared_series(
        &self,
        config: &ElevationConfig,
        smoother: Option<&dyn ElevationSmoother>,
    ) -> Result<Vec<f64>> {
        config.validate()?;
        let series = self.values()?;
        Ok(match smoother {
            Some(smoother) => smoother.smooth(&series),
            None => series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, RecordsTable, Stats};
    use crate::smoothing::MovingAverageSmoother;

    fn profile(elevations: &[f64]) -> Activity {
        let records = elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| Record {
                elevation: Some(e),
                ..Record::at(i as f64 * 10.0)
            })
            .collect();
        Activity::from_records(records).unwrap()
    }

    #[test]
    fn test_gain_and_loss() {
        let activity = profile(&[100.0, 110.0, 105.0]);
        let elevation = activity.elevation();
        assert_eq!(elevation.gain(Source::Records).unwrap(), 10.0);
        assert_eq!(elevation.loss(Source::Records).unwrap(), 5.0);
    }

    #[test]
    fn test_threshold_ignores_noise() {
        let noisy = [100.0, 101.0, 100.0, 102.0, 100.5, 101.5, 100.0];
        assert_eq!(gain_threshold(&noisy, 5.0), 0.0);
        assert_eq!(gain_threshold(&noisy, 0.0), 4.0);
    }

    #[test]
    fn test_single_sample_has_no_gain() {
        let activity = profile(&[1234.0]);
        assert_eq!(activity.elevation().gain(Source::Records).unwrap(), 0.0);
        assert_eq!(activity.elevation().loss(Source::Records).unwrap(), 0.0);
    }

    #[test]
    fn test_smoother_is_applied() {
        let activity = profile(&[100.0, 100.0, 130.0, 100.0, 100.0]);
        let config = ElevationConfig {
            gain_threshold_m: 0.0,
        };
        let smoother = MovingAverageSmoother::new(1);
        let elevation = activity.elevation();

        assert_eq!(elevation.gain_with(Source::Records, &config, None).unwrap(), 30.0);
        let smoothed = elevation
            .gain_with(Source::Records, &config, Some(&smoother))
            .unwrap();
        assert!((smoothed - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_and_laps() {
        let activity = Activity::from_parts(
            RecordsTable::default(),
            vec![
                Stats::new().with("elevation_gain", 50.0).with("elevation_loss", 20.0),
                Stats::new().with("elevation_gain", 25.0).with("elevation_loss", 40.0),
            ],
            Stats::new().with("elevation_gain", 75.0),
        );
        let elevation = activity.elevation();
        assert_eq!(elevation.gain(Source::Laps).unwrap(), 75.0);
        assert_eq!(elevation.loss(Source::Laps).unwrap(), 60.0);
        assert_eq!(elevation.gain(Source::Summary).unwrap(), 75.0);
        assert!(elevation.loss(Source::Summary).unwrap_err().is_missing_field());
        assert!(elevation.gain(Source::Records).unwrap_err().is_missing_field());
        assert!(elevation.gain(Source::Position).is_err());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let activity = profile(&[100.0, 120.0]);
        let config = ElevationConfig {
            gain_threshold_m: -1.0,
        };
        assert!(activity
            .elevation()
            .gain_with(Source::Records, &config, None)
            .is_err());
    }
}
