//! One-call summary of every metric an activity supports

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::activity::Activity;
use crate::config::AnalysisConfig;
use crate::error::{CalculationError, Result, StrideError};
use crate::fields::FieldAccessor;
use crate::metrics::NormalizedPower;
use crate::models::Source;

/// Metrics computed from an activity's records. Metrics the records cannot
/// support are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub start: Option<DateTime<Utc>>,
    pub elapsed_seconds: Option<f64>,
    pub moving_seconds: Option<f64>,
    /// Recorded distance, else distance along the GPS track
    pub distance_m: Option<f64>,
    pub elevation_gain_m: Option<f64>,
    pub elevation_loss_m: Option<f64>,
    pub avg_speed_mps: Option<f64>,
    pub max_speed_mps: Option<f64>,
    pub avg_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub avg_cadence: Option<f64>,
    pub avg_power: Option<f64>,
    pub normalized_power: Option<NormalizedPower>,
    pub power_intensity: Option<f64>,
    pub power_training_stress: Option<f64>,
    pub heartrate_intensity: Option<f64>,
    pub heartrate_training_stress: Option<f64>,
}

/// Absent or too-sparse inputs leave a metric empty; anything else is a real failure
fn available<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StrideError::MissingField { .. })
        | Err(StrideError::Calculation(CalculationError::InsufficientData { .. })) => Ok(None),
        Err(e) => Err(e),
    }
}

impl ActivityReport {
    #[instrument(skip_all, fields(samples = activity.records().len()))]
    pub fn compute(activity: &Activity, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let time = activity.time();
        let elevation = activity.elevation();
        let speed = activity.speed();
        let heartrate = activity.heartrate();
        let power = activity.power();
        let window = config.power.smoothing_window_s;

        let distance_m = match available(activity.distance().total(Source::Records))? {
            Some(total) => Some(total),
            None => available(activity.distance().total(Source::Position))?,
        };

        let mut report = ActivityReport {
            start: available(activity.timestamp().start(Source::Records))?,
            elapsed_seconds: available(time.elapsed(Source::Records))?,
            moving_seconds: available(time.timer_with(Source::Records, &config.moving))?,
            distance_m,
            elevation_gain_m: available(elevation.gain_with(
                Source::Records,
                &config.elevation,
                None,
            ))?,
            elevation_loss_m: available(elevation.loss_with(
                Source::Records,
                &config.elevation,
                None,
            ))?,
            avg_speed_mps: available(speed.mean(Source::Records))?,
            max_speed_mps: available(speed.max(Source::Records))?,
            avg_heartrate: available(heartrate.mean(Source::Records))?,
            max_heartrate: available(heartrate.max(Source::Records))?,
            avg_cadence: available(activity.cadence().mean(Source::Records))?,
            avg_power: available(power.mean(Source::Records))?,
            normalized_power: available(power.normalized_with(window))?,
            ..Default::default()
        };

        if let Some(ftp) = config.athlete.ftp {
            report.power_intensity = available(power.intensity_with(ftp, window))?;
            report.power_training_stress =
                available(power.training_stress_with(ftp, window, &config.moving))?;
        }

        if let Some(lthr) = config.athlete.lthr {
            report.heartrate_intensity = available(heartrate.intensity(lthr))?;
            report.heartrate_training_stress =
                available(heartrate.training_stress_with(lthr, &config.moving))?;
        }

        debug!(?report, "Computed activity report");
        Ok(report)
    }
}

/// Reports for many activities, computed in parallel. Results keep the input order.
pub fn report_many(activities: &[Activity], config: &AnalysisConfig) -> Vec<Result<ActivityReport>> {
    info!(activities = activities.len(), "Computing activity reports");

    activities
        .par_iter()
        .map(|activity| ActivityReport::compute(activity, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn run(seconds: usize) -> Activity {
        let records = (0..=seconds)
            .map(|i| Record {
                distance: Some(i as f64 * 3.0),
                speed: Some(3.0),
                heartrate: Some(150.0),
                elevation: Some(100.0 + (i / 60) as f64 * 10.0),
                ..Record::at(i as f64)
            })
            .collect();
        Activity::from_records(records).unwrap()
    }

    #[test]
    fn test_report_fills_available_metrics() {
        let config = AnalysisConfig {
            athlete: crate::config::AthleteThresholds {
                ftp: Some(250.0),
                lthr: Some(150.0),
            },
            ..Default::default()
        };
        let report = ActivityReport::compute(&run(600), &config).unwrap();

        assert_eq!(report.elapsed_seconds, Some(600.0));
        assert_eq!(report.moving_seconds, Some(600.0));
        assert_eq!(report.distance_m, Some(1800.0));
        assert_eq!(report.elevation_gain_m, Some(100.0));
        assert_eq!(report.elevation_loss_m, Some(0.0));
        assert_eq!(report.avg_heartrate, Some(150.0));
        assert_eq!(report.heartrate_intensity, Some(1.0));
        assert!(report.start.is_none());
        assert!(report.avg_power.is_none());
        assert!(report.normalized_power.is_none());
        assert!(report.power_training_stress.is_none());
    }

    #[test]
    fn test_single_sample_report_is_sparse() {
        let report = ActivityReport::compute(&run(0), &AnalysisConfig::default()).unwrap();
        assert!(report.elapsed_seconds.is_none());
        assert_eq!(report.moving_seconds, Some(0.0));
        assert_eq!(report.elevation_gain_m, Some(0.0));
    }

    #[test]
    fn test_invalid_config_propagates() {
        let mut config = AnalysisConfig::default();
        config.power.smoothing_window_s = -1.0;
        assert!(ActivityReport::compute(&run(60), &config).is_err());
    }

    #[test]
    fn test_report_many_preserves_order() {
        let activities = vec![run(60), Activity::default(), run(120)];
        let reports = report_many(&activities, &AnalysisConfig::default());

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].as_ref().unwrap().elapsed_seconds, Some(60.0));
        assert_eq!(reports[1].as_ref().unwrap(), &ActivityReport::default());
        assert_eq!(reports[2].as_ref().unwrap().elapsed_seconds, Some(120.0));
    }

    #[test]
    fn test_report_serializes() {
        let report = ActivityReport::compute(&run(60), &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["elapsed_seconds"], 60.0);
        assert!(json["avg_power"].is_null());
    }
}
