use super::FieldAccessor;
use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::metrics::{self, NormalizedPower, DEFAULT_SMOOTHING_WINDOW};
use crate::models::{Field, Source};
use crate::moving::MovingConfig;
use crate::running_power::run_power;

/// Power output, in watts (or W/kg for modeled running power)
#[derive(Debug, Clone, Copy)]
pub struct Power<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Power<'a> {
    const FIELD: Field = Field::Power;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Power<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    /// Normalized power over a 30 s window
    pub fn normalized(&self) -> Result<NormalizedPower> {
        self.normalized_with(DEFAULT_SMOOTHING_WINDOW)
    }

    pub fn normalized_with(&self, smoothing_window: f64) -> Result<NormalizedPower> {
        // Surface a missing power column before a missing time column
        self.values()?;
        let series = self.activity.records().timed_values(Field::Power);
        if series.is_empty() {
            return Err(StrideError::missing(Field::Time.name(), Source::Records));
        }
        metrics::normalized_power(&series, smoothing_window)
    }

    /// Normalized power relative to functional threshold power
    pub fn intensity(&self, ftp: f64) -> Result<f64> {
        self.intensity_with(ftp, DEFAULT_SMOOTHING_WINDOW)
    }

    pub fn intensity_with(&self, ftp: f64, smoothing_window: f64) -> Result<f64> {
        metrics::intensity(self.normalized_with(smoothing_window)?.value, ftp)
    }

    /// Power training stress over the moving time
    pub fn training_stress(&self, ftp: f64) -> Result<f64> {
        self.training_stress_with(ftp, DEFAULT_SMOOTHING_WINDOW, &MovingConfig::default())
    }

    pub fn training_stress_with(
        &self,
        ftp: f64,
        smoothing_window: f64,
        moving: &MovingConfig,
    ) -> Result<f64> {
        let normalized = self.normalized_with(smoothing_window)?;
        let duration = self.activity.time().training_duration(moving)?;
        metrics::training_stress(normalized.value, ftp, duration)
    }

    /// Modeled running power in W/kg from speed and grade, aligned with the records.
    ///
    /// Speed comes from the speed column, else from distance. Grade comes
    /// from the grade column, else from elevation; samples without a grade
    /// are treated as flat.
    pub fn records_from_running_model(&self) -> Result<Vec<Option<f64>>> {
        let speeds = self.activity.speed().records_or_derived()?;
        let grades = match self.activity.grade().records_or_derived() {
            Ok(grades) => grades,
            Err(e) if e.is_missing_field() => vec![None; speeds.len()],
            Err(e) => return Err(e),
        };

        Ok(speeds
            .into_iter()
            .zip(grades)
            .map(|(speed, grade)| speed.map(|v| run_power(v, grade.unwrap_or(0.0))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::running_power::flat_run_power;

    fn intervals(minutes: usize) -> Activity {
        let records = (0..=minutes * 60)
            .map(|i| Record {
                power: Some(if (i / 120) % 2 == 0 { 300.0 } else { 150.0 }),
                speed: Some(8.0),
                ..Record::at(i as f64)
            })
            .collect();
        Activity::from_records(records).unwrap()
    }

    #[test]
    fn test_normalized_above_mean_for_intervals() {
        let activity = intervals(20);
        let power = activity.power();
        let np = power.normalized().unwrap();
        assert!(!np.fallback);
        assert!(np.value > power.mean(Source::Records).unwrap());
    }

    #[test]
    fn test_training_stress_uses_normalized_power() {
        let activity = intervals(60);
        let power = activity.power();
        let np = power.normalized().unwrap().value;

        let tss = power.training_stress(np).unwrap();
        assert!((tss - 100.0).abs() < 1e-6);
        assert!((power.intensity(np).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_activity_falls_back() {
        let records = (0..10)
            .map(|i| Record {
                power: Some(200.0),
                ..Record::at(i as f64)
            })
            .collect();
        let activity = Activity::from_records(records).unwrap();
        let np = activity.power().normalized().unwrap();
        assert!(np.fallback);
        assert_eq!(np.value, 200.0);
    }

    #[test]
    fn test_missing_power() {
        let activity = Activity::from_records(vec![Record::at(0.0), Record::at(1.0)]).unwrap();
        match activity.power().normalized() {
            Err(StrideError::MissingField { field, .. }) => assert_eq!(field, "power"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_running_model_from_distance_and_elevation() {
        let records = vec![
            Record {
                distance: Some(0.0),
                elevation: Some(100.0),
                ..Record::at(0.0)
            },
            Record {
                distance: Some(30.0),
                elevation: Some(100.0),
                ..Record::at(10.0)
            },
            Record {
                distance: Some(60.0),
                elevation: Some(103.0),
                ..Record::at(20.0)
            },
        ];
        let activity = Activity::from_records(records).unwrap();
        let modeled = activity.power().records_from_running_model().unwrap();

        assert_eq!(modeled[0], None);
        assert!((modeled[1].unwrap() - flat_run_power(3.0)).abs() < 1e-12);
        assert!(modeled[2].unwrap() > modeled[1].unwrap());
    }

    #[test]
    fn test_running_model_flat_without_elevation() {
        let records = vec![
            Record {
                speed: Some(4.0),
                ..Record::at(0.0)
            },
            Record::at(1.0),
        ];
        let activity = Activity::from_records(records).unwrap();
        let modeled = activity.power().records_from_running_model().unwrap();
        assert!((modeled[0].unwrap() - flat_run_power(4.0)).abs() < 1e-12);
        assert_eq!(modeled[1], None);
    }
}
