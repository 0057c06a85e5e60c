use super::FieldAccessor;
use crate::activity::Activity;
use crate::error::Result;
use crate::metrics;
use crate::models::Field;
use crate::moving::MovingConfig;

/// Heart rate, in beats per minute
#[derive(Debug, Clone, Copy)]
pub struct Heartrate<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Heartrate<'a> {
    const FIELD: Field = Field::Heartrate;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Heartrate<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    /// Fourth-power mean of the heart rate stream
    pub fn lactate_norm(&self) -> Result<f64> {
        metrics::lactate_norm(&self.values()?)
    }

    /// Lactate norm relative to lactate threshold heart rate
    pub fn intensity(&self, lthr: f64) -> Result<f64> {
        metrics::intensity(self.lactate_norm()?, lthr)
    }

    /// Heart-rate training stress over the moving time
    pub fn training_stress(&self, lthr: f64) -> Result<f64> {
        self.training_stress_with(lthr, &MovingConfig::default())
    }

    pub fn training_stress_with(&self, lthr: f64, moving: &MovingConfig) -> Result<f64> {
        let duration = self.activity.time().training_duration(moving)?;
        metrics::training_stress(self.lactate_norm()?, lthr, duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrideError;
    use crate::models::{Record, Source};

    fn steady(heartrate: f64, minutes: usize) -> Activity {
        let records = (0..=minutes * 60)
            .map(|i| Record {
                heartrate: Some(heartrate),
                speed: Some(3.0),
                ..Record::at(i as f64)
            })
            .collect();
        Activity::from_records(records).unwrap()
    }

    #[test]
    fn test_steady_effort_at_threshold() {
        let activity = steady(165.0, 60);
        let heartrate = activity.heartrate();

        assert!((heartrate.lactate_norm().unwrap() - 165.0).abs() < 1e-9);
        assert!((heartrate.intensity(165.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((heartrate.training_stress(165.0).unwrap() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_and_max() {
        let records = [140.0, 150.0, 160.0]
            .iter()
            .enumerate()
            .map(|(i, &hr)| Record {
                heartrate: Some(hr),
                ..Record::at(i as f64)
            })
            .collect();
        let activity = Activity::from_records(records).unwrap();
        assert_eq!(activity.heartrate().mean(Source::Records).unwrap(), 150.0);
        assert_eq!(activity.heartrate().max(Source::Records).unwrap(), 160.0);
    }

    #[test]
    fn test_invalid_threshold() {
        let activity = steady(150.0, 1);
        assert!(matches!(
            activity.heartrate().intensity(0.0),
            Err(StrideError::Calculation(_))
        ));
    }
}
