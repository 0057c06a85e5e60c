use super::FieldAccessor;
use crate::activity::Activity;
use crate::error::{Result, StrideError};
use crate::models::{Field, Source};

/// Decimal grade (0.05 = 5% incline)
#[derive(Debug, Clone, Copy)]
pub struct Grade<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Grade<'a> {
    const FIELD: Field = Field::Grade;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Grade<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    /// Rise over run between consecutive samples, aligned with the records.
    ///
    /// The first sample and steps without horizontal movement have no grade.
    pub fn records_from_elevation(&self) -> Result<Vec<Option<f64>>> {
        let records = self.activity.records();
        for field in [Field::Elevation, Field::Distance] {
            if !records.has_column(field.name()) {
                return Err(StrideError::missing(field.name(), Source::Records));
            }
        }

        let mut grades = Vec::with_capacity(records.len());
        grades.extend(records.records().first().map(|_| None));
        grades.extend(records.records().windows(2).map(|pair| {
            let rise = pair[1].elevation? - pair[0].elevation?;
            let run = pair[1].distance? - pair[0].distance?;
            (run != 0.0).then(|| rise / run)
        }));
        Ok(grades)
    }

    /// Grade stream from the records, derived from elevation when the device recorded none
    pub fn records_or_derived(&self) -> Result<Vec<Option<f64>>> {
        match self.stream() {
            Some(stream) => Ok(stream),
            None => self.records_from_elevation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn test_records_from_elevation() {
        let samples = [(0.0, 100.0), (100.0, 105.0), (100.0, 106.0), (200.0, 104.0)];
        let records = samples
            .iter()
            .enumerate()
            .map(|(i, &(d, e))| Record {
                distance: Some(d),
                elevation: Some(e),
                ..Record::at(i as f64)
            })
            .collect();
        let activity = Activity::from_records(records).unwrap();

        let grades = activity.grade().records_from_elevation().unwrap();
        assert_eq!(grades.len(), 4);
        assert_eq!(grades[0], None);
        assert!((grades[1].unwrap() - 0.05).abs() < 1e-12);
        assert_eq!(grades[2], None);
        assert!((grades[3].unwrap() + 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_recorded_grade_preferred() {
        let records = vec![
            Record {
                grade: Some(0.01),
                ..Record::at(0.0)
            },
            Record {
                grade: Some(0.02),
                ..Record::at(1.0)
            },
        ];
        let activity = Activity::from_records(records).unwrap();
        assert_eq!(
            activity.grade().records_or_derived().unwrap(),
            vec![Some(0.01), Some(0.02)]
        );
        assert!(activity
            .grade()
            .records_from_elevation()
            .unwrap_err()
            .is_missing_field());
    }
}
