use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StrideError};
use crate::fields::{
    semicircles_to_degrees, Cadence, Distance, Elevation, Grade, Heartrate, Lat, Lon, Power,
    Speed, Time, Timestamp,
};
use crate::models::{Field, Record, RecordsTable, Source, Stats};

/// A recorded activity: per-sample records plus optional lap and summary stats.
///
/// Activities are immutable once built. Unit conversions return a new
/// activity rather than editing in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ActivityParts", into = "ActivityParts")]
pub struct Activity {
    records: RecordsTable,
    laps: Vec<Stats>,
    summary: Stats,
}

#[derive(Serialize, Deserialize)]
struct ActivityParts {
    records: RecordsTable,
    #[serde(default)]
    laps: Vec<Stats>,
    #[serde(default)]
    summary: Stats,
}

impl From<ActivityParts> for Activity {
    fn from(parts: ActivityParts) -> Self {
        Activity::from_parts(parts.records, parts.laps, parts.summary)
    }
}

impl From<Activity> for ActivityParts {
    fn from(activity: Activity) -> Self {
        ActivityParts {
            records: activity.records,
            laps: activity.laps,
            summary: activity.summary,
        }
    }
}

impl Activity {
    /// Activity with records only
    pub fn new(records: RecordsTable) -> Self {
        Self::from_parts(records, Vec::new(), Stats::new())
    }

    /// Validate raw samples and build an activity from them
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        Ok(Self::new(RecordsTable::new(records)?))
    }

    /// Activity with records, laps and summary.
    ///
    /// When the records carry timestamps but no `time` column, `time` is
    /// filled with seconds since the first timestamp.
    pub fn from_parts(records: RecordsTable, laps: Vec<Stats>, summary: Stats) -> Self {
        let mut activity = Activity {
            records,
            laps,
            summary,
        };

        if activity.has_streams(&["timestamp"]) && !activity.has_streams(&["time"]) {
            let derived = activity.time().records_from_timestamps();
            if let Ok(times) = derived {
                let mut times = times.into_iter();
                activity.records.map_records(|r| r.time = times.next().flatten());
                debug!(
                    samples = activity.records.len(),
                    "Derived time column from timestamps"
                );
            }
        }

        activity
    }

    pub fn with_laps(self, laps: Vec<Stats>) -> Self {
        Self::from_parts(self.records, laps, self.summary)
    }

    pub fn with_summary(self, summary: Stats) -> Self {
        Self::from_parts(self.records, self.laps, summary)
    }

    pub fn records(&self) -> &RecordsTable {
        &self.records
    }

    pub fn laps(&self) -> &[Stats] {
        &self.laps
    }

    pub fn summary(&self) -> &Stats {
        &self.summary
    }

    pub fn time(&self) -> Time<'_> {
        Time::new(self)
    }

    pub fn timestamp(&self) -> Timestamp<'_> {
        Timestamp::new(self)
    }

    pub fn distance(&self) -> Distance<'_> {
        Distance::new(self)
    }

    pub fn elevation(&self) -> Elevation<'_> {
        Elevation::new(self)
    }

    pub fn speed(&self) -> Speed<'_> {
        Speed::new(self)
    }

    pub fn grade(&self) -> Grade<'_> {
        Grade::new(self)
    }

    pub fn heartrate(&self) -> Heartrate<'_> {
        Heartrate::new(self)
    }

    pub fn cadence(&self) -> Cadence<'_> {
        Cadence::new(self)
    }

    pub fn power(&self) -> Power<'_> {
        Power::new(self)
    }

    pub fn lat(&self) -> Lat<'_> {
        Lat::new(self)
    }

    pub fn lon(&self) -> Lon<'_> {
        Lon::new(self)
    }

    /// Whether every named column exists in the records
    pub fn has_streams(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.records.has_column(name))
    }

    pub fn has_position(&self) -> bool {
        self.has_streams(&["lat", "lon"])
    }

    /// `(lat, lon)` of every sample carrying both coordinates
    pub fn latlons(&self) -> Result<Vec<(f64, f64)>> {
        if !self.has_position() {
            return Err(StrideError::missing(self.missing_position(), Source::Records));
        }
        Ok(self
            .records
            .iter()
            .filter_map(|r| Some((r.lat?, r.lon?)))
            .collect())
    }

    /// `(lon, lat)` of every sample carrying both coordinates
    pub fn lonlats(&self) -> Result<Vec<(f64, f64)>> {
        Ok(self
            .latlons()?
            .into_iter()
            .map(|(lat, lon)| (lon, lat))
            .collect())
    }

    fn missing_position(&self) -> &'static str {
        if self.has_streams(&["lat"]) {
            Field::Lon.name()
        } else {
            Field::Lat.name()
        }
    }

    /// Records without lap numbering, with samples repeated at lap boundaries dropped
    pub fn records_unique(&self) -> RecordsTable {
        let mut records: Vec<Record> = self
            .records
            .iter()
            .map(|r| Record {
                lap: None,
                ..r.clone()
            })
            .collect();
        records.dedup();
        RecordsTable::from_ordered(records)
    }

    /// Copy of the activity with cadence converted from RPM to strides per minute
    pub fn with_cadence_in_spm(&self) -> Activity {
        let mut converted = self.clone();
        converted.records.scale_column(Field::Cadence, 2.0);
        for lap in converted.laps.iter_mut() {
            lap.scale_field(Field::Cadence.name(), 2.0);
        }
        converted
            .summary
            .scale_field(Field::Cadence.name(), 2.0);
        converted
    }

    /// Copy of the activity with lat/lon records converted from FIT semicircles to degrees
    pub fn with_position_in_degrees(&self) -> Activity {
        let mut converted = self.clone();
        converted.records.map_records(|r| {
            r.lat = r.lat.map(semicircles_to_degrees);
            r.lon = r.lon.map(semicircles_to_degrees);
        });
        converted
    }

    /// First and last timestamp, when the records carry any
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut timestamps = self.records.iter().filter_map(|r| r.timestamp);
        let first = timestamps.next()?;
        let last = timestamps.last().unwrap_or(first);
        Some((first, last))
    }
}
