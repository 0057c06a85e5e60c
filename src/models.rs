use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StrideError};

/// Where an accessor reads its data from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Per-sample records table
    Records,
    /// Sum or combination of per-lap stats
    Laps,
    /// Whole-activity summary stats
    Summary,
    /// Values derived from GPS coordinates (distance only)
    Position,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Records => write!(f, "records"),
            Source::Laps => write!(f, "laps"),
            Source::Summary => write!(f, "summary"),
            Source::Position => write!(f, "position"),
        }
    }
}

impl FromStr for Source {
    type Err = StrideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "records" => Ok(Source::Records),
            "laps" => Ok(Source::Laps),
            "summary" => Ok(Source::Summary),
            "position" => Ok(Source::Position),
            _ => Err(StrideError::invalid("source selection", "source", s)),
        }
    }
}

/// Recognized record columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Timestamp,
    Time,
    Lat,
    Lon,
    Distance,
    Speed,
    Elevation,
    Grade,
    Heartrate,
    Cadence,
    Power,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Timestamp,
        Field::Time,
        Field::Lat,
        Field::Lon,
        Field::Distance,
        Field::Speed,
        Field::Elevation,
        Field::Grade,
        Field::Heartrate,
        Field::Cadence,
        Field::Power,
    ];

    /// Column label, also the prefix/suffix used by lap and summary stats
    pub fn name(&self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::Time => "time",
            Field::Lat => "lat",
            Field::Lon => "lon",
            Field::Distance => "distance",
            Field::Speed => "speed",
            Field::Elevation => "elevation",
            Field::Grade => "grade",
            Field::Heartrate => "heartrate",
            Field::Cadence => "cadence",
            Field::Power => "power",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Individual sample in the records table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Absolute UTC instant of the sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Seconds from the start of the activity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,

    /// Latitude in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    /// Longitude in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,

    /// Cumulative distance in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Speed in meters per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    /// Elevation in meters above sea level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,

    /// Decimal grade (0.05 = 5%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,

    /// Heart rate in beats per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartrate: Option<f64>,

    /// Cadence (strides per minute once converted, RPM as recorded by most devices)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,

    /// Power output in watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,

    /// Lap number this sample was recorded in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap: Option<u32>,

    /// Custom numeric streams keyed by name
    #[serde(flatten)]
    pub extra: BTreeMap<String, f64>,
}

impl Record {
    /// Record stamped with an offset in seconds from the activity start
    pub fn at(time: f64) -> Self {
        Record {
            time: Some(time),
            ..Default::default()
        }
    }

    /// Numeric value of a recognized column. Timestamps become epoch seconds.
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Timestamp => self
                .timestamp
                .map(|ts| ts.timestamp_millis() as f64 / 1000.0),
            Field::Time => self.time,
            Field::Lat => self.lat,
            Field::Lon => self.lon,
            Field::Distance => self.distance,
            Field::Speed => self.speed,
            Field::Elevation => self.elevation,
            Field::Grade => self.grade,
            Field::Heartrate => self.heartrate,
            Field::Cadence => self.cadence,
            Field::Power => self.power,
        }
    }

    fn value_mut(&mut self, field: Field) -> Option<&mut Option<f64>> {
        match field {
            Field::Timestamp => None,
            Field::Time => Some(&mut self.time),
            Field::Lat => Some(&mut self.lat),
            Field::Lon => Some(&mut self.lon),
            Field::Distance => Some(&mut self.distance),
            Field::Speed => Some(&mut self.speed),
            Field::Elevation => Some(&mut self.elevation),
            Field::Grade => Some(&mut self.grade),
            Field::Heartrate => Some(&mut self.heartrate),
            Field::Cadence => Some(&mut self.cadence),
            Field::Power => Some(&mut self.power),
        }
    }

    /// Value of any column by label, recognized or custom
    pub fn get(&self, name: &str) -> Option<f64> {
        match Field::from_name(name) {
            Some(field) => self.value(field),
            None if name == "lap" => self.lap.map(f64::from),
            None => self.extra.get(name).copied(),
        }
    }
}

/// Ordered per-sample measurements of an activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Record>", into = "Vec<Record>")]
pub struct RecordsTable {
    records: Vec<Record>,
}

impl RecordsTable {
    /// Build a table, rejecting samples whose timestamp or time offset goes backwards
    pub fn new(records: Vec<Record>) -> Result<Self> {
        Self::check_order(&records)?;
        Ok(Self { records })
    }

    /// Subset of an already validated table, which cannot break the ordering
    pub(crate) fn from_ordered(records: Vec<Record>) -> Self {
        Self { records }
    }

    fn check_order(records: &[Record]) -> Result<()> {
        let mut last_timestamp: Option<DateTime<Utc>> = None;
        let mut last_time: Option<f64> = None;

        for (index, record) in records.iter().enumerate() {
            if let Some(ts) = record.timestamp {
                if let Some(prev) = last_timestamp {
                    if ts < prev {
                        return Err(StrideError::UnorderedRecords {
                            index,
                            reason: format!("timestamp {} precedes {}", ts, prev),
                        });
                    }
                }
                last_timestamp = Some(ts);
            }

            if let Some(t) = record.time {
                if let Some(prev) = last_time {
                    if t < prev {
                        return Err(StrideError::UnorderedRecords {
                            index,
                            reason: format!("time {}s precedes {}s", t, prev),
                        });
                    }
                }
                last_time = Some(t);
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Whether any sample carries a value for the column
    pub fn has_column(&self, name: &str) -> bool {
        match Field::from_name(name) {
            Some(Field::Timestamp) => self.records.iter().any(|r| r.timestamp.is_some()),
            _ => self.records.iter().any(|r| r.get(name).is_some()),
        }
    }

    /// A recognized column, aligned with the records. `None` when no sample has a value.
    pub fn column(&self, field: Field) -> Option<Vec<Option<f64>>> {
        self.named_column(field.name())
    }

    /// Any column by label, aligned with the records
    pub fn named_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        if !self.has_column(name) {
            return None;
        }
        Some(self.records.iter().map(|r| r.get(name)).collect())
    }

    /// Timestamp column, aligned with the records
    pub fn timestamps(&self) -> Option<Vec<Option<DateTime<Utc>>>> {
        if !self.has_column(Field::Timestamp.name()) {
            return None;
        }
        Some(self.records.iter().map(|r| r.timestamp).collect())
    }

    /// Pairs of (time, value) for samples carrying both
    pub fn timed_values(&self, field: Field) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| Some((r.time?, r.value(field)?)))
            .collect()
    }

    /// Labels of every non-empty column
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Field::ALL
            .iter()
            .filter(|f| self.has_column(f.name()))
            .map(|f| f.name().to_string())
            .collect();

        if self.records.iter().any(|r| r.lap.is_some()) {
            names.push("lap".to_string());
        }

        let mut custom: Vec<&String> = self.records.iter().flat_map(|r| r.extra.keys()).collect();
        custom.sort();
        custom.dedup();
        names.extend(custom.into_iter().cloned());
        names
    }

    pub(crate) fn map_records(&mut self, mut f: impl FnMut(&mut Record)) {
        self.records.iter_mut().for_each(|r| f(r));
    }

    pub(crate) fn scale_column(&mut self, field: Field, factor: f64) {
        self.map_records(|r| {
            if let Some(slot) = r.value_mut(field) {
                *slot = slot.map(|v| v * factor);
            }
        });
    }
}

impl TryFrom<Vec<Record>> for RecordsTable {
    type Error = StrideError;

    fn try_from(records: Vec<Record>) -> Result<Self> {
        RecordsTable::new(records)
    }
}

impl From<RecordsTable> for Vec<Record> {
    fn from(table: RecordsTable) -> Self {
        table.records
    }
}

/// A single lap or summary statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Labeled aggregate values, used for the activity summary and for each lap.
///
/// Labels follow `{field}_{stat}` or `{stat}_{field}`, e.g. `elevation_gain`,
/// `time_timer`, `timestamp_start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats {
    values: BTreeMap<String, Value>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(label, value);
        self
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.values.get(label)
    }

    pub fn number(&self, label: &str) -> Option<f64> {
        self.get(label).and_then(Value::as_number)
    }

    pub fn timestamp(&self, label: &str) -> Option<DateTime<Utc>> {
        self.get(label).and_then(Value::as_timestamp)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.values.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Part of a label left once the field prefix or suffix is removed
    fn stat_name<'l>(label: &'l str, field: &str) -> Option<&'l str> {
        label
            .strip_prefix(field)
            .and_then(|rest| rest.strip_prefix('_'))
            .or_else(|| {
                label
                    .strip_suffix(field)
                    .and_then(|rest| rest.strip_suffix('_'))
            })
            .filter(|stat| !stat.is_empty())
    }

    /// Stats belonging to one field, re-keyed by the stat name.
    ///
    /// `{"speed_max": 5.0, "avg_speed": 3.0, "calories": 400}` viewed for
    /// `speed` gives `{"max": 5.0, "avg": 3.0}`.
    pub fn field_view(&self, field: &str) -> Stats {
        let values = self
            .values
            .iter()
            .filter_map(|(label, value)| {
                Self::stat_name(label, field).map(|stat| (stat.to_string(), value.clone()))
            })
            .collect();
        Stats { values }
    }

    pub(crate) fn scale_field(&mut self, field: &str, factor: f64) {
        for (label, value) in self.values.iter_mut() {
            if Self::stat_name(label, field).is_some() {
                if let Value::Number(n) = value {
                    *n *= factor;
                }
            }
        }
    }
}

impl<L: Into<String>, V: Into<Value>> FromIterator<(L, V)> for Stats {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut stats = Stats::new();
        for (label, value) in iter {
            stats.insert(label, value);
        }
        stats
    }
}
