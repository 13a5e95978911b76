//! Date intervals and the chunks they are split into.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CubeDataError;

/// An inclusive range of calendar days.
///
/// Deserializes from either an ISO range string (`"2021-06-01/2021-06-10"`)
/// or a two-element list of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeIntervalRepr", into = "String")]
pub struct TimeInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeIntervalRepr {
    Iso(String),
    Pair([String; 2]),
}

impl TryFrom<TimeIntervalRepr> for TimeInterval {
    type Error = CubeDataError;

    fn try_from(repr: TimeIntervalRepr) -> Result<Self, Self::Error> {
        match repr {
            TimeIntervalRepr::Iso(s) => TimeInterval::parse(&s),
            TimeIntervalRepr::Pair([start, end]) => {
                TimeInterval::new(parse_date(&start)?, parse_date(&end)?)
            }
        }
    }
}

impl From<TimeInterval> for String {
    fn from(interval: TimeInterval) -> Self {
        interval.to_string()
    }
}

impl TimeInterval {
    /// Create an interval, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CubeDataError> {
        if start > end {
            return Err(CubeDataError::InvalidInterval(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse an ISO 8601 range, `"start/end"`.
    ///
    /// Either side may be a plain date or a full timestamp; only the date
    /// part is kept.
    pub fn parse(s: &str) -> Result<Self, CubeDataError> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| CubeDataError::InvalidInterval(s.to_string()))?;
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Check whether a timestamp falls on one of the covered days.
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.contains_date(ts.date_naive())
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

/// One sub-interval of a requested time range.
///
/// Bounds are inclusive days; the equivalent half-open interval is
/// `[start, end_exclusive())`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeChunk {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeChunk {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn end_exclusive(&self) -> NaiveDate {
        self.end + Duration::days(1)
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn as_interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.as_interval().contains(ts)
    }
}

impl fmt::Display for TimeChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_interval().fmt(f)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, CubeDataError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.date());
    }
    Err(CubeDataError::InvalidInterval(format!("unparseable date '{}'", s)))
}
