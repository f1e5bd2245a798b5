use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a trading program (database key).
pub type ProgramId = i64;

/// Identifier of a market (database key). Benchmark markets use the same
/// id space as trading markets, distinguished by the `is_benchmark` flag.
pub type MarketId = i64;

/// A single (date, return) observation. Returns are decimals: 0.01 = 1%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An ordered series of return observations at one resolution.
///
/// Ordering by ascending date is the constructor's contract: the storage
/// layer orders in SQL, the aggregation helpers preserve order. An empty
/// series is the canonical representation of "no data for this entity" —
/// missing data is reported as data, not as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Wraps observations already ordered by ascending date.
    pub fn new(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    /// An empty series, the "no data" value.
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Date of the earliest observation, if any.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Date of the latest observation, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The raw return values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReturnPoint> {
        self.points.iter()
    }
}

impl FromIterator<ReturnPoint> for ReturnSeries {
    fn from_iter<I: IntoIterator<Item = ReturnPoint>>(iter: I) -> Self {
        Self { points: iter.into_iter().collect() }
    }
}
