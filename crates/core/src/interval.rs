use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("analysis interval is empty: {from} >= {to}")]
    Empty { from: NaiveDate, to: NaiveDate },
}

/// Half-open date range `[from, to)` bounding materialization.
///
/// Occurrences on `from` are included, occurrences on `to` are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct AnalysisInterval {
    from: NaiveDate,
    to: NaiveDate,
}

/// Unvalidated wire form; deserialization routes through
/// [`AnalysisInterval::new`] so decoded intervals are non-empty too.
#[derive(Deserialize)]
struct RawInterval {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RawInterval> for AnalysisInterval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        AnalysisInterval::new(raw.from, raw.to)
    }
}

impl AnalysisInterval {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, IntervalError> {
        if from >= to {
            return Err(IntervalError::Empty { from, to });
        }
        Ok(AnalysisInterval { from, to })
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.to
    }
}

impl fmt::Display for AnalysisInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}
