use crate::error::WindowError;
use chrono::NaiveDate;
use core_types::{MarketId, ProgramId};
use serde::{Deserialize, Serialize};

/// Lightweight specification of a time window and its participants.
///
/// Defines what to analyze (programs and benchmarks) and when (an inclusive
/// date range), but carries no data. Immutable by convention once
/// constructed; the borrow-mode pass replaces a definition with a derived
/// copy instead of mutating it in place.
///
/// The serialized form is a flat JSON object: ISO-8601 date strings,
/// entity-id arrays, and nullable metadata fields. Round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDefinition {
    /// First date of the window (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the window (inclusive).
    pub end_date: NaiveDate,
    /// Trading programs to include in analysis.
    pub program_ids: Vec<ProgramId>,
    /// Benchmark markets to include in analysis.
    pub benchmark_ids: Vec<MarketId>,
    /// Descriptive name, e.g. "Period ending 2020-12-31".
    pub name: Option<String>,
    /// Name of the window set this definition belongs to.
    pub window_set: Option<String>,
    /// Position within the window set. Descriptive only.
    pub index: Option<usize>,
    /// Start of the region borrowed from the adjacent window, if any.
    pub borrowed_data_start_date: Option<NaiveDate>,
    /// End of the borrowed region; always equals `end_date` when set.
    pub borrowed_data_end_date: Option<NaiveDate>,
}

impl WindowDefinition {
    /// Creates a validated definition with no metadata.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        program_ids: Vec<ProgramId>,
        benchmark_ids: Vec<MarketId>,
    ) -> Result<Self, WindowError> {
        let def = Self {
            start_date,
            end_date,
            program_ids,
            benchmark_ids,
            name: None,
            window_set: None,
            index: None,
            borrowed_data_start_date: None,
            borrowed_data_end_date: None,
        };
        def.validate()?;
        Ok(def)
    }

    /// Checks the structural invariants.
    ///
    /// Deserialization uses plain serde derives, so callers loading
    /// definitions from external JSON must validate before use.
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.start_date > self.end_date {
            return Err(WindowError::InvalidBounds {
                start: self.start_date,
                end: self.end_date,
            });
        }
        match (self.borrowed_data_start_date, self.borrowed_data_end_date) {
            (None, None) => Ok(()),
            (Some(borrowed_start), Some(borrowed_end)) => {
                if self.start_date <= borrowed_start
                    && borrowed_start <= borrowed_end
                    && borrowed_end == self.end_date
                {
                    Ok(())
                } else {
                    Err(WindowError::InvalidBorrowedRange {
                        start: self.start_date,
                        end: self.end_date,
                        borrowed_start,
                        borrowed_end,
                    })
                }
            }
            _ => Err(WindowError::HalfOpenBorrowedRange),
        }
    }

    /// Whether part of this window's range was borrowed from a neighbor.
    pub fn has_borrowed_data(&self) -> bool {
        self.borrowed_data_start_date.is_some()
    }

    /// Calendar days spanned by the window: `end_date - start_date`.
    ///
    /// This is the elapsed-time base for annualization, deliberately
    /// independent of how many observations the window actually holds.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}
