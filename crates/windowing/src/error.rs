use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("invalid window bounds: start {start} is after end {end}")]
    InvalidBounds { start: NaiveDate, end: NaiveDate },

    #[error("window length must be at least one period, got {0}")]
    InvalidLength(u32),

    #[error("slide interval must be at least one month, got {0}")]
    InvalidSlide(u32),

    #[error(
        "invalid borrowed range {borrowed_start}..{borrowed_end} for window {start}..{end}: \
         must satisfy start <= borrowed start <= borrowed end == end"
    )]
    InvalidBorrowedRange {
        start: NaiveDate,
        end: NaiveDate,
        borrowed_start: NaiveDate,
        borrowed_end: NaiveDate,
    },

    #[error("borrowed range must set both bounds or neither")]
    HalfOpenBorrowedRange,
}
