use crate::error::SourceError;
use crate::structs::{MarketId, ProgramId, ReturnSeries};
use chrono::NaiveDate;

/// The storage seam: everything the analysis layers need from the
/// relational store, and nothing more.
///
/// All ranges are inclusive on both bounds, and every returned series is
/// ordered by ascending date. An id with no recorded rows yields an empty
/// series — absence propagates as incompleteness, not as failure.
#[allow(async_fn_in_trait)]
pub trait ReturnsSource {
    /// Monthly returns of a program's own trading ledger (its designated
    /// primary return market).
    async fn program_monthly_returns(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError>;

    /// Daily portfolio-level returns of a program: the per-date sum of its
    /// constituent market returns, excluding benchmark-flagged markets.
    async fn program_daily_returns(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError>;

    /// Monthly returns of a benchmark market.
    async fn benchmark_monthly_returns(
        &self,
        market_id: MarketId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError>;

    /// Daily returns of a benchmark market.
    async fn benchmark_daily_returns(
        &self,
        market_id: MarketId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError>;
}
