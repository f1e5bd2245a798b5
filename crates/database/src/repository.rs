use crate::DbError;
use chrono::NaiveDate;
use core_types::{
    MarketId, ProgramId, Resolution, ReturnPoint, ReturnSeries, ReturnsSource, SourceError,
};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};
use tracing::debug;

/// The `PnlRepository` provides a high-level, application-specific interface
/// to the return store. It encapsulates all SQL queries and data access
/// logic, and implements the `ReturnsSource` seam consumed by the engine.
#[derive(Debug, Clone)]
pub struct PnlRepository {
    pool: PgPool,
}

/// A trading program joined with its manager, as listed in the catalog.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub id: ProgramId,
    pub manager_name: String,
    pub program_name: String,
    /// The market representing this program's own return series.
    pub primary_return_market_id: Option<MarketId>,
}

/// A market row; benchmark markets carry `is_benchmark = true`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct MarketRecord {
    pub id: MarketId,
    pub market_name: String,
    pub is_benchmark: bool,
}

impl PnlRepository {
    /// Creates a new `PnlRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Monthly returns of a program's own ledger: the rows recorded against
    /// its designated primary return market.
    pub async fn fetch_program_monthly(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT pr.date, pr.return_value
            FROM pnl_records pr
            JOIN programs p ON p.id = pr.program_id
            WHERE pr.program_id = $1
              AND pr.market_id = p.primary_return_market_id
              AND pr.resolution = 'monthly'
              AND pr.date >= $2
              AND pr.date <= $3
            ORDER BY pr.date
            "#,
        )
        .bind(program_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows_to_series(rows)
    }

    /// Daily portfolio-level returns of a program: per-date sum across its
    /// constituent markets, excluding benchmark-flagged markets.
    pub async fn fetch_program_daily(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT pr.date, SUM(pr.return_value) AS return_value
            FROM pnl_records pr
            JOIN markets m ON m.id = pr.market_id
            WHERE pr.program_id = $1
              AND pr.resolution = 'daily'
              AND NOT m.is_benchmark
              AND pr.date >= $2
              AND pr.date <= $3
            GROUP BY pr.date
            ORDER BY pr.date
            "#,
        )
        .bind(program_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows_to_series(rows)
    }

    /// Returns of a benchmark market at the given resolution. Benchmark
    /// rows live in a dedicated logical account: `program_id IS NULL` and
    /// the market is benchmark-flagged. An unknown or unflagged market
    /// yields an empty series.
    pub async fn fetch_benchmark_returns(
        &self,
        market_id: MarketId,
        resolution: Resolution,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT pr.date, pr.return_value
            FROM pnl_records pr
            JOIN markets m ON m.id = pr.market_id
            WHERE pr.market_id = $1
              AND m.is_benchmark
              AND pr.program_id IS NULL
              AND pr.resolution = $2
              AND pr.date >= $3
              AND pr.date <= $4
            ORDER BY pr.date
            "#,
        )
        .bind(market_id)
        .bind(resolution.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows_to_series(rows)
    }

    /// All programs with their managers, for catalog listings.
    pub async fn list_programs(&self) -> Result<Vec<ProgramRecord>, DbError> {
        let programs = sqlx::query_as::<_, ProgramRecord>(
            r#"
            SELECT p.id, mg.manager_name, p.program_name, p.primary_return_market_id
            FROM programs p
            JOIN managers mg ON mg.id = p.manager_id
            ORDER BY mg.manager_name, p.program_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(programs)
    }

    /// All benchmark-flagged markets.
    pub async fn list_benchmark_markets(&self) -> Result<Vec<MarketRecord>, DbError> {
        let markets = sqlx::query_as::<_, MarketRecord>(
            "SELECT id, market_name, is_benchmark FROM markets WHERE is_benchmark ORDER BY market_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(markets)
    }

    /// Earliest and latest record dates for a program at a resolution, or
    /// None when the program has no records. This is what drives automatic
    /// window-range discovery in the CLI.
    pub async fn program_data_range(
        &self,
        program_id: ProgramId,
        resolution: Resolution,
    ) -> Result<Option<(NaiveDate, NaiveDate)>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT MIN(date) AS min_date, MAX(date) AS max_date
            FROM pnl_records
            WHERE program_id = $1 AND resolution = $2
            "#,
        )
        .bind(program_id)
        .bind(resolution.as_str())
        .fetch_one(&self.pool)
        .await?;

        let min_date: Option<NaiveDate> = row.try_get("min_date")?;
        let max_date: Option<NaiveDate> = row.try_get("max_date")?;
        debug!(program_id, %resolution, ?min_date, ?max_date, "program data range");
        Ok(min_date.zip(max_date))
    }
}

fn rows_to_series(rows: Vec<PgRow>) -> Result<ReturnSeries, DbError> {
    let points = rows
        .into_iter()
        .map(|row| {
            Ok(ReturnPoint {
                date: row.try_get("date")?,
                value: row.try_get("return_value")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(ReturnSeries::new(points))
}

impl ReturnsSource for PnlRepository {
    async fn program_monthly_returns(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        self.fetch_program_monthly(program_id, start, end)
            .await
            .map_err(SourceError::backend)
    }

    async fn program_daily_returns(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        self.fetch_program_daily(program_id, start, end)
            .await
            .map_err(SourceError::backend)
    }

    async fn benchmark_monthly_returns(
        &self,
        market_id: MarketId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        self.fetch_benchmark_returns(market_id, Resolution::Monthly, start, end)
            .await
            .map_err(SourceError::backend)
    }

    async fn benchmark_daily_returns(
        &self,
        market_id: MarketId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        self.fetch_benchmark_returns(market_id, Resolution::Daily, start, end)
            .await
            .map_err(SourceError::backend)
    }
}
