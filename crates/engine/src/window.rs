use crate::error::EngineError;
use chrono::{Datelike, NaiveDate};
use core_types::{MarketId, ProgramId, ReturnSeries, ReturnsSource};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;
use windowing::WindowDefinition;

/// Materialized window: actual return data for one `WindowDefinition`.
///
/// Fetches each (entity, resolution) series from the source on first access
/// and caches it for the window's lifetime; caches are never invalidated,
/// because a `Window` is a single logical query session. All series are
/// restricted to the definition's inclusive date range by the source.
///
/// Access goes through `&mut self`: one window per analysis task, exclusive
/// by construction. Create a fresh `Window` per task instead of sharing one
/// across threads.
pub struct Window<S> {
    pub definition: WindowDefinition,
    source: S,
    monthly_programs: HashMap<ProgramId, ReturnSeries>,
    daily_programs: HashMap<ProgramId, ReturnSeries>,
    monthly_benchmarks: HashMap<MarketId, ReturnSeries>,
    daily_benchmarks: HashMap<MarketId, ReturnSeries>,
    completeness: Option<bool>,
}

impl<S: ReturnsSource> Window<S> {
    pub fn new(definition: WindowDefinition, source: S) -> Self {
        Self {
            definition,
            source,
            monthly_programs: HashMap::new(),
            daily_programs: HashMap::new(),
            monthly_benchmarks: HashMap::new(),
            daily_benchmarks: HashMap::new(),
            completeness: None,
        }
    }

    /// Monthly returns of a program's own ledger within this window.
    pub async fn program_monthly(
        &mut self,
        program_id: ProgramId,
    ) -> Result<&ReturnSeries, EngineError> {
        match self.monthly_programs.entry(program_id) {
            Entry::Occupied(cached) => Ok(cached.into_mut()),
            Entry::Vacant(slot) => {
                debug!(program_id, "fetching monthly program returns");
                let series = self
                    .source
                    .program_monthly_returns(
                        program_id,
                        self.definition.start_date,
                        self.definition.end_date,
                    )
                    .await?;
                Ok(slot.insert(series))
            }
        }
    }

    /// Daily portfolio-level returns of a program within this window.
    pub async fn program_daily(
        &mut self,
        program_id: ProgramId,
    ) -> Result<&ReturnSeries, EngineError> {
        match self.daily_programs.entry(program_id) {
            Entry::Occupied(cached) => Ok(cached.into_mut()),
            Entry::Vacant(slot) => {
                debug!(program_id, "fetching daily program returns");
                let series = self
                    .source
                    .program_daily_returns(
                        program_id,
                        self.definition.start_date,
                        self.definition.end_date,
                    )
                    .await?;
                Ok(slot.insert(series))
            }
        }
    }

    /// Monthly returns of a benchmark market within this window. A missing
    /// benchmark yields an empty series, not an error.
    pub async fn benchmark_monthly(
        &mut self,
        market_id: MarketId,
    ) -> Result<&ReturnSeries, EngineError> {
        match self.monthly_benchmarks.entry(market_id) {
            Entry::Occupied(cached) => Ok(cached.into_mut()),
            Entry::Vacant(slot) => {
                debug!(market_id, "fetching monthly benchmark returns");
                let series = self
                    .source
                    .benchmark_monthly_returns(
                        market_id,
                        self.definition.start_date,
                        self.definition.end_date,
                    )
                    .await?;
                Ok(slot.insert(series))
            }
        }
    }

    /// Daily returns of a benchmark market within this window.
    pub async fn benchmark_daily(
        &mut self,
        market_id: MarketId,
    ) -> Result<&ReturnSeries, EngineError> {
        match self.daily_benchmarks.entry(market_id) {
            Entry::Occupied(cached) => Ok(cached.into_mut()),
            Entry::Vacant(slot) => {
                debug!(market_id, "fetching daily benchmark returns");
                let series = self
                    .source
                    .benchmark_daily_returns(
                        market_id,
                        self.definition.start_date,
                        self.definition.end_date,
                    )
                    .await?;
                Ok(slot.insert(series))
            }
        }
    }

    /// Whether every program and benchmark in the definition has monthly
    /// data bracketing the window. Memoized after the first evaluation.
    ///
    /// Coverage compares calendar year and month only, not exact days,
    /// since monthly records may be stamped on any day within a month. An
    /// empty series is automatically incomplete.
    pub async fn data_is_complete(&mut self) -> Result<bool, EngineError> {
        if let Some(complete) = self.completeness {
            return Ok(complete);
        }
        let complete = self.check_completeness().await?;
        self.completeness = Some(complete);
        Ok(complete)
    }

    async fn check_completeness(&mut self) -> Result<bool, EngineError> {
        let start = self.definition.start_date;
        let end = self.definition.end_date;

        for program_id in self.definition.program_ids.clone() {
            let series = self.program_monthly(program_id).await?;
            if !covers_window(series, start, end) {
                debug!(program_id, "incomplete monthly coverage");
                return Ok(false);
            }
        }

        for market_id in self.definition.benchmark_ids.clone() {
            let series = self.benchmark_monthly(market_id).await?;
            if !covers_window(series, start, end) {
                debug!(market_id, "incomplete monthly benchmark coverage");
                return Ok(false);
            }
        }

        Ok(true)
    }
}

fn covers_window(series: &ReturnSeries, start: NaiveDate, end: NaiveDate) -> bool {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return false;
    };
    year_month(first) <= year_month(start) && year_month(last) >= year_month(end)
}

fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::{FixtureSource, d, point};

    fn definition(
        start: NaiveDate,
        end: NaiveDate,
        programs: Vec<i64>,
        benchmarks: Vec<i64>,
    ) -> WindowDefinition {
        WindowDefinition::new(start, end, programs, benchmarks).unwrap()
    }

    #[tokio::test]
    async fn caches_fetch_each_entity_and_resolution_once() {
        let source = FixtureSource::new().with_program_monthly(
            1,
            vec![point(2020, 1, 15, 0.01), point(2020, 2, 15, 0.02)],
        );
        let counter = source.fetch_counter();
        let def = definition(d(2020, 1, 1), d(2020, 2, 29), vec![1], vec![]);
        let mut window = Window::new(def, source);

        let first = window.program_monthly(1).await.unwrap().clone();
        let second = window.program_monthly(1).await.unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);

        // A different resolution is a separate cache entry.
        window.program_daily(1).await.unwrap();
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn series_are_restricted_to_the_window_range() {
        let source = FixtureSource::new().with_program_monthly(
            1,
            vec![
                point(2019, 12, 31, 0.05),
                point(2020, 1, 15, 0.01),
                point(2020, 2, 15, 0.02),
                point(2020, 3, 15, 0.03),
            ],
        );
        let def = definition(d(2020, 1, 1), d(2020, 2, 29), vec![1], vec![]);
        let mut window = Window::new(def, source);

        let series = window.program_monthly(1).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(d(2020, 1, 15)));
        assert_eq!(series.last_date(), Some(d(2020, 2, 15)));
    }

    #[tokio::test]
    async fn complete_when_monthly_coverage_brackets_the_window_by_month() {
        let source = FixtureSource::new()
            .with_program_monthly(
                1,
                vec![
                    point(2020, 1, 15, 0.01),
                    point(2020, 2, 15, 0.02),
                    point(2020, 3, 15, 0.01),
                ],
            )
            .with_benchmark_monthly(
                5,
                vec![
                    point(2020, 1, 20, 0.00),
                    point(2020, 2, 20, 0.01),
                    point(2020, 3, 20, 0.02),
                ],
            );
        // Mid-month record dates still cover a full-month window bound.
        let def = definition(d(2020, 1, 1), d(2020, 3, 31), vec![1], vec![5]);
        let mut window = Window::new(def, source);

        assert!(window.data_is_complete().await.unwrap());
    }

    #[tokio::test]
    async fn incomplete_when_an_entity_stops_before_the_window_end_month() {
        let source = FixtureSource::new().with_program_monthly(
            1,
            vec![point(2020, 1, 15, 0.01), point(2020, 2, 15, 0.02)],
        );
        let def = definition(d(2020, 1, 1), d(2020, 3, 31), vec![1], vec![]);
        let mut window = Window::new(def, source);

        assert!(!window.data_is_complete().await.unwrap());
    }

    #[tokio::test]
    async fn missing_entity_is_incomplete_not_an_error() {
        let source = FixtureSource::new();
        let def = definition(d(2020, 1, 1), d(2020, 3, 31), vec![42], vec![7]);
        let mut window = Window::new(def, source);

        assert!(window.program_monthly(42).await.unwrap().is_empty());
        assert!(window.benchmark_monthly(7).await.unwrap().is_empty());
        assert!(!window.data_is_complete().await.unwrap());
    }

    #[tokio::test]
    async fn completeness_is_memoized() {
        let source = FixtureSource::new().with_program_monthly(
            1,
            vec![point(2020, 1, 15, 0.01), point(2020, 3, 15, 0.01)],
        );
        let counter = source.fetch_counter();
        let def = definition(d(2020, 1, 1), d(2020, 3, 31), vec![1], vec![]);
        let mut window = Window::new(def, source);

        assert!(window.data_is_complete().await.unwrap());
        let fetches = counter.load(std::sync::atomic::Ordering::SeqCst);
        assert!(window.data_is_complete().await.unwrap());
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), fetches);
    }
}
