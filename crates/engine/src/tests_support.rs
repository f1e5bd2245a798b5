//! In-memory `ReturnsSource` fixture for exercising materialization and
//! statistics orchestration without a database.

use chrono::NaiveDate;
use core_types::{MarketId, ProgramId, ReturnPoint, ReturnSeries, ReturnsSource, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn point(year: i32, month: u32, day: u32, value: f64) -> ReturnPoint {
    ReturnPoint { date: d(year, month, day), value }
}

/// Fixture source backed by in-memory maps. Counts every fetch so tests can
/// assert the window's caching behavior; clips to the requested range like
/// the real repository's SQL does.
#[derive(Default)]
pub struct FixtureSource {
    program_monthly: HashMap<ProgramId, ReturnSeries>,
    program_daily: HashMap<ProgramId, ReturnSeries>,
    benchmark_monthly: HashMap<MarketId, ReturnSeries>,
    benchmark_daily: HashMap<MarketId, ReturnSeries>,
    fetches: Arc<AtomicUsize>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program_monthly(mut self, id: ProgramId, points: Vec<ReturnPoint>) -> Self {
        self.program_monthly.insert(id, ReturnSeries::new(points));
        self
    }

    pub fn with_program_daily(mut self, id: ProgramId, points: Vec<ReturnPoint>) -> Self {
        self.program_daily.insert(id, ReturnSeries::new(points));
        self
    }

    pub fn with_benchmark_monthly(mut self, id: MarketId, points: Vec<ReturnPoint>) -> Self {
        self.benchmark_monthly.insert(id, ReturnSeries::new(points));
        self
    }

    pub fn with_benchmark_daily(mut self, id: MarketId, points: Vec<ReturnPoint>) -> Self {
        self.benchmark_daily.insert(id, ReturnSeries::new(points));
        self
    }

    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }

    fn fetch(
        &self,
        map: &HashMap<i64, ReturnSeries>,
        id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReturnSeries {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match map.get(&id) {
            Some(series) => series
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .copied()
                .collect(),
            None => ReturnSeries::empty(),
        }
    }
}

impl ReturnsSource for FixtureSource {
    async fn program_monthly_returns(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        Ok(self.fetch(&self.program_monthly, program_id, start, end))
    }

    async fn program_daily_returns(
        &self,
        program_id: ProgramId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        Ok(self.fetch(&self.program_daily, program_id, start, end))
    }

    async fn benchmark_monthly_returns(
        &self,
        market_id: MarketId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        Ok(self.fetch(&self.benchmark_monthly, market_id, start, end))
    }

    async fn benchmark_daily_returns(
        &self,
        market_id: MarketId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReturnSeries, SourceError> {
        Ok(self.fetch(&self.benchmark_daily, market_id, start, end))
    }
}
