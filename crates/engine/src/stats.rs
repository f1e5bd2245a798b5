use crate::error::EngineError;
use crate::window::Window;
use analytics::{AnalyticsEngine, Statistics};
use core_types::{EntityKind, ReturnsSource};
use tracing::debug;

/// Computes statistics for one entity within a materialized window.
///
/// Daily data is fetched first and preferred; entities carrying only
/// monthly records fall back to the degraded monthly computation. Either
/// way the result is a well-formed `Statistics` (possibly NaN-laden for
/// missing entities) — only genuine storage failures return an error.
pub async fn compute_statistics<S: ReturnsSource>(
    engine: &AnalyticsEngine,
    window: &mut Window<S>,
    entity_id: i64,
    kind: EntityKind,
) -> Result<Statistics, EngineError> {
    let window_start = window.definition.start_date;
    let window_end = window.definition.end_date;

    let daily = match kind {
        EntityKind::Program => window.program_daily(entity_id).await?,
        EntityKind::Benchmark => window.benchmark_daily(entity_id).await?,
    };
    if !daily.is_empty() {
        return Ok(engine.calculate_from_daily(daily, window_start, window_end));
    }

    debug!(entity_id, %kind, "no daily data, falling back to monthly returns");
    let monthly = match kind {
        EntityKind::Program => window.program_monthly(entity_id).await?,
        EntityKind::Benchmark => window.benchmark_monthly(entity_id).await?,
    };
    Ok(engine.calculate_from_monthly(monthly, window_start, window_end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::{FixtureSource, d, point};
    use analytics::StdDevBasis;
    use windowing::WindowDefinition;

    fn window_for(source: FixtureSource, programs: Vec<i64>, benchmarks: Vec<i64>) -> Window<FixtureSource> {
        let def =
            WindowDefinition::new(d(2020, 1, 1), d(2020, 3, 31), programs, benchmarks).unwrap();
        Window::new(def, source)
    }

    #[tokio::test]
    async fn prefers_daily_data_when_available() {
        let source = FixtureSource::new()
            .with_program_daily(
                1,
                vec![
                    point(2020, 1, 2, 0.010),
                    point(2020, 1, 3, -0.005),
                    point(2020, 2, 3, 0.020),
                    point(2020, 3, 2, 0.015),
                ],
            )
            .with_program_monthly(
                1,
                vec![
                    point(2020, 1, 31, 0.005),
                    point(2020, 2, 29, 0.020),
                    point(2020, 3, 31, 0.015),
                ],
            );
        let mut window = window_for(source, vec![1], vec![]);

        let stats = compute_statistics(&AnalyticsEngine::new(), &mut window, 1, EntityKind::Program)
            .await
            .unwrap();

        assert_eq!(stats.std_dev_basis, StdDevBasis::AnnualizedDaily);
        assert_eq!(stats.daily_count, 4);
        assert_eq!(stats.count, 3); // three calendar months of daily data
        assert!(stats.daily_std_dev_raw.is_finite());
    }

    #[tokio::test]
    async fn falls_back_to_monthly_records_without_daily_data() {
        let source = FixtureSource::new().with_program_monthly(
            1,
            vec![
                point(2020, 1, 31, 0.01),
                point(2020, 2, 29, 0.02),
                point(2020, 3, 31, 0.03),
            ],
        );
        let mut window = window_for(source, vec![1], vec![]);

        let stats = compute_statistics(&AnalyticsEngine::new(), &mut window, 1, EntityKind::Program)
            .await
            .unwrap();

        assert_eq!(stats.std_dev_basis, StdDevBasis::UnannualizedMonthly);
        assert_eq!(stats.daily_count, 0);
        assert_eq!(stats.count, 3);
        assert!(stats.daily_std_dev_raw.is_nan());
    }

    #[tokio::test]
    async fn benchmarks_resolve_through_their_own_series() {
        let source = FixtureSource::new().with_benchmark_daily(
            5,
            vec![point(2020, 1, 2, 0.002), point(2020, 1, 3, -0.001)],
        );
        let mut window = window_for(source, vec![], vec![5]);

        let stats =
            compute_statistics(&AnalyticsEngine::new(), &mut window, 5, EntityKind::Benchmark)
                .await
                .unwrap();

        assert_eq!(stats.std_dev_basis, StdDevBasis::AnnualizedDaily);
        assert_eq!(stats.daily_count, 2);
    }

    #[tokio::test]
    async fn missing_entity_yields_degenerate_statistics_not_an_error() {
        let source = FixtureSource::new();
        let mut window = window_for(source, vec![99], vec![]);

        let stats =
            compute_statistics(&AnalyticsEngine::new(), &mut window, 99, EntityKind::Program)
                .await
                .unwrap();

        assert!(stats.is_degenerate());
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.cagr.is_nan());
    }

    #[tokio::test]
    async fn cagr_uses_the_window_span_not_the_observation_span() {
        // Two monthly observations inside a three-month window: the
        // annualization base is the window's 90 days, not the 29 days
        // between the observations.
        let source = FixtureSource::new().with_program_monthly(
            1,
            vec![point(2020, 1, 31, 0.01), point(2020, 2, 29, 0.01)],
        );
        let mut window = window_for(source, vec![1], vec![]);

        let stats = compute_statistics(&AnalyticsEngine::new(), &mut window, 1, EntityKind::Program)
            .await
            .unwrap();

        let days = (d(2020, 3, 31) - d(2020, 1, 1)).num_days() as f64;
        let expected = (1.0 + stats.cumulative_return_compounded).powf(365.25 / days) - 1.0;
        assert!((stats.cagr - expected).abs() < 1e-12);
    }
}
