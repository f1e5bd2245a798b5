use crate::statistics::{Statistics, StdDevBasis};
use chrono::{Datelike, NaiveDate};
use core_types::{ReturnPoint, ReturnSeries};

/// Annualization constant for daily return dispersion (industry standard).
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// A stateless calculator reducing return series to performance statistics.
///
/// Daily data is the preferred input: dispersion and drawdowns are computed
/// from it, and it is compounded into monthly returns for the remaining
/// measures. When only monthly data exists the engine falls back to a
/// degraded monthly-only computation, flagged via `StdDevBasis`.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    nav_base: f64,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self { nav_base: 1000.0 }
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `nav_base` as the compounded-NAV starting value and the
    /// fixed notional of the simple (re-invested) simulation.
    pub fn with_nav_base(nav_base: f64) -> Self {
        Self { nav_base }
    }

    /// Full-fidelity path: daily returns drive std-dev and drawdowns, and
    /// are compounded into monthly returns for mean/median/cumulative/CAGR.
    ///
    /// The window bounds are the annualization base for CAGR — the actual
    /// calendar span, not the observation count, so short or incomplete
    /// windows are still annualized correctly.
    pub fn calculate_from_daily(
        &self,
        daily: &ReturnSeries,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Statistics {
        if daily.is_empty() {
            return Statistics::empty(StdDevBasis::AnnualizedDaily);
        }

        let daily_values = daily.values();
        let daily_std_dev_raw = sample_std_dev(&daily_values);

        let monthly = aggregate_daily_to_monthly(daily);
        let monthly_values = monthly.values();

        let mut stats = self.monthly_core(&monthly_values, window_start, window_end);
        stats.daily_count = daily_values.len();
        stats.daily_std_dev_raw = daily_std_dev_raw;
        stats.std_dev = annualize_daily_std(daily_std_dev_raw);
        stats.std_dev_basis = StdDevBasis::AnnualizedDaily;

        // Finest available resolution for drawdowns: daily captures
        // intra-month troughs that month-end values smooth over.
        stats.max_drawdown_compounded = self.max_drawdown_compounded(&daily_values);
        stats.max_drawdown_simple = self.max_drawdown_simple(&daily_values);

        stats
    }

    /// Degraded fallback for entities with monthly records only. The
    /// std-dev is the raw monthly sample standard deviation — a different,
    /// lower-fidelity quantity than the daily path produces, which is why
    /// `Statistics` carries the basis flag instead of overloading the field
    /// silently.
    pub fn calculate_from_monthly(
        &self,
        monthly: &ReturnSeries,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Statistics {
        if monthly.is_empty() {
            return Statistics::empty(StdDevBasis::UnannualizedMonthly);
        }

        let monthly_values = monthly.values();

        let mut stats = self.monthly_core(&monthly_values, window_start, window_end);
        stats.std_dev = sample_std_dev(&monthly_values);
        stats.std_dev_basis = StdDevBasis::UnannualizedMonthly;
        stats.max_drawdown_compounded = self.max_drawdown_compounded(&monthly_values);
        stats.max_drawdown_simple = self.max_drawdown_simple(&monthly_values);

        stats
    }

    /// The monthly-derived measures shared by both paths. Dispersion and
    /// drawdown fields are left NaN for the caller to fill at the
    /// appropriate resolution.
    fn monthly_core(
        &self,
        monthly_values: &[f64],
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Statistics {
        let cumulative_compounded = monthly_values.iter().fold(1.0, |nav, r| nav * (1.0 + r)) - 1.0;

        Statistics {
            count: monthly_values.len(),
            daily_count: 0,
            mean: mean(monthly_values),
            median: median(monthly_values),
            std_dev: f64::NAN,
            std_dev_basis: StdDevBasis::UnannualizedMonthly,
            daily_std_dev_raw: f64::NAN,
            cumulative_return_compounded: cumulative_compounded,
            cumulative_return_simple: monthly_values.iter().sum(),
            max_drawdown_compounded: f64::NAN,
            max_drawdown_simple: f64::NAN,
            cagr: cagr(cumulative_compounded, window_start, window_end),
        }
    }

    /// Maximum percentage decline from a running peak of a NAV that starts
    /// at the base value and compounds every return.
    fn max_drawdown_compounded(&self, returns: &[f64]) -> f64 {
        if returns.is_empty() {
            return f64::NAN;
        }

        let mut nav = self.nav_base;
        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown = 0.0;

        for r in returns {
            nav *= 1.0 + r;
            if nav > peak {
                peak = nav;
            }
            let drawdown = (nav - peak) / peak;
            if drawdown < max_drawdown {
                max_drawdown = drawdown;
            }
        }

        max_drawdown
    }

    /// Maximum decline, in currency units, of cumulative P&L when the base
    /// notional is re-invested every period without compounding.
    fn max_drawdown_simple(&self, returns: &[f64]) -> f64 {
        if returns.is_empty() {
            return f64::NAN;
        }

        let mut cumulative_pnl = 0.0;
        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown = 0.0;

        for r in returns {
            cumulative_pnl += self.nav_base * r;
            if cumulative_pnl > peak {
                peak = cumulative_pnl;
            }
            let drawdown = cumulative_pnl - peak;
            if drawdown < max_drawdown {
                max_drawdown = drawdown;
            }
        }

        max_drawdown
    }
}

/// Compounds daily returns into one observation per calendar month,
/// dated at the month's last available day.
///
/// Input must be ordered by ascending date (the `ReturnSeries` contract).
pub fn aggregate_daily_to_monthly(daily: &ReturnSeries) -> ReturnSeries {
    let mut points = Vec::new();
    let mut open: Option<((i32, u32), f64, NaiveDate)> = None;

    for p in daily.iter() {
        let month = (p.date.year(), p.date.month());
        open = Some(match open {
            Some((current, factor, _)) if current == month => {
                (current, factor * (1.0 + p.value), p.date)
            }
            Some((_, factor, last_date)) => {
                points.push(ReturnPoint { date: last_date, value: factor - 1.0 });
                (month, 1.0 + p.value, p.date)
            }
            None => (month, 1.0 + p.value, p.date),
        });
    }

    if let Some((_, factor, last_date)) = open {
        points.push(ReturnPoint { date: last_date, value: factor - 1.0 });
    }

    ReturnSeries::new(points)
}

/// Annualizes a daily standard deviation by √252.
pub fn annualize_daily_std(daily_std: f64) -> f64 {
    daily_std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sample standard deviation (ddof = 1). NaN below two observations — a
/// single point has no dispersion, and callers must check rather than
/// receive a misleading zero.
fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Annualized compounded return over the window's elapsed calendar time
/// (`days / 365.25`), zero for a zero-length span.
fn cagr(cumulative_compounded: f64, window_start: NaiveDate, window_end: NaiveDate) -> f64 {
    let days = (window_end - window_start).num_days();
    let years = days as f64 / 365.25;
    if years > 0.0 {
        (1.0 + cumulative_compounded).powf(1.0 / years) - 1.0
    } else {
        0.0
    }
}
