use serde::{Deserialize, Serialize};

/// Which series `Statistics::std_dev` was derived from.
///
/// The two bases are not numerically comparable: the daily basis is
/// annualized by √252, the monthly fallback is a raw sample standard
/// deviation. Consumers must check this flag before comparing dispersion
/// across entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevBasis {
    /// Sample std-dev of daily returns, annualized by √252.
    AnnualizedDaily,
    /// Sample std-dev of monthly returns, not annualized. Degraded
    /// fidelity, used only when no daily data exists.
    UnannualizedMonthly,
}

/// Statistical measures for one (entity, window) pair.
///
/// Provides both compounded and simple (non-compounded) views:
/// - Compounded: start with a fixed NAV base and compound every return.
/// - Simple: re-invest the fixed base every period, withdrawing profits and
///   topping up losses, so each period's P&L is `base × return`.
///
/// Mean/median/CAGR are monthly-based; `std_dev` and both drawdowns come
/// from daily returns whenever daily data exists. A window with zero
/// observations yields zero counts and NaN everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of monthly return observations.
    pub count: usize,
    /// Number of daily observations behind `std_dev` (0 when monthly-only).
    pub daily_count: usize,
    /// Average monthly return (decimal, 0.01 = 1%).
    pub mean: f64,
    /// Median monthly return.
    pub median: f64,
    /// Return dispersion; interpret via `std_dev_basis`.
    pub std_dev: f64,
    /// Fidelity flag for `std_dev`.
    pub std_dev_basis: StdDevBasis,
    /// Sample std-dev of daily returns before annualization; NaN when no
    /// daily data.
    pub daily_std_dev_raw: f64,
    /// Product of (1 + r) over all monthly returns, minus one.
    pub cumulative_return_compounded: f64,
    /// Sum of all monthly returns.
    pub cumulative_return_simple: f64,
    /// Most negative peak-to-trough decline of the compounded NAV, as a
    /// fraction of the running peak (≤ 0).
    pub max_drawdown_compounded: f64,
    /// Most negative peak-to-trough decline of cumulative fixed-notional
    /// P&L, in currency units (≤ 0).
    pub max_drawdown_simple: f64,
    /// Compound annual growth rate over the window's actual calendar span.
    pub cagr: f64,
}

impl Statistics {
    /// The degenerate record for a window with no observations: zero
    /// counts, NaN for every derived measure.
    pub fn empty(std_dev_basis: StdDevBasis) -> Self {
        Self {
            count: 0,
            daily_count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std_dev: f64::NAN,
            std_dev_basis,
            daily_std_dev_raw: f64::NAN,
            cumulative_return_compounded: f64::NAN,
            cumulative_return_simple: f64::NAN,
            max_drawdown_compounded: f64::NAN,
            max_drawdown_simple: f64::NAN,
            cagr: f64::NAN,
        }
    }

    /// True when the window held no observations at all.
    pub fn is_degenerate(&self) -> bool {
        self.count == 0 && self.daily_count == 0
    }
}
