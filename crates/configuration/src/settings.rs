use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analysis: Analysis,
    pub windows: WindowDefaults,
}

/// Parameters of the statistics simulations.
#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    /// Starting value of the compounded NAV simulation, and the fixed
    /// notional re-invested each period in the simple simulation.
    pub nav_base: f64,
}

/// Default window-generation parameters used when the CLI flags are omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowDefaults {
    /// Window length for year-based policies (snapped, reverse).
    pub length_years: u32,
    /// Window length for month-based policies (sequential, rolling, trailing).
    pub length_months: u32,
    /// Slide interval for the overlapping policies.
    pub slide_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: Analysis { nav_base: 1000.0 },
            windows: WindowDefaults {
                length_years: 5,
                length_months: 60,
                slide_months: 1,
            },
        }
    }
}
