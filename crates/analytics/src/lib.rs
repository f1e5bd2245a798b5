//! # Meridian Analytics Engine
//!
//! Performance statistics for return series. This crate is the "unbiased
//! judge" of the system: it reduces a window's return data to one
//! `Statistics` record per entity.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate with no knowledge of storage or
//!   windowing policy. It depends only on `core-types`.
//! - **Stateless Calculation:** `AnalyticsEngine` holds only the NAV
//!   simulation base. Same inputs, same outputs, trivially testable.
//! - **Report incompleteness as data:** degenerate inputs (empty series,
//!   single observations) produce NaN fields, never errors.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the calculator, with a daily-resolution path and a
//!   degraded monthly-only fallback path.
//! - `Statistics`: the computed record, tagged with a `StdDevBasis`
//!   fidelity flag.
//! - `aggregate_daily_to_monthly` / `annualize_daily_std`: the resolution
//!   reconciliation helpers.

pub mod engine;
pub mod statistics;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{
    AnalyticsEngine, TRADING_DAYS_PER_YEAR, aggregate_daily_to_monthly, annualize_daily_std,
};
pub use statistics::{Statistics, StdDevBasis};
