//! # Meridian Engine
//!
//! Window materialization and statistics orchestration: the layer that
//! turns a cheap `WindowDefinition` into actual return data and hands it to
//! the analytics calculator.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Orchestration:** Consumes `core-types` (the storage seam),
//!   `windowing` (definitions) and `analytics` (pure computation). It owns
//!   the fetch-and-cache session state and nothing else.
//! - **One window, one session:** A `Window` caches everything it fetches
//!   for its own lifetime and is used through `&mut self`, so exclusive
//!   access is enforced by the compiler rather than by a lock.
//!
//! ## Public API
//!
//! - `Window`: lazily materialized return data for one definition.
//! - `compute_statistics`: the daily-first / monthly-fallback policy.
//! - `EngineError`: storage failures surfaced during materialization.

pub mod error;
pub mod stats;
pub mod window;

#[cfg(test)]
mod tests_support;

// Re-export the key components to create a clean, public-facing API.
pub use error::EngineError;
pub use stats::compute_statistics;
pub use window::Window;
