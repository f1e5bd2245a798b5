//! # Meridian Windowing
//!
//! Window definitions and the generators that produce them. This crate
//! decides *what and when* to analyze; it never touches data.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure functions of their inputs. No I/O, no storage
//!   knowledge, safe to call from anywhere.
//! - **Definitions are cheap:** A `WindowDefinition` is a lightweight value.
//!   Generating thousands of them costs nothing until a window is
//!   materialized by the engine crate.
//!
//! ## Public API
//!
//! - `WindowDefinition`: date range + participants, serializable.
//! - `generators`: the six windowing policies (calendar-snapped,
//!   sequential, reverse-anchored with borrowing, rolling, trailing,
//!   bespoke).
//! - `WindowError`: validation failures for malformed inputs.

pub mod definition;
pub mod error;
pub mod generators;

// Re-export the key components to create a clean, public-facing API.
pub use definition::WindowDefinition;
pub use error::WindowError;
pub use generators::BespokeWindow;
