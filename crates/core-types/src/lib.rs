//! # Meridian Core Types
//!
//! The shared vocabulary of the system. Every other crate speaks in terms of
//! the types defined here.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** This crate has no knowledge of storage, windowing policy,
//!   or statistics. It defines the data that flows between those layers.
//! - **The storage seam:** `ReturnsSource` is the only contract the analysis
//!   layers hold against the relational store. The database adapter
//!   implements it; tests substitute an in-memory fixture.

pub mod enums;
pub mod error;
pub mod source;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{EntityKind, Resolution};
pub use error::SourceError;
pub use source::ReturnsSource;
pub use structs::{MarketId, ProgramId, ReturnPoint, ReturnSeries};
