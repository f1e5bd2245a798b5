//! # Meridian Database Crate
//!
//! A high-level, application-specific interface to the PostgreSQL return
//! store. It is the system's "permanent archive" of P&L records.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** Encapsulates all database-specific logic behind
//!   the `ReturnsSource` seam plus a handful of catalog queries. No SQL
//!   leaks to the analysis layers.
//! - **Missing data is data:** queries for unknown ids return empty series;
//!   only genuine backend failures become errors.
//! - **Asynchronous & Pooled:** all operations run against a shared
//!   `PgPool` for concurrent access.
//!
//! ## Public API
//!
//! - `connect`: the async function to establish the database connection pool.
//! - `run_migrations`: applies the embedded schema migrations on startup.
//! - `PnlRepository`: the main struct that holds the connection pool and
//!   provides all the high-level data access methods.
//! - `DbError`: the specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{MarketRecord, PnlRepository, ProgramRecord};
