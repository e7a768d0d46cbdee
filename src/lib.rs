//! Battery state-of-charge simulation over half-hour meter records.
//!
//! Records are loaded into a [`table::Table`], load/generation/price series
//! are resolved by [`series`], and one of the [`sim`] strategies turns them
//! into a SOC trajectory whose charging cost is then derived.

/// Command-line arguments.
pub mod cli;
/// Scenario files, presets and validation.
pub mod config;
pub mod error;
/// CSV import of meter records and CSV export of results.
pub mod io;
/// Primary-reserve export offer per slot.
pub mod offer;
/// Load, generation and price series resolved from table columns.
pub mod series;
/// Simulators, allocation, cost derivation and run reports.
pub mod sim;
/// Timestamp-indexed columns of optional values.
pub mod table;

pub use error::{Error, Result};
