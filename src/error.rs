//! Library error type.

use std::io;

use crate::config::ConfigError;

/// Errors raised while loading, selecting, or exporting series.
///
/// The simulators themselves never fail: empty windows, absent optional
/// columns and infeasible recharges all have numeric fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column required by the loader or by load selection is absent.
    #[error("required column not found: {0}")]
    MissingColumn(String),

    /// A cell in a mandatory numeric column could not be parsed.
    #[error("row {row}: column \"{column}\" has non-numeric value \"{value}\"")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
