//! CSV ingestion and export.

pub mod export;
pub mod import;

pub use import::{load_csv, read_csv};
