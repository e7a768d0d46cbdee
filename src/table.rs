//! Canonical time-indexed table of half-hour records.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;

/// Column values aligned with the table index; `None` marks a missing cell.
pub type Column = Vec<Option<f64>>;

/// Half-hour records indexed by local wall-clock timestamps.
///
/// The index is strictly increasing and every column has exactly one cell
/// per index entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    index: Vec<NaiveDateTime>,
    columns: BTreeMap<String, Column>,
}

impl Table {
    /// Creates an empty-columned table over `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not strictly increasing.
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        assert!(
            index.iter().tuple_windows().all(|(a, b)| a < b),
            "table index must be strictly increasing"
        );
        Self {
            index,
            columns: BTreeMap::new(),
        }
    }

    /// Adds or replaces a column.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not have one cell per index entry.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Column) {
        assert_eq!(values.len(), self.index.len(), "column length must match index");
        self.columns.insert(name.into(), values);
    }

    /// Builder-style [`Table::insert_column`] for fully populated columns.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        self.insert_column(name, values.into_iter().map(Some).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Whether the column exists and has at least one non-missing value.
    pub fn has_values(&self, name: &str) -> bool {
        self.column(name)
            .is_some_and(|values| values.iter().any(Option::is_some))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Rows with `start <= t <= end`; either bound may be open.
    #[must_use]
    pub fn select_range(&self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        let keep: Vec<usize> = self
            .index
            .iter()
            .positions(|at| start.is_none_or(|s| *at >= s) && end.is_none_or(|e| *at <= e))
            .collect();
        self.take_rows(&keep)
    }

    /// Rows of one local calendar day, `[date 00:00, date+1 00:00)`.
    #[must_use]
    pub fn day_slice(&self, date: NaiveDate) -> Self {
        let keep: Vec<usize> = self.index.iter().positions(|at| at.date() == date).collect();
        self.take_rows(&keep)
    }

    /// Distinct local dates present in the index, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.index.iter().map(NaiveDateTime::date).dedup().collect()
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), rows.iter().map(|&i| values[i]).collect()))
                .collect(),
        }
    }
}

/// Inclusive timestamp bounds covering whole local days, from `start_date`
/// midnight to the last half-hour slot of `end_date`.
pub fn day_window(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let start = start_date.map(|d| d.and_time(NaiveTime::MIN));
    let end = end_date.map(|d| d.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::minutes(30));
    (start, end)
}
