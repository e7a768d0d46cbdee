use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// A calendar anchored at the start of a simulation window.
///
/// Days are counted in local calendar dates, so a day boundary is always
/// local midnight regardless of how many slots the data actually has.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use soc_sim::sim::clock::Clock;
///
/// let origin = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
/// let clock = Clock::new(origin);
/// let at = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(clock.day_index(at), 4);
/// assert!(Clock::is_midnight(at));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    /// Local date of day 0.
    origin: NaiveDate,
}

impl Clock {
    pub fn new(origin: NaiveDate) -> Self {
        Self { origin }
    }

    /// Anchors the clock at `window_start`, falling back to the date of the
    /// first timestamp. Returns `None` for an empty window.
    pub fn starting_at(first: Option<NaiveDateTime>, window_start: Option<NaiveDate>) -> Option<Self> {
        first.map(|at| Self::new(window_start.unwrap_or(at.date())))
    }

    /// Number of whole calendar days elapsed since the window start.
    pub fn day_index(&self, at: NaiveDateTime) -> i64 {
        (at.date() - self.origin).num_days()
    }

    /// Whether the slot starts exactly at local midnight.
    pub fn is_midnight(at: NaiveDateTime) -> bool {
        at.hour() == 0 && at.minute() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap()
    }

    #[test]
    fn counts_calendar_days_not_slots() {
        let clock = Clock::new(at(1, 13, 30).date());
        assert_eq!(clock.day_index(at(1, 23, 30)), 0);
        assert_eq!(clock.day_index(at(2, 0, 0)), 1);
        assert_eq!(clock.day_index(at(9, 12, 0)), 8);
    }

    #[test]
    fn midnight_detection() {
        assert!(Clock::is_midnight(at(3, 0, 0)));
        assert!(!Clock::is_midnight(at(3, 0, 30)));
        assert!(!Clock::is_midnight(at(3, 12, 0)));
    }

    #[test]
    fn empty_window_has_no_clock() {
        assert!(Clock::starting_at(None, None).is_none());
        assert!(Clock::starting_at(None, Some(at(1, 0, 0).date())).is_none());
    }

    #[test]
    fn window_start_takes_precedence_over_first_record() {
        let clock = Clock::starting_at(Some(at(3, 0, 0)), Some(at(1, 0, 0).date())).unwrap();
        assert_eq!(clock.day_index(at(3, 0, 0)), 2);
        assert_eq!(clock.day_index(at(5, 0, 0)), 4);

        let clock = Clock::starting_at(Some(at(3, 0, 0)), None).unwrap();
        assert_eq!(clock.day_index(at(5, 0, 0)), 2);
    }
}
