//! Work-week date math.
//!
//! The board's navigable unit is the Sunday-through-Thursday work week.
//! A [`Week`] is an immutable value object; navigation always computes a
//! fresh `Week` instead of mutating in place. All arithmetic goes through
//! chrono, so month and year rollovers behave like the calendar does.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::task::ColumnKey;

/// Number of day columns in a work week (Sunday through Thursday).
pub const WORK_WEEK_DAYS: usize = 5;

/// A Sunday-through-Thursday work week.
///
/// `start` is a Sunday at 00:00:00.000 and `end` the following Thursday at
/// 23:59:59.999. Two weeks are equal iff their `start` timestamps are
/// equal.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hebdo_protocol::Week;
///
/// let wednesday = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
/// let week = Week::bounds(wednesday);
/// assert_eq!(week.start().date(), NaiveDate::from_ymd_opt(2025, 9, 7).unwrap());
/// assert_eq!(week.end().date(), NaiveDate::from_ymd_opt(2025, 9, 11).unwrap());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl PartialEq for Week {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
    }
}

impl Eq for Week {}

impl Week {
    /// Computes the work week for `date`.
    ///
    /// Friday and Saturday have no work week of their own and resolve
    /// forward to the *next* Sunday; Sunday through Thursday snap back to
    /// their own week's Sunday.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use hebdo_protocol::Week;
    ///
    /// let friday = NaiveDate::from_ymd_opt(2025, 9, 12).unwrap();
    /// let week = Week::bounds(friday);
    /// assert_eq!(week.start().date(), NaiveDate::from_ymd_opt(2025, 9, 14).unwrap());
    /// ```
    #[must_use]
    pub fn bounds(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_sunday());
        let sunday = if offset >= 5 {
            date + Duration::days(7 - offset)
        } else {
            date - Duration::days(offset)
        };
        Self {
            start: sunday.and_time(NaiveTime::MIN),
            end: (sunday + Duration::days(4)).and_time(last_instant()),
        }
    }

    /// The week containing today's date, in local time.
    #[must_use]
    pub fn current() -> Self {
        Self::bounds(Local::now().date_naive())
    }

    /// The work week after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::bounds(self.start.date() + Duration::days(7))
    }

    /// The work week before this one.
    #[must_use]
    pub fn previous(&self) -> Self {
        Self::bounds(self.start.date() - Duration::days(7))
    }

    /// The five dates of this week, Sunday through Thursday in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use hebdo_protocol::Week;
    ///
    /// let week = Week::bounds(NaiveDate::from_ymd_opt(2025, 9, 10).unwrap());
    /// let dates = week.dates();
    /// assert_eq!(dates.len(), 5);
    /// assert_eq!(dates[4], NaiveDate::from_ymd_opt(2025, 9, 11).unwrap());
    /// ```
    #[must_use]
    pub fn dates(&self) -> [NaiveDate; WORK_WEEK_DAYS] {
        std::array::from_fn(|i| self.start.date() + Duration::days(i as i64))
    }

    /// Start of the week (Sunday at 00:00:00.000).
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// End of the week (Thursday at 23:59:59.999).
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Returns `true` if `date` falls on one of the week's five days.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start.date() && date <= self.end.date()
    }

    /// The column key for a day column of the board.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use hebdo_protocol::Week;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
    /// assert_eq!(Week::column_key(date), "2025-09-07");
    /// ```
    #[must_use]
    pub fn column_key(date: NaiveDate) -> ColumnKey {
        date.format("%Y-%m-%d").to_string()
    }
}

fn last_instant() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid wall-clock time")
}

/// Calendar-day equality, ignoring time of day.
#[must_use]
pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Returns `true` if `date` is today in local time.
#[must_use]
pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..40_000).prop_map(|n| {
            NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date") + Duration::days(n)
        })
    }

    proptest! {
        /// Re-bounding a week's own start returns the same week.
        #[test]
        fn bounds_is_idempotent(date in arb_date()) {
            let week = Week::bounds(date);
            prop_assert_eq!(Week::bounds(week.start().date()), week);
        }

        /// Friday and Saturday resolve strictly forward, all other days
        /// resolve to a Sunday at or before the input.
        #[test]
        fn weekend_rolls_forward(date in arb_date()) {
            let week = Week::bounds(date);
            match date.weekday() {
                Weekday::Fri | Weekday::Sat => prop_assert!(week.start().date() > date),
                _ => prop_assert!(week.start().date() <= date),
            }
        }

        /// Every computed week runs Sunday through Thursday.
        #[test]
        fn bounds_shape_is_fixed(date in arb_date()) {
            let week = Week::bounds(date);
            prop_assert_eq!(week.start().date().weekday(), Weekday::Sun);
            prop_assert_eq!(week.end().date().weekday(), Weekday::Thu);
            prop_assert_eq!(week.end().date() - week.start().date(), Duration::days(4));
        }

        /// next() and previous() are inverses.
        #[test]
        fn navigation_roundtrips(date in arb_date()) {
            let week = Week::bounds(date);
            prop_assert_eq!(week.next().previous(), week);
            prop_assert_eq!(week.previous().next(), week);
        }
    }
}
