//! Calendar helpers and the monthly reporting [`Period`].
//!
//! Dates are timezone-naive calendar dates: two records fall on the same
//! day when their year, month and day match, regardless of where they
//! were entered.

use chrono::{Datelike as _, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{RateioError, Result};

/// A calendar month used as the aggregation window for reports.
///
/// Both bounds are inclusive: the period covers the first day from
/// `00:00:00` through the last day until `23:59:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// First day of the month.
    start: NaiveDate,
    /// Last day of the month.
    end: NaiveDate,
}

impl Period {
    /// Returns the calendar month containing `date`.
    ///
    /// # Errors
    ///
    /// Returns [`RateioError::InvalidPeriod`] if the month bounds cannot be
    /// represented (dates at the edge of the supported calendar).
    #[inline]
    pub fn containing(date: NaiveDate) -> Result<Self> {
        let start = date
            .with_day(1)
            .ok_or_else(|| RateioError::InvalidPeriod(format!("no first day for {date}")))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| RateioError::InvalidPeriod(format!("no last day for {date}")))?;
        Ok(Self { start, end })
    }

    /// Parses a period from `YYYY-MM` or a full `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns [`RateioError::InvalidPeriod`] if the input is empty or not
    /// a valid month/date.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RateioError::InvalidPeriod(
                "reference date is missing".to_owned(),
            ));
        }
        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d"))
            .map_err(|err| RateioError::InvalidPeriod(format!("{trimmed:?}: {err}")))?;
        Self::containing(date)
    }

    /// First day of the period.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the period.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// First instant of the period (`00:00:00` on the first day).
    #[inline]
    #[must_use]
    pub fn start_of_day(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last whole second of the period (`23:59:59` on the last day).
    #[inline]
    #[must_use]
    pub fn end_of_day(&self) -> NaiveDateTime {
        self.end
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| self.end.and_time(NaiveTime::MIN))
    }

    /// Returns `true` if `date` falls inside the period.
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the period.
    #[inline]
    #[must_use]
    pub fn len_days(&self) -> u32 {
        self.end.day()
    }

    /// Every day of the period in ascending order.
    #[inline]
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// The month before this one.
    ///
    /// # Errors
    ///
    /// Returns [`RateioError::InvalidPeriod`] at the start of the calendar.
    #[inline]
    pub fn previous(&self) -> Result<Self> {
        let day = self
            .start
            .pred_opt()
            .ok_or_else(|| RateioError::InvalidPeriod(format!("no month before {}", self.label())))?;
        Self::containing(day)
    }

    /// The month after this one.
    ///
    /// # Errors
    ///
    /// Returns [`RateioError::InvalidPeriod`] at the end of the calendar.
    #[inline]
    pub fn next(&self) -> Result<Self> {
        let day = self
            .end
            .succ_opt()
            .ok_or_else(|| RateioError::InvalidPeriod(format!("no month after {}", self.label())))?;
        Self::containing(day)
    }

    /// Short label such as `2024-03`.
    #[inline]
    #[must_use]
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

impl core::fmt::Display for Period {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.start.format("%Y-%m"))
    }
}

/// Returns `true` if both dates are the same calendar day.
#[inline]
#[must_use]
pub fn same_day(left: NaiveDate, right: NaiveDate) -> bool {
    left.year() == right.year() && left.month() == right.month() && left.day() == right.day()
}

/// Number of days in the month containing `date`.
#[inline]
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    Period::containing(date).map_or(31, |period| period.len_days())
}

/// Adds `months` calendar months, clamping the day to the target month.
///
/// `2024-01-31` plus one month is `2024-02-29`.
#[inline]
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Builds `year-month-day`, clamping `day` to the month's length.
///
/// Used for billing days such as "the 31st" in a 30-day month.
#[must_use]
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = days_in_month(first);
    first.with_day(day.clamp(1, last))
}
