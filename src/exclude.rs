use jiff::civil::Date;

use crate::error::Error;

/// Day counts used to validate the exclusion string forms. Fixed;
/// February is always 28 here.
const DAYS_IN_MONTH: [i8; 12] =
    [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// An inclusive month/day span that repeats every year.
///
/// A span whose start sorts after its end wraps the end of the year,
/// so December 20 through January 5 covers late December and early
/// January of every year.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnnualRange {
    from: (i8, i8),
    to: (i8, i8),
}

impl AnnualRange {
    /// Creates a span from one month/day through another, inclusive on
    /// both ends.
    pub fn new(
        from_month: i8,
        from_day: i8,
        to_month: i8,
        to_day: i8,
    ) -> AnnualRange {
        AnnualRange { from: (from_month, from_day), to: (to_month, to_day) }
    }

    /// Creates a span from the given month/day through December 31.
    pub fn through_year_end(month: i8, day: i8) -> AnnualRange {
        AnnualRange::new(month, day, 12, 31)
    }

    /// Returns true if the date's month and day fall within this span.
    /// The date's year plays no part.
    pub fn contains(&self, date: Date) -> bool {
        let monthday = (date.month(), date.day());
        if self.from <= self.to {
            self.from <= monthday && monthday <= self.to
        } else {
            monthday >= self.from || monthday <= self.to
        }
    }
}

/// Parses a `mm:dd` exclusion string into a validated month/day pair.
///
/// Unparseable syntax is a [`Format`](crate::ErrorKind::Format) error;
/// syntax that parses but names an impossible month or day is a
/// [`BadValue`](crate::ErrorKind::BadValue) error.
pub(crate) fn parse_month_day(s: &str) -> Result<(i8, i8), Error> {
    let Some((month, day)) = s.split_once(':') else {
        return Err(Error::Format(format!(
            "invalid exclusion string `{s}` (expected `mm:dd`)"
        )));
    };
    let month = month.parse::<i32>().map_err(|_| {
        Error::Format(format!("invalid month in exclusion string `{s}`"))
    })?;
    let day = day.parse::<i32>().map_err(|_| {
        Error::Format(format!("invalid day in exclusion string `{s}`"))
    })?;
    check_month_day(month, day)
}

/// Checks a month/day pair against the fixed day-count table and
/// narrows it to the stored width. February 29 never passes.
fn check_month_day(month: i32, day: i32) -> Result<(i8, i8), Error> {
    if !(1..=12).contains(&month) {
        return Err(Error::BadValue(format!(
            "invalid month `{month}` (months must be in range 1..=12)"
        )));
    }
    let days = i32::from(DAYS_IN_MONTH[month as usize - 1]);
    if !(1..=days).contains(&day) {
        return Err(Error::BadValue(format!(
            "invalid day `{day}` for month {month} \
             (days must be in range 1..={days})"
        )));
    }
    Ok((month as i8, day as i8))
}
