use std::{collections::HashMap, sync::Mutex};

use jiff::{
    ToSpan,
    civil::{Date, Weekday, date},
};

/// A set of public holidays, represented as bit flags.
///
/// An "in lieu" flag marks the substitute weekday observed when the
/// fixed date of its holiday lands on a weekend. A lieu flag is only
/// ever recorded on a date different from the fixed one.
#[derive(Clone, Copy, Default, Eq, PartialEq)]
pub struct Holidays(u16);

impl Holidays {
    /// January 1.
    pub const NEW_YEAR: Holidays = Holidays(1 << 0);
    /// The weekday observed for a weekend January 1.
    pub const NEW_YEAR_LIEU: Holidays = Holidays(1 << 1);
    /// Two days before Easter Sunday.
    pub const GOOD_FRIDAY: Holidays = Holidays(1 << 2);
    /// The day after Easter Sunday.
    pub const EASTER_MONDAY: Holidays = Holidays(1 << 3);
    /// May 1, moved to the following Monday when it lands on a weekend.
    pub const MAY_DAY: Holidays = Holidays(1 << 4);
    /// The last Monday of May.
    pub const SPRING_BANK: Holidays = Holidays(1 << 5);
    /// The last Monday of August.
    pub const SUMMER_BANK: Holidays = Holidays(1 << 6);
    /// December 25.
    pub const CHRISTMAS: Holidays = Holidays(1 << 7);
    /// The weekday observed for a weekend December 25.
    pub const CHRISTMAS_LIEU: Holidays = Holidays(1 << 8);
    /// December 26.
    pub const BOXING_DAY: Holidays = Holidays(1 << 9);
    /// The weekday observed for a weekend December 26.
    pub const BOXING_DAY_LIEU: Holidays = Holidays(1 << 10);

    /// Every holiday this calendar knows about.
    pub const ALL: Holidays = Holidays((1 << 11) - 1);
    /// No holidays at all.
    pub const EMPTY: Holidays = Holidays(0);

    /// Returns true if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag set in `other` is also set in `self`.
    pub fn contains(self, other: Holidays) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if at least one flag is set in both `self` and
    /// `other`.
    pub fn intersects(self, other: Holidays) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for Holidays {
    type Output = Holidays;

    fn bitor(self, rhs: Holidays) -> Holidays {
        Holidays(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Holidays {
    fn bitor_assign(&mut self, rhs: Holidays) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for Holidays {
    type Output = Holidays;

    fn bitand(self, rhs: Holidays) -> Holidays {
        Holidays(self.0 & rhs.0)
    }
}

/// Flag names in bit order, for rendering.
const FLAG_NAMES: &[(Holidays, &str)] = &[
    (Holidays::NEW_YEAR, "NEW_YEAR"),
    (Holidays::NEW_YEAR_LIEU, "NEW_YEAR_LIEU"),
    (Holidays::GOOD_FRIDAY, "GOOD_FRIDAY"),
    (Holidays::EASTER_MONDAY, "EASTER_MONDAY"),
    (Holidays::MAY_DAY, "MAY_DAY"),
    (Holidays::SPRING_BANK, "SPRING_BANK"),
    (Holidays::SUMMER_BANK, "SUMMER_BANK"),
    (Holidays::CHRISTMAS, "CHRISTMAS"),
    (Holidays::CHRISTMAS_LIEU, "CHRISTMAS_LIEU"),
    (Holidays::BOXING_DAY, "BOXING_DAY"),
    (Holidays::BOXING_DAY_LIEU, "BOXING_DAY_LIEU"),
];

impl std::fmt::Display for Holidays {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for &(flag, name) in FLAG_NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Holidays {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Holidays({self})")
    }
}

/// A calendar of public holidays, memoized by year.
///
/// Nothing is computed up front. The first query that touches a year
/// fills that year's records and later queries reuse them. A single
/// calendar can serve many rules (wrap it in an `Arc` to share it);
/// queries take `&self` and lock an internal mutex only to consult
/// the cache.
#[derive(Debug)]
pub struct HolidayCalendar {
    years: Mutex<HashMap<i16, Vec<(Date, Holidays)>>>,
}

impl HolidayCalendar {
    /// Creates a calendar with an empty cache.
    pub fn new() -> HolidayCalendar {
        HolidayCalendar { years: Mutex::new(HashMap::new()) }
    }

    /// Returns the holiday flags recorded on the given date, masked by
    /// `selection`. An empty selection selects every holiday.
    ///
    /// Most dates carry no flags. A few carry two, e.g. December 27 in
    /// a year where Christmas fell on Saturday and Boxing Day on
    /// Sunday carries both in-lieu flags at once.
    pub fn holidays_on(&self, date: Date, selection: Holidays) -> Holidays {
        let selection =
            if selection.is_empty() { Holidays::ALL } else { selection };
        let year = date.year();
        let mut years = self.years.lock().unwrap();
        let records = years.entry(year).or_insert_with(|| year_records(year));
        let mut found = Holidays::EMPTY;
        for &(holiday, flags) in records.iter() {
            if holiday == date {
                found |= flags;
            }
        }
        found & selection
    }
}

impl Default for HolidayCalendar {
    fn default() -> HolidayCalendar {
        HolidayCalendar::new()
    }
}

/// Computes every holiday record for one year.
fn year_records(year: i16) -> Vec<(Date, Holidays)> {
    let mut records = Vec::with_capacity(11);
    fixed_with_lieu(
        &mut records,
        date(year, 1, 1),
        Holidays::NEW_YEAR,
        Holidays::NEW_YEAR_LIEU,
    );

    let easter = easter_sunday(year);
    // OK because Easter sits well inside March..=April, nowhere near
    // the ends of the supported range.
    let good_friday = easter.checked_sub(2.days()).unwrap();
    let easter_monday = easter.checked_add(1.days()).unwrap();
    records.push((good_friday, Holidays::GOOD_FRIDAY));
    records.push((easter_monday, Holidays::EASTER_MONDAY));

    // May Day moves off a weekend instead of gaining a separate
    // in-lieu record.
    records.push((roll_to_monday(date(year, 5, 1)), Holidays::MAY_DAY));
    records.push((last_monday(date(year, 5, 31)), Holidays::SPRING_BANK));
    records.push((last_monday(date(year, 8, 31)), Holidays::SUMMER_BANK));

    fixed_with_lieu(
        &mut records,
        date(year, 12, 25),
        Holidays::CHRISTMAS,
        Holidays::CHRISTMAS_LIEU,
    );
    fixed_with_lieu(
        &mut records,
        date(year, 12, 26),
        Holidays::BOXING_DAY,
        Holidays::BOXING_DAY_LIEU,
    );

    log::trace!("computed {} holiday records for {year}", records.len());
    records
}

/// Records a fixed-date holiday, plus its in-lieu day when the fixed
/// date falls on a weekend.
fn fixed_with_lieu(
    records: &mut Vec<(Date, Holidays)>,
    fixed: Date,
    flag: Holidays,
    lieu: Holidays,
) {
    records.push((fixed, flag));
    let observed = roll_to_monday(fixed);
    if observed != fixed {
        records.push((observed, lieu));
    }
}

/// Moves a weekend date to the following Monday: Saturday two days
/// forward, Sunday one. Any other date is returned unchanged.
fn roll_to_monday(d: Date) -> Date {
    let shift = match d.weekday() {
        Weekday::Saturday => 2,
        Weekday::Sunday => 1,
        _ => return d,
    };
    // OK because the roll stays within the date's month.
    d.checked_add(shift.days()).unwrap()
}

/// Returns the last Monday on or before the given date.
fn last_monday(d: Date) -> Date {
    let back = i32::from(d.weekday().since(Weekday::Monday));
    // OK because this moves at most six days back within the month.
    d.checked_sub(back.days()).unwrap()
}

/// The mean length of a synodic month, in days.
const LUNAR_CYCLE: f64 = 29.530588853;

/// A reference full moon, 2019-01-21 05:16 UTC, expressed in days
/// since 1970-01-01.
const FULL_MOON_REF: f64 = 17917.0 + (5.0 * 3600.0 + 16.0 * 60.0) / 86_400.0;

/// Returns Easter Sunday for the given year: the first Sunday strictly
/// after the paschal full moon.
fn easter_sunday(year: i16) -> Date {
    let moon = paschal_full_moon(year);
    // OK because the full moon is near the spring equinox, so the next
    // Sunday always exists.
    moon.nth_weekday(1, Weekday::Sunday).unwrap()
}

/// Returns the date of the first mean full moon on or after March 21
/// of the given year.
///
/// The moon is modeled by repeatedly stepping a whole mean lunar cycle
/// from a fixed reference full moon. That reproduces the ecclesiastical
/// tables for the overwhelming majority of years; it is not an
/// ephemeris.
fn paschal_full_moon(year: i16) -> Date {
    let target = days_since_epoch(date(year, 3, 21)) as f64;
    let mut moon = FULL_MOON_REF;
    while moon < target {
        moon += LUNAR_CYCLE;
    }
    while moon - LUNAR_CYCLE >= target {
        moon -= LUNAR_CYCLE;
    }
    let offset = moon.floor() as i64;
    // OK because the moon is within one lunar cycle of March 21 of a
    // valid year.
    date(1970, 1, 1).checked_add(offset.days()).unwrap()
}

fn days_since_epoch(d: Date) -> i32 {
    // OK because whole-day spans between valid civil dates never
    // overflow.
    d.since(date(1970, 1, 1)).unwrap().get_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renders every flagged date of a year, one line per date.
    fn snapshot_year(year: i16) -> String {
        let cal = HolidayCalendar::new();
        let mut lines = vec![];
        let mut d = date(year, 1, 1);
        while d.year() == year {
            let flags = cal.holidays_on(d, Holidays::EMPTY);
            if !flags.is_empty() {
                lines.push(format!("{d} {flags}"));
            }
            d = d.tomorrow().unwrap();
        }
        lines.join("\n")
    }

    #[test]
    fn year_2022() {
        insta::assert_snapshot!(
            snapshot_year(2022),
            @r"
        2022-01-01 NEW_YEAR
        2022-01-03 NEW_YEAR_LIEU
        2022-04-15 GOOD_FRIDAY
        2022-04-18 EASTER_MONDAY
        2022-05-02 MAY_DAY
        2022-05-30 SPRING_BANK
        2022-08-29 SUMMER_BANK
        2022-12-25 CHRISTMAS
        2022-12-26 CHRISTMAS_LIEU|BOXING_DAY
        ",
        );
    }

    #[test]
    fn year_2024() {
        insta::assert_snapshot!(
            snapshot_year(2024),
            @r"
        2024-01-01 NEW_YEAR
        2024-03-29 GOOD_FRIDAY
        2024-04-01 EASTER_MONDAY
        2024-05-01 MAY_DAY
        2024-05-27 SPRING_BANK
        2024-08-26 SUMMER_BANK
        2024-12-25 CHRISTMAS
        2024-12-26 BOXING_DAY
        ",
        );
    }

    #[test]
    fn christmas_weekend_2021() {
        let cal = HolidayCalendar::new();
        assert_eq!(
            cal.holidays_on(date(2021, 12, 25), Holidays::EMPTY),
            Holidays::CHRISTMAS,
        );
        assert_eq!(
            cal.holidays_on(date(2021, 12, 26), Holidays::EMPTY),
            Holidays::BOXING_DAY,
        );
        assert_eq!(
            cal.holidays_on(date(2021, 12, 27), Holidays::EMPTY),
            Holidays::CHRISTMAS_LIEU | Holidays::BOXING_DAY_LIEU,
        );
        assert_eq!(
            cal.holidays_on(date(2021, 12, 28), Holidays::EMPTY),
            Holidays::EMPTY,
        );
    }

    #[test]
    fn selection_masks_flags() {
        let cal = HolidayCalendar::new();
        let d = date(2021, 12, 27);
        assert_eq!(
            cal.holidays_on(d, Holidays::CHRISTMAS_LIEU),
            Holidays::CHRISTMAS_LIEU,
        );
        assert_eq!(cal.holidays_on(d, Holidays::GOOD_FRIDAY), Holidays::EMPTY);
        let selection = Holidays::GOOD_FRIDAY | Holidays::BOXING_DAY_LIEU;
        assert_eq!(cal.holidays_on(d, selection), Holidays::BOXING_DAY_LIEU);
    }

    #[test]
    fn may_day_rolls_instead_of_seeking_monday() {
        let cal = HolidayCalendar::new();
        // 2024-05-01 is a Wednesday and stays put. A first-Monday rule
        // would put it on 2024-05-06.
        assert_eq!(
            cal.holidays_on(date(2024, 5, 1), Holidays::MAY_DAY),
            Holidays::MAY_DAY,
        );
        assert_eq!(
            cal.holidays_on(date(2024, 5, 6), Holidays::MAY_DAY),
            Holidays::EMPTY,
        );
        // 2022-05-01 is a Sunday and moves one day.
        assert_eq!(
            cal.holidays_on(date(2022, 5, 2), Holidays::MAY_DAY),
            Holidays::MAY_DAY,
        );
        // 2021-05-01 is a Saturday and moves two.
        assert_eq!(
            cal.holidays_on(date(2021, 5, 3), Holidays::MAY_DAY),
            Holidays::MAY_DAY,
        );
        assert_eq!(
            cal.holidays_on(date(2021, 5, 1), Holidays::MAY_DAY),
            Holidays::EMPTY,
        );
    }

    #[test]
    fn easter_sundays() {
        assert_eq!(easter_sunday(2000), date(2000, 4, 23));
        assert_eq!(easter_sunday(2021), date(2021, 4, 4));
        assert_eq!(easter_sunday(2022), date(2022, 4, 17));
        assert_eq!(easter_sunday(2023), date(2023, 4, 9));
        assert_eq!(easter_sunday(2024), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025), date(2025, 4, 20));
        assert_eq!(easter_sunday(2026), date(2026, 4, 5));
        assert_eq!(easter_sunday(2030), date(2030, 4, 21));
        assert_eq!(easter_sunday(2038), date(2038, 4, 25));
    }

    #[test]
    fn easter_is_a_late_march_or_april_sunday() {
        for year in 1990..=2040 {
            let easter = easter_sunday(year);
            assert_eq!(easter.weekday(), Weekday::Sunday, "{year}");
            assert!(easter > date(year, 3, 21), "{year}");
            assert!(easter < date(year, 5, 1), "{year}");
        }
    }

    #[test]
    fn display_flags() {
        assert_eq!(Holidays::EMPTY.to_string(), "NONE");
        assert_eq!(Holidays::MAY_DAY.to_string(), "MAY_DAY");
        let flags = Holidays::BOXING_DAY | Holidays::NEW_YEAR;
        assert_eq!(flags.to_string(), "NEW_YEAR|BOXING_DAY");
        assert_eq!(format!("{flags:?}"), "Holidays(NEW_YEAR|BOXING_DAY)");
    }

    #[test]
    fn flag_set_ops() {
        let flags = Holidays::NEW_YEAR | Holidays::CHRISTMAS;
        assert!(flags.contains(Holidays::NEW_YEAR));
        assert!(!flags.contains(Holidays::BOXING_DAY));
        assert!(flags.intersects(Holidays::CHRISTMAS | Holidays::BOXING_DAY));
        assert!(!flags.intersects(Holidays::GOOD_FRIDAY));
        assert!((flags & Holidays::CHRISTMAS).contains(Holidays::CHRISTMAS));
        assert!(Holidays::ALL.contains(flags));
        assert!(!flags.is_empty());
        assert!(Holidays::EMPTY.is_empty());
    }
}
