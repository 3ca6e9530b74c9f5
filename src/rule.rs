use std::sync::Arc;

use jiff::{
    ToSpan, Zoned,
    civil::{Date, Weekday},
};

use crate::{
    error::Error,
    exclude::{self, AnnualRange},
    holiday::{HolidayCalendar, Holidays},
    monthrule::{self, MonthRule},
    period::Periodicity,
};

/// The most candidate dates examined for each occurrence before an
/// advance or retard gives up. A little over ten years of daily
/// stepping.
const CANDIDATE_LIMIT: u32 = 3700;

/// A recurrence rule for one scheduled task.
///
/// A rule is created inactive and configured through its setters:
/// a [`Periodicity`], and for monthly or longer cadences a
/// [`MonthRule`] that picks the day within each qualifying month,
/// plus an optional era date, excluded holidays and an annual
/// blackout range. [`CronRule::validate`] checks that the combination
/// is coherent and arms the rule; every setter disarms it again. The
/// queries are [`CronRule::test_date`], which asks whether one date
/// is an occurrence, and [`CronRule::advance`]/[`CronRule::retard`],
/// which step a date across occurrences while skipping excluded
/// candidates.
///
/// # Example
///
/// ```
/// use due::{CronRule, MonthRule, Periodicity};
/// use jiff::civil::date;
///
/// let mut rule = CronRule::new();
/// rule.set_period(Periodicity::Monthly);
/// rule.set_rule(MonthRule::FirstDay);
/// rule.validate()?;
/// assert!(rule.test_date(date(2024, 6, 1)).is_ok());
/// assert!(rule.test_date(date(2024, 6, 2)).is_err());
/// assert_eq!(rule.advance(date(2024, 6, 1), 2)?, date(2024, 8, 1));
/// # Ok::<(), due::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct CronRule {
    period: Periodicity,
    month_rule: MonthRule,
    era: Option<Date>,
    item_offset: i64,
    excluded_holidays: Holidays,
    excluded_range: Option<AnnualRange>,
    calendar: Arc<HolidayCalendar>,
    /// Present if and only if the current configuration passed
    /// `validate`.
    plan: Option<Cadence>,
    last_error: Option<String>,
}

/// The validated, executable form of a rule's configuration.
///
/// Built only by `validate`, which is what guarantees the invariants
/// the variants rely on, most notably that the fortnightly cadence
/// always carries its era date.
#[derive(Clone, Copy, Debug)]
enum Cadence {
    Random,
    Daily,
    MonToSat,
    Weekdays,
    Weekly(Weekday),
    Fortnightly { weekday: Weekday, era: Date },
    Months { step: i8, phase: i8, pin: DayPin },
}

/// How a month-or-longer cadence picks the day within a qualifying
/// month.
#[derive(Clone, Copy, Debug)]
enum DayPin {
    /// A fixed day of the month, taken from the era date. Months too
    /// short for it simply have no occurrence.
    Day(i8),
    First,
    Last,
    Nth { nth: i8, weekday: Weekday },
    /// A recognized month rule whose evaluation is not implemented.
    /// Accepted by `validate`; surfaces as an error from `test_date`.
    Unsupported(MonthRule),
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn signed(self, days: i32) -> i32 {
        match self {
            Direction::Forward => days,
            Direction::Backward => -days,
        }
    }
}

impl CronRule {
    /// Creates an inactive rule with its own private holiday calendar.
    pub fn new() -> CronRule {
        CronRule::with_calendar(Arc::new(HolidayCalendar::new()))
    }

    /// Creates an inactive rule that shares the given holiday
    /// calendar. Rules sharing one calendar also share its per-year
    /// cache.
    pub fn with_calendar(calendar: Arc<HolidayCalendar>) -> CronRule {
        CronRule {
            period: Periodicity::Never,
            month_rule: MonthRule::None,
            era: None,
            item_offset: 0,
            excluded_holidays: Holidays::EMPTY,
            excluded_range: None,
            calendar,
            plan: None,
            last_error: None,
        }
    }

    /// Sets the recurrence period. The rule is disarmed until the next
    /// successful [`CronRule::validate`].
    pub fn set_period(&mut self, period: Periodicity) {
        self.period = period;
        self.plan = None;
    }

    /// Sets the rule that picks the day within a qualifying month.
    /// Only consulted by monthly and longer periodicities. Disarms the
    /// rule.
    pub fn set_rule(&mut self, month_rule: MonthRule) {
        self.month_rule = month_rule;
        self.plan = None;
    }

    /// Sets the era date anchoring fortnightly alternation and, for
    /// month rules that need it, the day of the month. Disarms the
    /// rule.
    pub fn set_era(&mut self, era: Date) {
        self.era = Some(era);
        self.plan = None;
    }

    /// Sets the numbering base for this task's occurrences. Stored for
    /// configuration round-trips; no query consumes it. Disarms the
    /// rule.
    pub fn set_item_offset(&mut self, item_offset: i64) {
        self.item_offset = item_offset;
        self.plan = None;
    }

    /// Excludes advance/retard candidates carrying any of the given
    /// holiday flags. [`Holidays::EMPTY`], the default, disables
    /// holiday exclusion. Disarms the rule.
    pub fn exclude_holidays(&mut self, holidays: Holidays) {
        self.excluded_holidays = holidays;
        self.plan = None;
    }

    /// Excludes the span from the given month/day through the end of
    /// the year, every year. Values are stored as given; the string
    /// form validates them. Disarms the rule.
    pub fn exclude_from(&mut self, month: i8, day: i8) {
        self.excluded_range = Some(AnnualRange::through_year_end(month, day));
        self.plan = None;
    }

    /// Excludes an annual month/day span, inclusive on both ends. A
    /// span whose start sorts after its end wraps the year boundary.
    /// Values are stored as given; the string form validates them.
    /// Disarms the rule.
    pub fn exclude_range(
        &mut self,
        from_month: i8,
        from_day: i8,
        to_month: i8,
        to_day: i8,
    ) {
        self.excluded_range =
            Some(AnnualRange::new(from_month, from_day, to_month, to_day));
        self.plan = None;
    }

    /// Like [`CronRule::exclude_from`], parsing and validating a
    /// `mm:dd` string. On error the previous exclusion settings are
    /// untouched.
    pub fn exclude_from_str(&mut self, s: &str) -> Result<(), Error> {
        let (month, day) = exclude::parse_month_day(s)?;
        self.exclude_from(month, day);
        Ok(())
    }

    /// Like [`CronRule::exclude_range`], parsing and validating two
    /// `mm:dd` strings. On error the previous exclusion settings are
    /// untouched.
    pub fn exclude_range_str(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<(), Error> {
        let (from_month, from_day) = exclude::parse_month_day(from)?;
        let (to_month, to_day) = exclude::parse_month_day(to)?;
        self.exclude_range(from_month, from_day, to_month, to_day);
        Ok(())
    }

    /// Returns the configured periodicity.
    pub fn period(&self) -> Periodicity {
        self.period
    }

    /// Returns the configured month rule.
    pub fn month_rule(&self) -> MonthRule {
        self.month_rule
    }

    /// Returns the era date, if one has been set.
    pub fn era(&self) -> Option<Date> {
        self.era
    }

    /// Returns the numbering base for this task's occurrences.
    pub fn item_offset(&self) -> i64 {
        self.item_offset
    }

    /// Returns the holiday flags excluded from stepping.
    pub fn excluded_holidays(&self) -> Holidays {
        self.excluded_holidays
    }

    /// Returns the annual exclusion span, if one has been set.
    pub fn excluded_range(&self) -> Option<AnnualRange> {
        self.excluded_range
    }

    /// Returns true if the configuration passed [`CronRule::validate`]
    /// and no setter has run since.
    pub fn is_active(&self) -> bool {
        self.plan.is_some()
    }

    /// Returns the message of the most recent validation failure, if
    /// the rule has not validated successfully since.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Checks that the configuration is coherent and arms the rule.
    ///
    /// Incoherent configurations fail with a `NotInitialized` error
    /// whose message is also retained for [`CronRule::last_error`]:
    /// a periodicity of `Never` or `Invalid`, a fortnightly
    /// periodicity without an era date, a monthly or longer
    /// periodicity whose month rule is `None`/`Invalid` or `ERADAY`
    /// without an era date to supply the day, and catalog payloads
    /// outside their range.
    pub fn validate(&mut self) -> Result<(), Error> {
        self.plan = None;
        match self.compile() {
            Ok(cadence) => {
                self.plan = Some(cadence);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn compile(&self) -> Result<Cadence, Error> {
        let cadence = match self.period {
            Periodicity::Never => {
                return Err(Error::NotInitialized(
                    "no periodicity has been set".to_string(),
                ));
            }
            Periodicity::Invalid => {
                return Err(Error::NotInitialized(
                    "the periodicity is not recognized".to_string(),
                ));
            }
            Periodicity::Random => Cadence::Random,
            Periodicity::Daily => Cadence::Daily,
            Periodicity::MonToSat => Cadence::MonToSat,
            Periodicity::Weekdays => Cadence::Weekdays,
            Periodicity::Weekly(weekday) => Cadence::Weekly(weekday),
            Periodicity::Fortnightly(weekday) => {
                let Some(era) = self.era else {
                    return Err(Error::NotInitialized(format!(
                        "periodicity `{}` needs an era date to anchor \
                         its alternating weeks",
                        self.period,
                    )));
                };
                Cadence::Fortnightly { weekday, era }
            }
            Periodicity::Monthly => {
                Cadence::Months { step: 1, phase: 0, pin: self.day_pin()? }
            }
            Periodicity::BiMonthly(parity) => {
                if !(1..=2).contains(&parity) {
                    return Err(Error::NotInitialized(format!(
                        "invalid bi-monthly parity `{parity}` \
                         (values must be in range 1..=2)",
                    )));
                }
                let pin = self.day_pin()?;
                Cadence::Months { step: 2, phase: parity % 2, pin }
            }
            Periodicity::Quarterly(phase) => {
                if !(1..=3).contains(&phase) {
                    return Err(Error::NotInitialized(format!(
                        "invalid quarterly phase `{phase}` \
                         (values must be in range 1..=3)",
                    )));
                }
                let pin = self.day_pin()?;
                Cadence::Months { step: 3, phase: phase % 3, pin }
            }
            Periodicity::HalfYearly(phase) => {
                if !(1..=6).contains(&phase) {
                    return Err(Error::NotInitialized(format!(
                        "invalid half-yearly phase `{phase}` \
                         (values must be in range 1..=6)",
                    )));
                }
                let pin = self.day_pin()?;
                Cadence::Months { step: 6, phase: phase % 6, pin }
            }
            Periodicity::Yearly(month) => {
                if !(1..=12).contains(&month) {
                    return Err(Error::NotInitialized(format!(
                        "invalid yearly month `{month}` \
                         (values must be in range 1..=12)",
                    )));
                }
                let pin = self.day_pin()?;
                Cadence::Months { step: 12, phase: month % 12, pin }
            }
        };
        Ok(cadence)
    }

    /// Resolves the month rule and era into the day pin used by the
    /// month-or-longer cadences.
    fn day_pin(&self) -> Result<DayPin, Error> {
        let pin = match self.month_rule {
            MonthRule::None | MonthRule::Invalid => {
                let Some(era) = self.era else {
                    return Err(Error::NotInitialized(
                        "a monthly or longer periodicity needs a month \
                         rule or an era date to pick the day of the month"
                            .to_string(),
                    ));
                };
                DayPin::Day(era.day())
            }
            MonthRule::EraDerived => {
                let Some(era) = self.era else {
                    return Err(Error::NotInitialized(
                        "month rule `ERADAY` derives its day from the \
                         era date, but none is set"
                            .to_string(),
                    ));
                };
                DayPin::Day(era.day())
            }
            MonthRule::FirstDay => DayPin::First,
            MonthRule::LastDay => DayPin::Last,
            MonthRule::Nth { nth, weekday } => {
                if nth != -1 && !(1..=4).contains(&nth) {
                    return Err(Error::NotInitialized(format!(
                        "invalid weekday ordinal `{nth}` \
                         (ordinals must be 1..=4, or -1 for last)",
                    )));
                }
                DayPin::Nth { nth, weekday }
            }
            rule @ (MonthRule::FirstWeekday
            | MonthRule::LastWeekday
            | MonthRule::FirstWorkday
            | MonthRule::LastWorkday) => DayPin::Unsupported(rule),
        };
        Ok(pin)
    }

    fn cadence(&self) -> Result<Cadence, Error> {
        self.plan.ok_or_else(|| {
            Error::NotInitialized(
                "the rule has not been validated".to_string(),
            )
        })
    }

    /// Reports whether the given date is an occurrence of this rule.
    ///
    /// Exclusions play no part here; they only filter candidates
    /// during [`CronRule::advance`] and [`CronRule::retard`].
    pub fn test_date(&self, date: Date) -> Result<(), Error> {
        match self.cadence()? {
            Cadence::Random | Cadence::Daily => Ok(()),
            Cadence::MonToSat => {
                if date.weekday() == Weekday::Sunday {
                    Err(Error::OutOfRange(date))
                } else {
                    Ok(())
                }
            }
            Cadence::Weekdays => match date.weekday() {
                Weekday::Saturday | Weekday::Sunday => {
                    Err(Error::OutOfRange(date))
                }
                _ => Ok(()),
            },
            Cadence::Weekly(weekday) => {
                if date.weekday() == weekday {
                    Ok(())
                } else {
                    Err(Error::OutOfRange(date))
                }
            }
            Cadence::Fortnightly { weekday, era } => {
                if date.weekday() != weekday {
                    return Err(Error::OutOfRange(date));
                }
                // OK because whole-day spans between civil dates never
                // overflow.
                let days = date.since(era).unwrap().get_days();
                if days.rem_euclid(14) == 0 {
                    Ok(())
                } else {
                    Err(Error::OutOfRange(date))
                }
            }
            Cadence::Months { step, phase, pin } => {
                if date.month() % step != phase {
                    return Err(Error::OutOfRange(date));
                }
                let day = match pin {
                    DayPin::Day(day) => day,
                    DayPin::First => 1,
                    DayPin::Last => date.days_in_month(),
                    DayPin::Nth { nth, weekday } => {
                        match monthrule::weekday_day_of_month(
                            date.year(),
                            date.month(),
                            nth,
                            weekday,
                        ) {
                            Some(day) => day,
                            None => return Err(Error::OutOfRange(date)),
                        }
                    }
                    DayPin::Unsupported(rule) => {
                        return Err(Error::Unsupported(rule));
                    }
                };
                if date.day() == day {
                    Ok(())
                } else {
                    Err(Error::OutOfRange(date))
                }
            }
        }
    }

    /// Steps forward from `from` (or from today when `None`) across
    /// `factor` occurrences and returns the date of the last one.
    ///
    /// Candidates inside the excluded range, or carrying any excluded
    /// holiday flag, are skipped without being counted. For monthly
    /// and longer periodicities the candidates are the first days of
    /// the stepped months; pinning the exact day within a month is
    /// [`CronRule::test_date`]'s job. If `CANDIDATE_LIMIT` candidates
    /// in a row are excluded, or stepping runs off the representable
    /// calendar, this fails with a `NotFound` error.
    pub fn advance(
        &self,
        from: impl Into<Option<Date>>,
        factor: u32,
    ) -> Result<Date, Error> {
        self.step_occurrences(from.into(), factor, Direction::Forward)
    }

    /// The mirror image of [`CronRule::advance`]: steps backward
    /// across `factor` occurrences.
    pub fn retard(
        &self,
        from: impl Into<Option<Date>>,
        factor: u32,
    ) -> Result<Date, Error> {
        self.step_occurrences(from.into(), factor, Direction::Backward)
    }

    fn step_occurrences(
        &self,
        from: Option<Date>,
        factor: u32,
        dir: Direction,
    ) -> Result<Date, Error> {
        let cadence = self.cadence()?;
        if factor == 0 {
            return Err(Error::InvalidArgument(
                "step factor must be at least 1".to_string(),
            ));
        }
        let mut cur = from.unwrap_or_else(|| Zoned::now().date());
        let start = cur;
        let mut remaining = factor;
        let mut attempts = 0;
        while remaining > 0 {
            attempts += 1;
            if attempts > CANDIDATE_LIMIT {
                return Err(Error::NotFound(format!(
                    "no qualifying date within {CANDIDATE_LIMIT} \
                     candidates of `{start}`",
                )));
            }
            cur = self.next_candidate(cadence, cur, dir)?;
            if self.is_excluded(cur) {
                log::trace!("candidate {cur} is excluded, continuing");
                continue;
            }
            remaining -= 1;
            attempts = 0;
        }
        Ok(cur)
    }

    /// Computes the next candidate date in the given direction. For
    /// the day families this is the nearest qualifying weekday; the
    /// fortnightly family adds another week on top; the month family
    /// steps whole months and lands on day 1.
    fn next_candidate(
        &self,
        cadence: Cadence,
        cur: Date,
        dir: Direction,
    ) -> Result<Date, Error> {
        let out_of_range = |_| {
            Error::NotFound(format!(
                "ran out of representable dates stepping from `{cur}`"
            ))
        };
        match cadence {
            Cadence::Random | Cadence::Daily => {
                cur.checked_add(dir.signed(1).days()).map_err(out_of_range)
            }
            Cadence::MonToSat => {
                let days = match dir {
                    Direction::Forward => match cur.weekday() {
                        Weekday::Saturday => 2,
                        _ => 1,
                    },
                    Direction::Backward => match cur.weekday() {
                        Weekday::Monday => 2,
                        _ => 1,
                    },
                };
                cur.checked_add(dir.signed(days).days()).map_err(out_of_range)
            }
            Cadence::Weekdays => {
                let days = match dir {
                    Direction::Forward => match cur.weekday() {
                        Weekday::Friday => 3,
                        Weekday::Saturday => 2,
                        _ => 1,
                    },
                    Direction::Backward => match cur.weekday() {
                        Weekday::Monday => 3,
                        Weekday::Sunday => 2,
                        _ => 1,
                    },
                };
                cur.checked_add(dir.signed(days).days()).map_err(out_of_range)
            }
            Cadence::Weekly(weekday) => {
                let days = weekday_step(cur, weekday, dir);
                cur.checked_add(dir.signed(days).days()).map_err(out_of_range)
            }
            Cadence::Fortnightly { weekday, .. } => {
                let days = weekday_step(cur, weekday, dir) + 7;
                cur.checked_add(dir.signed(days).days()).map_err(out_of_range)
            }
            Cadence::Months { step, .. } => {
                let months = i32::from(step).months();
                let first = cur.first_of_month();
                match dir {
                    Direction::Forward => first.checked_add(months),
                    Direction::Backward => first.checked_sub(months),
                }
                .map_err(out_of_range)
            }
        }
    }

    fn is_excluded(&self, date: Date) -> bool {
        if self.excluded_range.is_some_and(|range| range.contains(date)) {
            return true;
        }
        let excluded = self.excluded_holidays;
        !excluded.is_empty()
            && !self.calendar.holidays_on(date, excluded).is_empty()
    }
}

impl Default for CronRule {
    fn default() -> CronRule {
        CronRule::new()
    }
}

/// The minimal day count from `cur` to the nearest occurrence of
/// `weekday` in the given direction, always in 1..=7. A `cur` already
/// on the weekday steps a full week.
fn weekday_step(cur: Date, weekday: Weekday, dir: Direction) -> i32 {
    let days = match dir {
        Direction::Forward => i32::from(weekday.since(cur.weekday())),
        Direction::Backward => i32::from(cur.weekday().since(weekday)),
    };
    if days == 0 { 7 } else { days }
}
