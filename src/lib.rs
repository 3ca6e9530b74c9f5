/*!
A calendar recurrence engine for scheduled tasks.

This crate decides *when* a recurring task runs. A [`CronRule`] binds a
[`Periodicity`] (how often) to an optional [`MonthRule`] (which day of
a qualifying month), an optional era date that anchors fortnightly
alternation, and exclusion settings: public holidays from a
[`HolidayCalendar`] and an annual blackout [`AnnualRange`]. Once
validated, a rule answers two kinds of question: whether a given date
is an occurrence ([`CronRule::test_date`]), and what date lies N
occurrences away ([`CronRule::advance`] and [`CronRule::retard`]).

Dates are civil dates from [`jiff`].

# Example

```
use due::{CronRule, MonthRule, Periodicity};
use jiff::civil::date;

// Payday: the last Friday of every month.
let mut rule = CronRule::new();
rule.set_period(Periodicity::Monthly);
rule.set_rule(MonthRule::parse("LFRI"));
rule.validate()?;

assert!(rule.test_date(date(2024, 5, 31)).is_ok());
assert!(rule.test_date(date(2024, 5, 24)).is_err());
# Ok::<(), due::Error>(())
```

Stepping with [`CronRule::advance`] skips excluded dates without
counting them:

```
use due::{CronRule, Holidays, Periodicity};
use jiff::civil::date;

let mut rule = CronRule::new();
rule.set_period(Periodicity::Daily);
rule.exclude_holidays(Holidays::CHRISTMAS | Holidays::BOXING_DAY);
rule.validate()?;

// December 24th, then the 27th: the 25th and 26th do not count.
assert_eq!(rule.advance(date(2024, 12, 23), 2)?, date(2024, 12, 27));
# Ok::<(), due::Error>(())
```

Catalog names round-trip, so configurations survive export and import:

```
use due::Periodicity;

let period = Periodicity::parse("QUART2");
assert_eq!(period, Periodicity::Quarterly(2));
assert_eq!(period.name(), Some("QUART2"));
```

# Optional features

* `serde`: serialization for [`Periodicity`] and [`MonthRule`], going
  through the same canonical catalog names as
  [`Periodicity::parse`]/[`Periodicity::name`].
*/

pub use crate::{
    error::{Error, ErrorKind},
    exclude::AnnualRange,
    holiday::{HolidayCalendar, Holidays},
    monthrule::MonthRule,
    period::Periodicity,
    rule::CronRule,
};

mod error;
mod exclude;
mod holiday;
mod monthrule;
mod period;
mod rule;
