use jiff::civil::Weekday;

/// How a monthly or longer periodicity picks the day of the month.
///
/// Like [`Periodicity`](crate::Periodicity), values round-trip through
/// a fixed catalog of canonical names. The nth-weekday family covers
/// the first through fourth occurrence of each weekday plus the last
/// one (`1MON` through `4SUN`, then `LMON` through `LSUN`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MonthRule {
    /// No rule configured. A rule with an era date falls back to the
    /// era's day of the month; without one, validation fails.
    #[default]
    None,
    /// The day of the month of the rule's era date.
    EraDerived,
    /// The first day of the month.
    FirstDay,
    /// The last day of the month.
    LastDay,
    /// The first weekday of the month. Converts to and from its
    /// catalog name, but evaluating it is not implemented.
    FirstWeekday,
    /// Recognized but not implemented.
    LastWeekday,
    /// Recognized but not implemented.
    FirstWorkday,
    /// Recognized but not implemented.
    LastWorkday,
    /// The nth occurrence of a weekday in the month. `nth` is 1
    /// through 4, or -1 for the last occurrence.
    Nth { nth: i8, weekday: Weekday },
    /// An unrecognized catalog name, kept so that parsing is total.
    Invalid,
}

/// The catalog of canonical month rule names, case-sensitive.
const NAMES: &[(&str, MonthRule)] = &[
    ("NONE", MonthRule::None),
    ("ERADAY", MonthRule::EraDerived),
    ("FIRSTDAY", MonthRule::FirstDay),
    ("LASTDAY", MonthRule::LastDay),
    ("FIRSTWEEKDAY", MonthRule::FirstWeekday),
    ("LASTWEEKDAY", MonthRule::LastWeekday),
    ("FIRSTWORKDAY", MonthRule::FirstWorkday),
    ("LASTWORKDAY", MonthRule::LastWorkday),
    ("1MON", MonthRule::Nth { nth: 1, weekday: Weekday::Monday }),
    ("1TUE", MonthRule::Nth { nth: 1, weekday: Weekday::Tuesday }),
    ("1WED", MonthRule::Nth { nth: 1, weekday: Weekday::Wednesday }),
    ("1THU", MonthRule::Nth { nth: 1, weekday: Weekday::Thursday }),
    ("1FRI", MonthRule::Nth { nth: 1, weekday: Weekday::Friday }),
    ("1SAT", MonthRule::Nth { nth: 1, weekday: Weekday::Saturday }),
    ("1SUN", MonthRule::Nth { nth: 1, weekday: Weekday::Sunday }),
    ("2MON", MonthRule::Nth { nth: 2, weekday: Weekday::Monday }),
    ("2TUE", MonthRule::Nth { nth: 2, weekday: Weekday::Tuesday }),
    ("2WED", MonthRule::Nth { nth: 2, weekday: Weekday::Wednesday }),
    ("2THU", MonthRule::Nth { nth: 2, weekday: Weekday::Thursday }),
    ("2FRI", MonthRule::Nth { nth: 2, weekday: Weekday::Friday }),
    ("2SAT", MonthRule::Nth { nth: 2, weekday: Weekday::Saturday }),
    ("2SUN", MonthRule::Nth { nth: 2, weekday: Weekday::Sunday }),
    ("3MON", MonthRule::Nth { nth: 3, weekday: Weekday::Monday }),
    ("3TUE", MonthRule::Nth { nth: 3, weekday: Weekday::Tuesday }),
    ("3WED", MonthRule::Nth { nth: 3, weekday: Weekday::Wednesday }),
    ("3THU", MonthRule::Nth { nth: 3, weekday: Weekday::Thursday }),
    ("3FRI", MonthRule::Nth { nth: 3, weekday: Weekday::Friday }),
    ("3SAT", MonthRule::Nth { nth: 3, weekday: Weekday::Saturday }),
    ("3SUN", MonthRule::Nth { nth: 3, weekday: Weekday::Sunday }),
    ("4MON", MonthRule::Nth { nth: 4, weekday: Weekday::Monday }),
    ("4TUE", MonthRule::Nth { nth: 4, weekday: Weekday::Tuesday }),
    ("4WED", MonthRule::Nth { nth: 4, weekday: Weekday::Wednesday }),
    ("4THU", MonthRule::Nth { nth: 4, weekday: Weekday::Thursday }),
    ("4FRI", MonthRule::Nth { nth: 4, weekday: Weekday::Friday }),
    ("4SAT", MonthRule::Nth { nth: 4, weekday: Weekday::Saturday }),
    ("4SUN", MonthRule::Nth { nth: 4, weekday: Weekday::Sunday }),
    ("LMON", MonthRule::Nth { nth: -1, weekday: Weekday::Monday }),
    ("LTUE", MonthRule::Nth { nth: -1, weekday: Weekday::Tuesday }),
    ("LWED", MonthRule::Nth { nth: -1, weekday: Weekday::Wednesday }),
    ("LTHU", MonthRule::Nth { nth: -1, weekday: Weekday::Thursday }),
    ("LFRI", MonthRule::Nth { nth: -1, weekday: Weekday::Friday }),
    ("LSAT", MonthRule::Nth { nth: -1, weekday: Weekday::Saturday }),
    ("LSUN", MonthRule::Nth { nth: -1, weekday: Weekday::Sunday }),
];

impl MonthRule {
    /// Parses a month rule from its canonical catalog name.
    ///
    /// Case-sensitive and total: unknown names yield
    /// [`MonthRule::Invalid`].
    pub fn parse(name: &str) -> MonthRule {
        NAMES
            .iter()
            .find(|&&(n, _)| n == name)
            .map_or(MonthRule::Invalid, |&(_, r)| r)
    }

    /// Returns the canonical catalog name, or `None` for
    /// [`MonthRule::Invalid`] and for `Nth` ordinals outside the
    /// catalog.
    pub fn name(self) -> Option<&'static str> {
        NAMES.iter().find(|&&(_, r)| r == self).map(|&(n, _)| n)
    }
}

impl std::fmt::Display for MonthRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name().unwrap_or("INVALID"))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MonthRule {
    fn serialize<S: serde::Serializer>(
        &self,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => s.serialize_str(name),
            None => Err(<S::Error as serde::ser::Error>::custom(
                "month rule has no canonical name",
            )),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MonthRule {
    fn deserialize<D: serde::Deserializer<'de>>(
        d: D,
    ) -> Result<MonthRule, D::Error> {
        struct V;

        impl<'de> serde::de::Visitor<'de> for V {
            type Value = MonthRule;

            fn expecting(
                &self,
                f: &mut std::fmt::Formatter,
            ) -> std::fmt::Result {
                f.write_str("a canonical month rule name")
            }

            fn visit_str<E: serde::de::Error>(
                self,
                v: &str,
            ) -> Result<MonthRule, E> {
                Ok(MonthRule::parse(v))
            }
        }
        d.deserialize_str(V)
    }
}

/// Returns the day of the month of the `nth` occurrence of `weekday`
/// in the given month, or `None` when the month has no such
/// occurrence. An `nth` of -1 selects the last occurrence.
///
/// The year and month given must name a valid month.
pub(crate) fn weekday_day_of_month(
    year: i16,
    month: i8,
    nth: i8,
    weekday: Weekday,
) -> Option<i8> {
    let first = jiff::civil::date(year, month, 1);
    if nth == -1 {
        let last = first.last_of_month();
        return Some(last.day() - last.weekday().since(weekday));
    }
    let day = 1 + weekday.since(first.weekday()) + 7 * (nth - 1);
    (day <= first.days_in_month()).then_some(day)
}
