use jiff::civil::Weekday;

/// How often, and on which kind of day, a scheduled task recurs.
///
/// Values round-trip through a fixed catalog of canonical names via
/// [`Periodicity::parse`] and [`Periodicity::name`]. The weekly and
/// fortnightly families carry the weekday they run on; the monthly and
/// longer families carry which month (or months) of their cycle they
/// run in, with the day of the month chosen separately by a
/// [`MonthRule`](crate::MonthRule).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Periodicity {
    /// Never occurs. This is the state of a freshly created rule.
    #[default]
    Never,
    /// An unrecognized catalog name. Parsing is total, so unknown
    /// names land here instead of failing; validation rejects it.
    Invalid,
    /// Scheduled opportunistically. Treated as daily for stepping.
    Random,
    /// Every day.
    Daily,
    /// Every day except Sunday.
    MonToSat,
    /// Every Monday through Friday.
    Weekdays,
    /// Every week on the given weekday.
    Weekly(Weekday),
    /// Every other week on the given weekday. The alternation is
    /// anchored to the rule's era date.
    Fortnightly(Weekday),
    /// Every month.
    Monthly,
    /// Every other month. The payload selects odd (1) or even (2)
    /// months.
    BiMonthly(i8),
    /// Every three months, starting in month 1, 2 or 3 of the year.
    Quarterly(i8),
    /// Every six months, starting in month 1 through 6 of the year.
    HalfYearly(i8),
    /// Once a year, in the given month (1 through 12).
    Yearly(i8),
}

/// The catalog of canonical periodicity names.
///
/// Lookups are case-sensitive and exact. The weekly family is `E` plus
/// a weekday abbreviation, the fortnightly ("alternating") family `A`
/// plus the same abbreviations.
const NAMES: &[(&str, Periodicity)] = &[
    ("NEVER", Periodicity::Never),
    ("RANDOM", Periodicity::Random),
    ("DAILY", Periodicity::Daily),
    ("MONSAT", Periodicity::MonToSat),
    ("WEEKDAYS", Periodicity::Weekdays),
    ("EMON", Periodicity::Weekly(Weekday::Monday)),
    ("ETUE", Periodicity::Weekly(Weekday::Tuesday)),
    ("EWED", Periodicity::Weekly(Weekday::Wednesday)),
    ("ETHU", Periodicity::Weekly(Weekday::Thursday)),
    ("EFRI", Periodicity::Weekly(Weekday::Friday)),
    ("ESAT", Periodicity::Weekly(Weekday::Saturday)),
    ("ESUN", Periodicity::Weekly(Weekday::Sunday)),
    ("AMON", Periodicity::Fortnightly(Weekday::Monday)),
    ("ATUE", Periodicity::Fortnightly(Weekday::Tuesday)),
    ("AWED", Periodicity::Fortnightly(Weekday::Wednesday)),
    ("ATHU", Periodicity::Fortnightly(Weekday::Thursday)),
    ("AFRI", Periodicity::Fortnightly(Weekday::Friday)),
    ("ASAT", Periodicity::Fortnightly(Weekday::Saturday)),
    ("ASUN", Periodicity::Fortnightly(Weekday::Sunday)),
    ("MONTHLY", Periodicity::Monthly),
    ("BIMON1", Periodicity::BiMonthly(1)),
    ("BIMON2", Periodicity::BiMonthly(2)),
    ("QUART1", Periodicity::Quarterly(1)),
    ("QUART2", Periodicity::Quarterly(2)),
    ("QUART3", Periodicity::Quarterly(3)),
    ("HALF1", Periodicity::HalfYearly(1)),
    ("HALF2", Periodicity::HalfYearly(2)),
    ("HALF3", Periodicity::HalfYearly(3)),
    ("HALF4", Periodicity::HalfYearly(4)),
    ("HALF5", Periodicity::HalfYearly(5)),
    ("HALF6", Periodicity::HalfYearly(6)),
    ("YEAR1", Periodicity::Yearly(1)),
    ("YEAR2", Periodicity::Yearly(2)),
    ("YEAR3", Periodicity::Yearly(3)),
    ("YEAR4", Periodicity::Yearly(4)),
    ("YEAR5", Periodicity::Yearly(5)),
    ("YEAR6", Periodicity::Yearly(6)),
    ("YEAR7", Periodicity::Yearly(7)),
    ("YEAR8", Periodicity::Yearly(8)),
    ("YEAR9", Periodicity::Yearly(9)),
    ("YEAR10", Periodicity::Yearly(10)),
    ("YEAR11", Periodicity::Yearly(11)),
    ("YEAR12", Periodicity::Yearly(12)),
];

impl Periodicity {
    /// Parses a periodicity from its canonical catalog name.
    ///
    /// Matching is case-sensitive and exact. This is total: any name
    /// not in the catalog yields [`Periodicity::Invalid`].
    pub fn parse(name: &str) -> Periodicity {
        NAMES
            .iter()
            .find(|&&(n, _)| n == name)
            .map_or(Periodicity::Invalid, |&(_, p)| p)
    }

    /// Returns the canonical catalog name of this periodicity.
    ///
    /// Returns `None` for [`Periodicity::Invalid`] and for payload
    /// values outside the catalog (for example `Quarterly(7)`), which
    /// have no name.
    pub fn name(self) -> Option<&'static str> {
        NAMES.iter().find(|&&(_, p)| p == self).map(|&(n, _)| n)
    }
}

impl std::fmt::Display for Periodicity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name().unwrap_or("INVALID"))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Periodicity {
    fn serialize<S: serde::Serializer>(
        &self,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => s.serialize_str(name),
            None => Err(<S::Error as serde::ser::Error>::custom(
                "periodicity has no canonical name",
            )),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Periodicity {
    fn deserialize<D: serde::Deserializer<'de>>(
        d: D,
    ) -> Result<Periodicity, D::Error> {
        struct V;

        impl<'de> serde::de::Visitor<'de> for V {
            type Value = Periodicity;

            fn expecting(
                &self,
                f: &mut std::fmt::Formatter,
            ) -> std::fmt::Result {
                f.write_str("a canonical periodicity name")
            }

            fn visit_str<E: serde::de::Error>(
                self,
                v: &str,
            ) -> Result<Periodicity, E> {
                Ok(Periodicity::parse(v))
            }
        }
        d.deserialize_str(V)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_catalog_name() {
        for &(name, period) in NAMES {
            assert_eq!(Periodicity::parse(name), period, "{name}");
            assert_eq!(period.name(), Some(name), "{name}");
        }
    }

    #[test]
    fn catalog_names_are_distinct() {
        for (i, &(name, _)) in NAMES.iter().enumerate() {
            for &(other, _) in &NAMES[i + 1..] {
                assert_ne!(name, other);
            }
        }
    }

    #[test]
    fn unknown_names_are_invalid() {
        assert_eq!(Periodicity::parse(""), Periodicity::Invalid);
        assert_eq!(Periodicity::parse("daily"), Periodicity::Invalid);
        assert_eq!(Periodicity::parse("Daily"), Periodicity::Invalid);
        assert_eq!(Periodicity::parse("DAILY "), Periodicity::Invalid);
        assert_eq!(Periodicity::parse("FORTNIGHTLY"), Periodicity::Invalid);
    }

    #[test]
    fn only_catalog_payloads_have_names() {
        assert_eq!(Periodicity::Invalid.name(), None);
        assert_eq!(Periodicity::Quarterly(7).name(), None);
        assert_eq!(Periodicity::Yearly(0).name(), None);
        assert_eq!(Periodicity::BiMonthly(-1).name(), None);
        assert_eq!(Periodicity::Quarterly(2).name(), Some("QUART2"));
    }

    #[test]
    fn display() {
        assert_eq!(Periodicity::Weekly(Weekday::Friday).to_string(), "EFRI");
        let fortnightly = Periodicity::Fortnightly(Weekday::Sunday);
        assert_eq!(fortnightly.to_string(), "ASUN");
        assert_eq!(Periodicity::Invalid.to_string(), "INVALID");
        assert_eq!(Periodicity::Yearly(99).to_string(), "INVALID");
    }
}
