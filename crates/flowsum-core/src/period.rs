// ── Time period parsing ──
//
// Human-entered durations like "15m", "30s", "2d", "1.5". The unit is
// found by substring containment with a fixed precedence (m, d, s, h),
// not by anchoring at the end of the token: "5hrs" contains an "s" and
// therefore takes the seconds branch.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::CoreError;

/// Unit a period was entered in. Declaration order is the match precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    #[strum(to_string = "Minutes")]
    Minutes,
    #[strum(to_string = "Days")]
    Days,
    #[strum(to_string = "Seconds")]
    Seconds,
    #[strum(to_string = "Hours")]
    Hours,
}

impl PeriodUnit {
    /// The suffix character that selects this unit.
    pub fn suffix(self) -> char {
        match self {
            Self::Minutes => 'm',
            Self::Days => 'd',
            Self::Seconds => 's',
            Self::Hours => 'h',
        }
    }

    fn to_hours(self, value: f64) -> f64 {
        match self {
            Self::Minutes => value / 60.0,
            Self::Days => value * 24.0,
            Self::Seconds => value / 3600.0,
            Self::Hours => value,
        }
    }
}

/// A non-negative duration, canonically held in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Period {
    hours: f64,
    /// The number as entered, before unit conversion.
    value: f64,
    unit: PeriodUnit,
}

impl Period {
    /// Parse a period string. See the module docs for suffix precedence.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let unit = PeriodUnit::iter()
            .find(|u| input.contains(u.suffix()))
            .unwrap_or(PeriodUnit::Hours);

        let numeric = input.replace(unit.suffix(), "");
        let value: f64 = numeric
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidPeriod {
                input: input.into(),
            })?;

        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::InvalidPeriod {
                input: input.into(),
            });
        }

        Ok(Self {
            hours: unit.to_hours(value),
            value,
            unit,
        })
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    /// Whole milliseconds spanned by this period.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn as_millis(&self) -> i64 {
        (self.hours * 3_600_000.0).round() as i64
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn hours(input: &str) -> f64 {
        Period::parse(input).unwrap().hours()
    }

    #[test]
    fn minutes_divide_by_sixty() {
        assert_eq!(hours("15m"), 0.25);
        assert_eq!(Period::parse("15m").unwrap().unit(), PeriodUnit::Minutes);
    }

    #[test]
    fn days_multiply_by_twenty_four() {
        assert_eq!(hours("2d"), 48.0);
    }

    #[test]
    fn seconds_divide_by_thirty_six_hundred() {
        assert_eq!(hours("30s"), 30.0 / 3600.0);
    }

    #[test]
    fn hours_and_bare_numbers_pass_through() {
        assert_eq!(hours("8h"), 8.0);
        assert_eq!(hours("1.5"), 1.5);
        assert_eq!(hours("1"), 1.0);
        assert_eq!(Period::parse("1.5").unwrap().unit(), PeriodUnit::Hours);
    }

    #[test]
    fn suffix_position_does_not_matter() {
        assert_eq!(hours("m15"), 0.25);
        assert_eq!(hours("h8"), 8.0);
    }

    #[test]
    fn minutes_win_over_later_suffixes() {
        // contains both 'm' and 'd': minutes branch strips only 'm'
        assert!(Period::parse("5md").is_err());
        assert_eq!(hours(" 90m "), 1.5);
    }

    #[test]
    fn seconds_checked_before_hours() {
        let err = Period::parse("5hrs").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPeriod { .. }));
    }

    #[test]
    fn every_occurrence_of_the_suffix_is_stripped() {
        assert_eq!(hours("1m0m"), 10.0 / 60.0);
    }

    #[test]
    fn garbage_is_rejected() {
        for input in ["", "abc", "1.2.3", "fifteen"] {
            assert!(
                matches!(Period::parse(input), Err(CoreError::InvalidPeriod { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn negative_and_non_finite_are_rejected() {
        for input in ["-1", "-30m", "inf", "NaN"] {
            assert!(Period::parse(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn display_keeps_entered_value_and_unit() {
        assert_eq!(Period::parse("15m").unwrap().to_string(), "15 Minutes");
        assert_eq!(Period::parse("1.5").unwrap().to_string(), "1.5 Hours");
    }

    #[test]
    fn millis_round_trip_common_values() {
        assert_eq!(Period::parse("1").unwrap().as_millis(), 3_600_000);
        assert_eq!(Period::parse("30s").unwrap().as_millis(), 30_000);
    }
}
