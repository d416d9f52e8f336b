//! Composite `dateRange` filter values
//!
//! A date range is stored in a filter value as two ISO dates joined by an
//! underscore: `"2024-01-01_2024-03-31"`. The interval is inclusive on both ends.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::{FilterSpec, FilterType};
use crate::error::CoreError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const SEPARATOR: char = '_';

/// Longest interval (in days between start and end) a resolver may hand over
pub const DEFAULT_MAX_RANGE_DAYS: i64 = 730;

/// Inclusive calendar interval, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-day range
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Parse the composite `"YYYY-MM-DD_YYYY-MM-DD"` encoding
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let mut parts = value.split(SEPARATOR);
        let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CoreError::malformed_date_range(
                value,
                "expected two dates separated by '_'",
            ));
        };

        let parse_date = |raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
                CoreError::malformed_date_range(value, format!("invalid date '{}': {}", raw, e))
            })
        };
        let start = parse_date(start)?;
        let end = parse_date(end)?;

        if start > end {
            return Err(CoreError::malformed_date_range(value, "start is after end"));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Filter value encoding
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            self.start.format(DATE_FORMAT),
            SEPARATOR,
            self.end.format(DATE_FORMAT)
        )
    }

    /// Number of calendar days covered, both ends included
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Display label for filter tags
    ///
    /// - same day: `"24 Aug 2024"`
    /// - same year: `"24 Aug to 30 Aug 2024"`
    /// - otherwise: `"24 Aug 2023 to 30 Aug 2024"`
    pub fn label(&self) -> String {
        if self.start == self.end {
            self.start.format("%-d %b %Y").to_string()
        } else if self.start.year() == self.end.year() {
            format!(
                "{} to {}",
                self.start.format("%-d %b"),
                self.end.format("%-d %b %Y")
            )
        } else {
            format!(
                "{} to {}",
                self.start.format("%-d %b %Y"),
                self.end.format("%-d %b %Y")
            )
        }
    }

    /// Reject ranges wider than `max_days` between start and end
    pub fn validate(&self, max_days: i64) -> Result<(), CoreError> {
        let days_between = self.span_days() - 1;
        if days_between > max_days {
            return Err(CoreError::DateRangeTooLong {
                span_days: days_between,
                max_days,
            });
        }
        Ok(())
    }

    /// `dateRange` filter triple for this interval
    pub fn to_filter_spec(&self) -> FilterSpec {
        FilterSpec::new(FilterType::DateRange, self.encode(), self.label())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for DateRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_encode() {
        let range = DateRange::parse("2024-01-01_2024-01-05").unwrap();
        assert_eq!(range.start(), ymd(2024, 1, 1));
        assert_eq!(range.end(), ymd(2024, 1, 5));
        assert_eq!(range.encode(), "2024-01-01_2024-01-05");
        assert_eq!(range.span_days(), 5);
    }

    #[test]
    fn test_single_day_span_is_one() {
        let range = DateRange::parse("2024-02-10_2024-02-10").unwrap();
        assert_eq!(range.span_days(), 1);
        assert!(range.contains(ymd(2024, 2, 10)));
        assert!(!range.contains(ymd(2024, 2, 11)));
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        for value in [
            "",
            "2024-01-01",
            "2024-01-01_",
            "2024-01-01_2024-01-05_2024-01-09",
            "yesterday_today",
            "2024-13-01_2024-12-01",
            "2024-03-01_2024-02-01",
        ] {
            assert!(
                matches!(
                    DateRange::parse(value),
                    Err(CoreError::MalformedDateRange { .. })
                ),
                "expected {value:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_new_rejects_reversed_bounds() {
        let err = DateRange::new(ymd(2024, 5, 2), ymd(2024, 5, 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_labels() {
        assert_eq!(DateRange::day(ymd(2024, 8, 24)).label(), "24 Aug 2024");
        assert_eq!(
            DateRange::new(ymd(2024, 8, 24), ymd(2024, 8, 30)).unwrap().label(),
            "24 Aug to 30 Aug 2024"
        );
        assert_eq!(
            DateRange::new(ymd(2023, 8, 24), ymd(2024, 8, 30)).unwrap().label(),
            "24 Aug 2023 to 30 Aug 2024"
        );
    }

    #[test]
    fn test_validate_max_span() {
        let two_years = DateRange::new(ymd(2022, 1, 1), ymd(2024, 1, 1)).unwrap();
        assert!(two_years.validate(DEFAULT_MAX_RANGE_DAYS).is_ok());

        let too_long = DateRange::new(ymd(2022, 1, 1), ymd(2024, 6, 1)).unwrap();
        assert!(matches!(
            too_long.validate(DEFAULT_MAX_RANGE_DAYS),
            Err(CoreError::DateRangeTooLong { max_days: 730, .. })
        ));
    }

    #[test]
    fn test_to_filter_spec() {
        let spec = DateRange::new(ymd(2024, 2, 10), ymd(2024, 2, 11))
            .unwrap()
            .to_filter_spec();
        assert_eq!(spec.kind, FilterType::DateRange);
        assert_eq!(spec.value, "2024-02-10_2024-02-11");
        assert_eq!(spec.label, "10 Feb to 11 Feb 2024");
    }
}
