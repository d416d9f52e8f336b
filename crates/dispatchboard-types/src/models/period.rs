use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Precomputed period labels carried by every logistics record.
///
/// These are the exact strings chart components emit when a user clicks a
/// time bucket, so discrete time filters match them by equality:
/// - quarter: `"Q1 2024"`
/// - month: `"Jan 2024"`
/// - week: `"Week of Jan 7, 2024"` (weeks start on Sunday)
/// - day: `"Jan 10, 2024"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodLabels {
    pub quarter: String,
    pub month: String,
    pub week: String,
    pub day: String,
}

impl PeriodLabels {
    /// Derive all period labels for a calendar date
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use dispatchboard_types::PeriodLabels;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// let labels = PeriodLabels::for_date(date);
    ///
    /// assert_eq!(labels.quarter, "Q1 2024");
    /// assert_eq!(labels.week, "Week of Jan 7, 2024");
    /// ```
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            quarter: quarter_label(date),
            month: date.format("%b %Y").to_string(),
            week: format!("Week of {}", day_label(week_start(date))),
            day: day_label(date),
        }
    }
}

/// First day (Sunday) of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn quarter_label(date: NaiveDate) -> String {
    format!("Q{} {}", date.month0() / 3 + 1, date.year())
}

fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_labels_mid_week() {
        let labels = PeriodLabels::for_date(ymd(2024, 1, 10));
        assert_eq!(labels.quarter, "Q1 2024");
        assert_eq!(labels.month, "Jan 2024");
        assert_eq!(labels.week, "Week of Jan 7, 2024");
        assert_eq!(labels.day, "Jan 10, 2024");
    }

    #[test]
    fn test_week_crossing_year_boundary() {
        // 2024-01-01 is a Monday, its week starts on Sunday 2023-12-31
        let labels = PeriodLabels::for_date(ymd(2024, 1, 1));
        assert_eq!(labels.week, "Week of Dec 31, 2023");
        assert_eq!(labels.quarter, "Q1 2024");
    }

    #[test]
    fn test_sunday_is_its_own_week_start() {
        assert_eq!(week_start(ymd(2024, 2, 11)), ymd(2024, 2, 11));
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(quarter_label(ymd(2023, 3, 31)), "Q1 2023");
        assert_eq!(quarter_label(ymd(2023, 4, 1)), "Q2 2023");
        assert_eq!(quarter_label(ymd(2023, 12, 31)), "Q4 2023");
    }
}
