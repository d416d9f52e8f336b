use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::period::PeriodLabels;

/// Outcome of a delivery relative to its promised window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[serde(rename = "On Time")]
    OnTime,
    Late,
    Early,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 3] = [Self::OnTime, Self::Late, Self::Early];

    /// Wire/display name, also the value used by `deliveryStatus` filters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTime => "On Time",
            Self::Late => "Late",
            Self::Early => "Early",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single delivery event as served by the data endpoint
///
/// Records are read-only once loaded. Period labels are precomputed by the
/// producer and only used as equality targets for discrete time filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Calendar date of the delivery (`YYYY-MM-DD` on the wire)
    pub date: NaiveDate,

    pub region: String,

    #[serde(default)]
    pub country: String,

    /// State/province level geography, absent for many countries
    #[serde(default)]
    pub subdivision: Option<String>,

    pub delivery_status: DeliveryStatus,

    /// Present iff `delivery_status` is `Late`
    #[serde(default)]
    pub late_reason: Option<String>,

    #[serde(default)]
    pub carrier: String,

    #[serde(default)]
    pub order_value: f64,

    /// Delivery time in hours
    #[serde(default)]
    pub delivery_time: f64,

    #[serde(default)]
    pub quarter: String,

    #[serde(default)]
    pub month: String,

    #[serde(default)]
    pub week: String,

    #[serde(default)]
    pub day: String,
}

impl LogisticsRecord {
    /// Create a record with period labels derived from `date`
    pub fn new(
        date: NaiveDate,
        region: impl Into<String>,
        country: impl Into<String>,
        delivery_status: DeliveryStatus,
    ) -> Self {
        let labels = PeriodLabels::for_date(date);
        Self {
            id: None,
            date,
            region: region.into(),
            country: country.into(),
            subdivision: None,
            delivery_status,
            late_reason: None,
            carrier: String::new(),
            order_value: 0.0,
            delivery_time: 0.0,
            quarter: labels.quarter,
            month: labels.month,
            week: labels.week,
            day: labels.day,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_subdivision(mut self, subdivision: impl Into<String>) -> Self {
        self.subdivision = Some(subdivision.into());
        self
    }

    pub fn with_late_reason(mut self, reason: impl Into<String>) -> Self {
        self.late_reason = Some(reason.into());
        self
    }

    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = carrier.into();
        self
    }

    pub fn with_order_value(mut self, order_value: f64) -> Self {
        self.order_value = order_value;
        self
    }

    pub fn with_delivery_time(mut self, hours: f64) -> Self {
        self.delivery_time = hours;
        self
    }

    /// Period labels currently stored on the record
    pub fn periods(&self) -> PeriodLabels {
        PeriodLabels {
            quarter: self.quarter.clone(),
            month: self.month.clone(),
            week: self.week.clone(),
            day: self.day.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_record() {
        let json = r#"{
            "id": "order-17",
            "date": "2024-02-10",
            "region": "Europe",
            "country": "Germany",
            "subdivision": null,
            "deliveryStatus": "Late",
            "lateReason": "Weather Delays",
            "carrier": "DHL",
            "orderValue": 1520,
            "deliveryTime": 61.4,
            "quarter": "Q1 2024",
            "month": "Feb 2024",
            "week": "Week of Feb 4, 2024",
            "day": "Feb 10, 2024"
        }"#;

        let record: LogisticsRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("order-17"));
        assert_eq!(record.delivery_status, DeliveryStatus::Late);
        assert_eq!(record.late_reason.as_deref(), Some("Weather Delays"));
        assert_eq!(record.subdivision, None);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    }

    #[test]
    fn test_on_time_status_uses_spaced_name() {
        let json = serde_json::to_string(&DeliveryStatus::OnTime).unwrap();
        assert_eq!(json, "\"On Time\"");
        assert_eq!(DeliveryStatus::OnTime.to_string(), "On Time");
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"date": "2024-05-01", "region": "Africa", "deliveryStatus": "Early"}"#;
        let record: LogisticsRecord = serde_json::from_str(json).unwrap();
        assert!(record.country.is_empty());
        assert!(record.carrier.is_empty());
        assert!(record.week.is_empty());
    }

    #[test]
    fn test_builder_derives_period_labels() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let record = LogisticsRecord::new(date, "Europe", "Germany", DeliveryStatus::Late)
            .with_late_reason("Customs Issues")
            .with_carrier("DHL");

        assert_eq!(record.day, "Feb 10, 2024");
        assert_eq!(record.month, "Feb 2024");
        assert_eq!(record.periods(), PeriodLabels::for_date(date));
        assert_eq!(record.carrier, "DHL");
    }
}
