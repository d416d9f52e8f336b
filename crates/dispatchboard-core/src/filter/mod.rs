//! Filter record model
//!
//! A [`Filter`] is one active constraint on the dashboard. Its identity for
//! matching and de-duplication is the `(type, value)` pair; the id only
//! exists so a specific entry can be removed.

pub mod date_range;
pub mod evaluator;
pub mod store;

pub use date_range::DateRange;
pub use evaluator::{filter_for_map, filter_records, FilteredView};
pub use store::FilterStore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Dimension a filter constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Region,
    Country,
    Subdivision,
    Year,
    Quarter,
    Month,
    Week,
    Day,
    DeliveryStatus,
    LateReason,
    Carrier,
    DateRange,
    /// Any type name this engine does not know (e.g. filters produced by a
    /// newer chart component). Never produced by `FromStr`.
    ///
    /// The original name is not kept: every foreign type shares this variant,
    /// so two of them with the same value de-duplicate into one filter, and
    /// serializing writes `"unrecognized"`. Such filters match every record.
    #[serde(other)]
    Unrecognized,
}

impl FilterType {
    /// All recognized filter types, in declaration order
    pub const ALL: [FilterType; 12] = [
        Self::Region,
        Self::Country,
        Self::Subdivision,
        Self::Year,
        Self::Quarter,
        Self::Month,
        Self::Week,
        Self::Day,
        Self::DeliveryStatus,
        Self::LateReason,
        Self::Carrier,
        Self::DateRange,
    ];

    /// Wire name (`deliveryStatus`, `dateRange`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Country => "country",
            Self::Subdivision => "subdivision",
            Self::Year => "year",
            Self::Quarter => "quarter",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::DeliveryStatus => "deliveryStatus",
            Self::LateReason => "lateReason",
            Self::Carrier => "carrier",
            Self::DateRange => "dateRange",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Human-readable name used in generated labels
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Region => "Region",
            Self::Country => "Country",
            Self::Subdivision => "Subdivision",
            Self::Year => "Year",
            Self::Quarter => "Quarter",
            Self::Month => "Month",
            Self::Week => "Week",
            Self::Day => "Day",
            Self::DeliveryStatus => "Delivery Status",
            Self::LateReason => "Late Reason",
            Self::Carrier => "Carrier",
            Self::DateRange => "Date Range",
            Self::Unrecognized => "Filter",
        }
    }

    /// Region, country and subdivision filters
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::Region | Self::Country | Self::Subdivision)
    }

    /// Types that drive drill-down decisions
    pub fn is_time_scoped(&self) -> bool {
        matches!(
            self,
            Self::Year | Self::Quarter | Self::Month | Self::Week | Self::Day | Self::DateRange
        )
    }

    /// Rank of discrete time filters from coarsest (year = 0) to finest (day = 4)
    pub fn time_rank(&self) -> Option<u8> {
        match self {
            Self::Year => Some(0),
            Self::Quarter => Some(1),
            Self::Month => Some(2),
            Self::Week => Some(3),
            Self::Day => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = CoreError;

    /// Strict parse for user input: unknown names are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::UnknownFilterType {
                name: name.to_string(),
            })
    }
}

/// Opaque filter identifier, unique within one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(u64);

impl FilterId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter-{}", self.0)
    }
}

/// Caller-supplied `(type, value, label)` triple, before it gets an id
///
/// Also used for chart-specific extra filters passed straight to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "type")]
    pub kind: FilterType,
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl FilterSpec {
    pub fn new(kind: FilterType, value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            label: label.into(),
        }
    }

    /// Spec labelled `"<Type>: <value>"`
    pub fn with_default_label(kind: FilterType, value: impl Into<String>) -> Self {
        let value = value.into();
        let label = format!("{}: {}", kind.display_name(), value);
        Self { kind, value, label }
    }
}

/// An active filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: FilterId,
    #[serde(rename = "type")]
    pub kind: FilterType,
    pub value: String,
    pub label: String,
}

impl Filter {
    /// True when this filter constrains the same `(type, value)` pair
    pub fn same_constraint(&self, kind: FilterType, value: &str) -> bool {
        self.kind == kind && self.value == value
    }

    /// Label for filter tags, falling back to `"<type>: <value>"`
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            format!("{}: {}", self.kind, self.value)
        } else {
            self.label.clone()
        }
    }

    pub fn spec(&self) -> FilterSpec {
        FilterSpec::new(self.kind, self.value.clone(), self.label.clone())
    }
}
