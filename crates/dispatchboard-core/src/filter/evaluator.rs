//! Predicate evaluation over logistics records
//!
//! Filters are grouped by type. A record is kept when every group has at
//! least one matching filter: AND across types, OR within a type.

use chrono::Datelike;
use std::collections::BTreeMap;
use tracing::warn;

use super::{DateRange, Filter, FilterSpec, FilterType};
use dispatchboard_types::LogisticsRecord;

/// Result of a filter pass
///
/// With no applicable filters the input slice is handed back untouched;
/// otherwise a subset of references in original order.
#[derive(Debug, Clone)]
pub enum FilteredView<'a> {
    Unfiltered(&'a [LogisticsRecord]),
    Subset(Vec<&'a LogisticsRecord>),
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        match self {
            Self::Unfiltered(records) => records.len(),
            Self::Subset(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no filter applied and the input was returned as-is
    pub fn is_unfiltered(&self) -> bool {
        matches!(self, Self::Unfiltered(_))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a LogisticsRecord> + '_ {
        let (all, subset) = match self {
            Self::Unfiltered(records) => (Some(records.iter()), None),
            Self::Subset(records) => (None, Some(records.iter().copied())),
        };
        all.into_iter().flatten().chain(subset.into_iter().flatten())
    }

    pub fn into_refs(self) -> Vec<&'a LogisticsRecord> {
        match self {
            Self::Unfiltered(records) => records.iter().collect(),
            Self::Subset(records) => records,
        }
    }

    /// Owned copies of the matching records
    pub fn to_vec(&self) -> Vec<LogisticsRecord> {
        self.iter().cloned().collect()
    }
}

/// Filter `data` by the active filters combined with chart-specific `extra` filters
///
/// An empty combined filter list returns every record unchanged.
pub fn filter_records<'a>(
    data: &'a [LogisticsRecord],
    active: &[Filter],
    extra: &[FilterSpec],
) -> FilteredView<'a> {
    evaluate(data, criteria(active, extra))
}

/// Like [`filter_records`] but blind to region, country and subdivision filters
///
/// Geography-based charts always render the full extent while still honoring
/// time, category and carrier constraints.
pub fn filter_for_map<'a>(
    data: &'a [LogisticsRecord],
    active: &[Filter],
    extra: &[FilterSpec],
) -> FilteredView<'a> {
    evaluate(
        data,
        criteria(active, extra).filter(|(kind, _)| !kind.is_geographic()),
    )
}

fn criteria<'f>(
    active: &'f [Filter],
    extra: &'f [FilterSpec],
) -> impl Iterator<Item = (FilterType, &'f str)> {
    active
        .iter()
        .map(|f| (f.kind, f.value.as_str()))
        .chain(extra.iter().map(|f| (f.kind, f.value.as_str())))
}

fn evaluate<'a, 'f>(
    data: &'a [LogisticsRecord],
    criteria: impl Iterator<Item = (FilterType, &'f str)>,
) -> FilteredView<'a> {
    let mut groups: BTreeMap<FilterType, Vec<Matcher<'f>>> = BTreeMap::new();
    for (kind, value) in criteria {
        groups
            .entry(kind)
            .or_default()
            .push(Matcher::compile(kind, value));
    }

    if groups.is_empty() {
        return FilteredView::Unfiltered(data);
    }

    FilteredView::Subset(
        data.iter()
            .filter(|record| {
                groups
                    .values()
                    .all(|group| group.iter().any(|m| m.matches(record)))
            })
            .collect(),
    )
}

/// A single filter prepared for repeated matching
#[derive(Debug, Clone)]
enum Matcher<'f> {
    /// Region filters also match country or subdivision names
    Region(&'f str),
    Field(FilterType, &'f str),
    /// `None` when the value is not a calendar year
    Year(Option<i32>),
    /// `None` when the stored value is malformed
    Range(Option<DateRange>),
    /// Unrecognized filter types fail open
    Always,
}

impl<'f> Matcher<'f> {
    fn compile(kind: FilterType, value: &'f str) -> Self {
        match kind {
            FilterType::Region => Self::Region(value),
            FilterType::Year => {
                let year = value.trim().parse::<i32>().ok();
                if year.is_none() {
                    warn!(value, "Year filter is not a calendar year, matching no records");
                }
                Self::Year(year)
            }
            FilterType::DateRange => match DateRange::parse(value) {
                Ok(range) => Self::Range(Some(range)),
                Err(e) => {
                    warn!(error = %e, "Malformed date range filter, matching no records");
                    Self::Range(None)
                }
            },
            FilterType::Unrecognized => Self::Always,
            _ => Self::Field(kind, value),
        }
    }

    fn matches(&self, record: &LogisticsRecord) -> bool {
        match self {
            Self::Region(value) => {
                record.region == *value
                    || record.country == *value
                    || record.subdivision.as_deref() == Some(*value)
            }
            Self::Field(kind, value) => field_equals(record, *kind, value),
            Self::Year(year) => year.is_some_and(|y| record.date.year() == y),
            Self::Range(range) => range.is_some_and(|r| r.contains(record.date)),
            Self::Always => true,
        }
    }
}

fn field_equals(record: &LogisticsRecord, kind: FilterType, value: &str) -> bool {
    match kind {
        FilterType::Country => record.country == value,
        FilterType::Subdivision => record.subdivision.as_deref() == Some(value),
        FilterType::Carrier => record.carrier == value,
        FilterType::DeliveryStatus => record.delivery_status.as_str() == value,
        FilterType::LateReason => record.late_reason.as_deref() == Some(value),
        FilterType::Quarter => record.quarter == value,
        FilterType::Month => record.month == value,
        FilterType::Week => record.week == value,
        FilterType::Day => record.day == value,
        // Compiled into dedicated matchers
        FilterType::Region
        | FilterType::Year
        | FilterType::DateRange
        | FilterType::Unrecognized => true,
    }
}
