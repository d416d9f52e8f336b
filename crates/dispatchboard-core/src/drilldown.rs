//! Drill-down advisor
//!
//! Derives which display granularities make sense for a chart from the active
//! time-scoped filters (`year`, `quarter`, `month`, `week`, `day`, `dateRange`).
//! A filter at some granularity makes broader views meaningless: with a single
//! week selected, a yearly bar chart would show one bar.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::filter::{DateRange, Filter, FilterStore, FilterType};

/// Temporal resolution a chart renders at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// Coarsest first, the order drill-down menus list them in
    pub const ALL: [Granularity; 5] = [
        Self::Yearly,
        Self::Quarterly,
        Self::Monthly,
        Self::Weekly,
        Self::Daily,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
        }
    }

    /// Granularities strictly coarser than `self`
    pub fn broader(&self) -> &'static [Granularity] {
        match self {
            Self::Daily => &[Self::Yearly, Self::Quarterly, Self::Monthly, Self::Weekly],
            Self::Weekly => &[Self::Yearly, Self::Quarterly, Self::Monthly],
            Self::Monthly => &[Self::Yearly, Self::Quarterly],
            Self::Quarterly => &[Self::Yearly],
            Self::Yearly => &[],
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::UnknownGranularity {
                name: name.to_string(),
            })
    }
}

/// Display label for any drill-down value a chart may offer
pub fn drill_down_label(value: &str) -> Option<&'static str> {
    let label = match value {
        "yearly" => "Yearly",
        "quarterly" => "Quarterly",
        "monthly" => "Monthly",
        "weekly" => "Weekly",
        "daily" => "Daily",
        "region" => "By Region",
        "country" => "By Country",
        "state" => "By State",
        "all" => "All",
        "all_reasons" => "All Reasons",
        "all_carriers" => "All Carriers",
        "by_month" => "By Month",
        "by_quarter" => "By Quarter",
        "by_week" => "By Week",
        "by_day" => "By Day",
        "by_country" => "By Country",
        "by_carrier" => "By Carrier",
        _ => return None,
    };
    Some(label)
}

/// Kind of chart asking for a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Time-series charts
    Temporal,
    /// Breakdowns by late reason, carrier, ...
    Categorical,
}

impl FromStr for ChartKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temporal" => Ok(Self::Temporal),
            "categorical" => Ok(Self::Categorical),
            other => Err(CoreError::UnknownChartKind {
                name: other.to_string(),
            }),
        }
    }
}

/// One entry of a chart's drill-down menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillDownOption {
    /// `yearly`, `monthly`, ... or a categorical value such as `by_country`
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl DrillDownOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn for_granularity(granularity: Granularity) -> Self {
        Self::new(granularity.as_str(), granularity.label())
    }

    /// Standard time menu, coarsest first
    pub fn time_options() -> Vec<Self> {
        Granularity::ALL
            .into_iter()
            .map(Self::for_granularity)
            .collect()
    }
}

/// Natural granularity of a date range, from its span in days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanClass {
    Day,
    Week,
    Month,
    Quarter,
    Year,
    MultiYear,
    /// The range could not be parsed
    Unknown,
}

impl SpanClass {
    pub fn from_span_days(days: i64) -> Self {
        match days {
            d if d <= 1 => Self::Day,
            d if d <= 7 => Self::Week,
            d if d <= 35 => Self::Month,
            d if d <= 100 => Self::Quarter,
            d if d <= 370 => Self::Year,
            _ => Self::MultiYear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
            Self::MultiYear => "MULTI_YEAR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Granularity a chart should switch to for a range of this size
    pub fn suggestion(&self) -> Granularity {
        match self {
            Self::Day | Self::Week => Granularity::Daily,
            Self::Month => Granularity::Weekly,
            Self::Quarter | Self::Unknown => Granularity::Monthly,
            Self::Year => Granularity::Quarterly,
            Self::MultiYear => Granularity::Yearly,
        }
    }

    /// Options made meaningless by a range of this size
    ///
    /// Unknown spans disable as much as a single-day range.
    pub fn disables(&self) -> &'static [Granularity] {
        match self {
            Self::Day | Self::Unknown => Granularity::Daily.broader(),
            Self::Week => Granularity::Weekly.broader(),
            Self::Month => Granularity::Monthly.broader(),
            Self::Quarter => Granularity::Quarterly.broader(),
            Self::Year | Self::MultiYear => &[],
        }
    }
}

impl fmt::Display for SpanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Span analysis of a stored `dateRange` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeAnalysis {
    pub span_class: SpanClass,
    pub suggestion: Granularity,
}

/// Classify a composite `dateRange` value, failing safe to `UNKNOWN`
pub fn analyze_date_range(value: &str) -> DateRangeAnalysis {
    let span_class = match DateRange::parse(value) {
        Ok(range) => SpanClass::from_span_days(range.span_days()),
        Err(e) => {
            warn!(error = %e, "Could not analyze date range");
            SpanClass::Unknown
        }
    };
    DateRangeAnalysis {
        span_class,
        suggestion: span_class.suggestion(),
    }
}

/// Read-only view over the active filters answering drill-down questions
#[derive(Debug, Clone, Copy)]
pub struct DrillDownAdvisor<'a> {
    filters: &'a [Filter],
}

impl<'a> DrillDownAdvisor<'a> {
    pub fn new(filters: &'a [Filter]) -> Self {
        Self { filters }
    }

    pub fn for_store(store: &'a FilterStore) -> Self {
        Self::new(store.active())
    }

    pub fn has_time_filter(&self) -> bool {
        self.time_filters().next().is_some()
    }

    /// Union of granularities disabled by the active time filters
    pub fn disabled_granularities(&self) -> BTreeSet<Granularity> {
        self.time_filters()
            .flat_map(|filter| disabled_by(filter).iter().copied())
            .collect()
    }

    /// Recompute the `disabled` flag of each option
    ///
    /// Without any time-scoped filter the options are returned untouched.
    pub fn restrict_options(&self, options: Vec<DrillDownOption>) -> Vec<DrillDownOption> {
        if !self.has_time_filter() {
            return options;
        }

        let disabled = self.disabled_granularities();
        options
            .into_iter()
            .map(|option| {
                let is_disabled = disabled.iter().any(|g| g.as_str() == option.value);
                DrillDownOption {
                    disabled: is_disabled,
                    ..option
                }
            })
            .collect()
    }

    /// Granularity a chart should display given the active filters
    pub fn suggest_granularity(&self, chart: ChartKind, current: Granularity) -> Granularity {
        if !self.has_time_filter() {
            return current;
        }

        let suggested = match self.time_filters().find(|f| f.kind == FilterType::DateRange) {
            Some(range) => analyze_date_range(&range.value).suggestion,
            None => self
                .time_filters()
                .filter_map(|f| f.kind.time_rank().map(|rank| (rank, f.kind)))
                .max_by_key(|(rank, _)| *rank)
                .map(|(_, kind)| finer_than(kind))
                .unwrap_or(current),
        };

        if chart == ChartKind::Categorical && self.has_filter(FilterType::LateReason) {
            debug!(%suggested, "Late reason filter active, suggesting time-based view");
            return suggested;
        }

        suggested
    }

    fn has_filter(&self, kind: FilterType) -> bool {
        self.filters.iter().any(|f| f.kind == kind)
    }

    fn time_filters(&self) -> impl Iterator<Item = &'a Filter> {
        let filters: &'a [Filter] = self.filters;
        filters.iter().filter(|f| f.kind.is_time_scoped())
    }
}

/// Options a single time-scoped filter disables
fn disabled_by(filter: &Filter) -> &'static [Granularity] {
    match filter.kind {
        FilterType::Year | FilterType::Quarter => Granularity::Quarterly.broader(),
        FilterType::Month => Granularity::Monthly.broader(),
        FilterType::Week => Granularity::Weekly.broader(),
        FilterType::Day => Granularity::Daily.broader(),
        FilterType::DateRange => analyze_date_range(&filter.value).span_class.disables(),
        _ => &[],
    }
}

/// Display granularity one step finer than a discrete time filter
fn finer_than(kind: FilterType) -> Granularity {
    match kind {
        FilterType::Year => Granularity::Quarterly,
        FilterType::Quarter => Granularity::Monthly,
        FilterType::Month => Granularity::Weekly,
        FilterType::Week | FilterType::Day => Granularity::Daily,
        _ => Granularity::Monthly,
    }
}
