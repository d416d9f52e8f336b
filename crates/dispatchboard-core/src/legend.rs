//! Legend filter bridge
//!
//! Clicking a legend entry toggles a real data filter instead of merely hiding
//! a series. Each chart maps its legend keys onto one filter dimension, so the
//! legend state of different charts never interferes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::filter::{Filter, FilterSpec, FilterStore, FilterType};
use dispatchboard_types::DeliveryStatus;

pub const DUAL_AXIS_CHART: &str = "dual-axis-chart";
pub const LATE_DELIVERY_CHART: &str = "late-delivery-chart";
pub const CARRIER_LATE_DELIVERY_CHART: &str = "carrier-late-delivery-chart";

/// Fixed legend entry: `key` stands for the filter `(type, value)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendItem {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: FilterType,
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl LegendItem {
    pub fn new(key: impl Into<String>, kind: FilterType, value: impl Into<String>) -> Self {
        let spec = FilterSpec::with_default_label(kind, value);
        Self {
            key: key.into(),
            kind,
            value: spec.value,
            label: spec.label,
        }
    }

    fn spec(&self) -> FilterSpec {
        FilterSpec::new(self.kind, self.value.clone(), self.label.clone())
    }
}

/// How one chart's legend keys translate to filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum LegendMapping {
    /// Only the listed keys are mapped
    Fixed { items: Vec<LegendItem> },
    /// Every key is itself a filter value of `type`
    Passthrough {
        #[serde(rename = "type")]
        kind: FilterType,
    },
}

impl LegendMapping {
    fn resolve(&self, key: &str) -> Option<FilterSpec> {
        match self {
            Self::Fixed { items } => items.iter().find(|item| item.key == key).map(LegendItem::spec),
            Self::Passthrough { kind } => Some(FilterSpec::with_default_label(*kind, key)),
        }
    }

    fn key_for(&self, filter: &Filter) -> Option<String> {
        match self {
            Self::Fixed { items } => items
                .iter()
                .find(|item| filter.same_constraint(item.kind, &item.value))
                .map(|item| item.key.clone()),
            Self::Passthrough { kind } => (filter.kind == *kind).then(|| filter.value.clone()),
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            Self::Fixed { items } => items.iter().map(|item| item.key.clone()).collect(),
            Self::Passthrough { .. } => Vec::new(),
        }
    }
}

/// Outcome of a legend click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegendClick {
    /// The mapped filter was not active and got added
    Added(Filter),
    /// The mapped filter was active and got removed
    Removed(Filter),
    /// No mapping for this chart or key; nothing changed
    Unmapped,
}

/// Highlight state of a legend entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendStatus {
    /// The entry's filter is active
    Active,
    /// No filter for this entry, the whole legend is shown as active
    AllActive,
}

impl LegendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::AllActive => "all-active",
        }
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Per-chart legend mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegendBridge {
    charts: BTreeMap<String, LegendMapping>,
}

impl Default for LegendBridge {
    fn default() -> Self {
        Self::standard()
    }
}

impl LegendBridge {
    /// Bridge with no mapped charts
    pub fn empty() -> Self {
        Self {
            charts: BTreeMap::new(),
        }
    }

    /// Delivery-status legend on the dual-axis chart, late reasons on the
    /// two late-delivery charts
    pub fn standard() -> Self {
        let status_items = [
            ("onTimeDelivery", DeliveryStatus::OnTime),
            ("lateDelivery", DeliveryStatus::Late),
            ("earlyDelivery", DeliveryStatus::Early),
        ]
        .into_iter()
        .map(|(key, status)| LegendItem::new(key, FilterType::DeliveryStatus, status.as_str()))
        .collect();

        let late_reason = LegendMapping::Passthrough {
            kind: FilterType::LateReason,
        };

        Self::empty()
            .with_chart(DUAL_AXIS_CHART, LegendMapping::Fixed { items: status_items })
            .with_chart(LATE_DELIVERY_CHART, late_reason.clone())
            .with_chart(CARRIER_LATE_DELIVERY_CHART, late_reason)
    }

    pub fn with_chart(mut self, chart_id: impl Into<String>, mapping: LegendMapping) -> Self {
        self.charts.insert(chart_id.into(), mapping);
        self
    }

    /// Replace or add chart mappings from `overrides`
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, LegendMapping>) -> Self {
        for (chart_id, mapping) in overrides {
            self.charts.insert(chart_id.clone(), mapping.clone());
        }
        self
    }

    pub fn mapping(&self, chart_id: &str) -> Option<&LegendMapping> {
        self.charts.get(chart_id)
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    /// Keys a fixed mapping knows about; empty for pass-through charts
    pub fn known_keys(&self, chart_id: &str) -> Vec<String> {
        self.mapping(chart_id)
            .map(LegendMapping::keys)
            .unwrap_or_default()
    }

    /// Filter a legend key stands for
    pub fn resolve(&self, chart_id: &str, key: &str) -> Option<FilterSpec> {
        self.mapping(chart_id)?.resolve(key)
    }

    /// Toggle the filter behind a legend entry
    ///
    /// A non-empty `label` replaces the generated filter label.
    pub fn on_legend_click(
        &self,
        store: &mut FilterStore,
        chart_id: &str,
        key: &str,
        label: Option<&str>,
    ) -> LegendClick {
        let Some(mut spec) = self.resolve(chart_id, key) else {
            warn!(chart_id, key, "No filter mapping for legend item");
            return LegendClick::Unmapped;
        };

        if let Some(id) = store.find(spec.kind, &spec.value).map(|f| f.id) {
            if let Some(removed) = store.remove(id) {
                debug!(chart_id, key, value = %removed.value, "Legend filter disabled");
                return LegendClick::Removed(removed);
            }
        }

        if let Some(label) = label.filter(|l| !l.is_empty()) {
            spec.label = label.to_string();
        }
        debug!(chart_id, key, value = %spec.value, "Legend filter enabled");
        LegendClick::Added(store.add_spec(spec))
    }

    pub fn legend_status(&self, store: &FilterStore, chart_id: &str, key: &str) -> LegendStatus {
        match self.resolve(chart_id, key) {
            Some(spec) if store.find(spec.kind, &spec.value).is_some() => LegendStatus::Active,
            _ => LegendStatus::AllActive,
        }
    }

    /// Legend keys of `chart_id` whose filter is active, in filter order
    pub fn active_legend_keys(&self, store: &FilterStore, chart_id: &str) -> Vec<String> {
        let Some(mapping) = self.mapping(chart_id) else {
            return Vec::new();
        };

        let mut keys: Vec<String> = Vec::new();
        for key in store.active().iter().filter_map(|f| mapping.key_for(f)) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}
