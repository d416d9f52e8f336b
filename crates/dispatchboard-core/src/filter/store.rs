//! Active filter store
//!
//! One store per dashboard session. Mutations are synchronous and take
//! `&mut self`, so there is never more than one in flight.

use std::collections::HashMap;
use tracing::debug;

use super::evaluator::{filter_for_map, filter_records, FilteredView};
use super::{Filter, FilterId, FilterSpec, FilterType};
use crate::event::{EventBus, FilterEvent};
use dispatchboard_types::LogisticsRecord;

/// Ordered set of active filters plus the legacy legend visibility table
#[derive(Debug, Default)]
pub struct FilterStore {
    /// Active filters in insertion order
    filters: Vec<Filter>,

    /// chart id -> legend item key -> hidden
    hidden_legend_items: HashMap<String, HashMap<String, bool>>,

    next_id: u64,

    /// Bumped on every change to `filters`
    generation: u64,

    event_bus: Option<EventBus>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that publishes every effective mutation on `bus`
    pub fn with_event_bus(bus: EventBus) -> Self {
        Self {
            event_bus: Some(bus),
            ..Self::default()
        }
    }

    /// Start publishing on `bus`, keeping filters, ids and generation
    pub fn set_event_bus(&mut self, bus: EventBus) {
        self.event_bus = Some(bus);
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.event_bus.as_ref()
    }

    /// Add a filter
    ///
    /// `dateRange` replaces any existing date range. For every other type a
    /// duplicate `(type, value)` is a no-op that returns the existing filter.
    pub fn add(
        &mut self,
        kind: FilterType,
        value: impl Into<String>,
        label: impl Into<String>,
    ) -> Filter {
        let value = value.into();

        if kind != FilterType::DateRange {
            if let Some(existing) = self.find(kind, &value) {
                debug!(id = %existing.id, %kind, value = %value, "Filter already active");
                return existing.clone();
            }
        }

        let filter = Filter {
            id: self.allocate_id(),
            kind,
            value,
            label: label.into(),
        };

        let previous = if kind == FilterType::DateRange {
            let (replaced, kept): (Vec<Filter>, Vec<Filter>) = std::mem::take(&mut self.filters)
                .into_iter()
                .partition(|f| f.kind == FilterType::DateRange);
            self.filters = kept;
            replaced.into_iter().next()
        } else {
            None
        };

        self.filters.push(filter.clone());
        self.generation += 1;

        match previous {
            Some(previous) => {
                debug!(
                    id = %filter.id,
                    previous = %previous.value,
                    current = %filter.value,
                    "Date range replaced"
                );
                self.publish(FilterEvent::Replaced {
                    previous,
                    current: filter.clone(),
                });
            }
            None => {
                debug!(id = %filter.id, %kind, value = %filter.value, "Filter added");
                self.publish(FilterEvent::Added(filter.clone()));
            }
        }

        filter
    }

    pub fn add_spec(&mut self, spec: FilterSpec) -> Filter {
        self.add(spec.kind, spec.value, spec.label)
    }

    /// Apply [`FilterStore::add`] to each spec in order
    pub fn add_many(&mut self, specs: impl IntoIterator<Item = FilterSpec>) -> Vec<Filter> {
        specs.into_iter().map(|spec| self.add_spec(spec)).collect()
    }

    /// Remove the filter with `id`; absent ids are ignored
    pub fn remove(&mut self, id: FilterId) -> Option<Filter> {
        let index = self.filters.iter().position(|f| f.id == id)?;
        let removed = self.filters.remove(index);
        self.generation += 1;

        debug!(id = %removed.id, kind = %removed.kind, value = %removed.value, "Filter removed");
        self.publish(FilterEvent::Removed(removed.clone()));
        Some(removed)
    }

    /// Drop every active filter, leaving legend visibility untouched
    ///
    /// Returns how many filters were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.filters.len();
        if count == 0 {
            return 0;
        }

        self.filters.clear();
        self.generation += 1;

        debug!(count, "Filters cleared");
        self.publish(FilterEvent::Cleared { count });
        count
    }

    /// Flip the hidden flag of a legend item (legacy visibility path)
    ///
    /// Returns the new hidden state. Does not touch the active filters.
    pub fn legend_toggle(&mut self, chart_id: &str, item_key: &str) -> bool {
        let hidden = self
            .hidden_legend_items
            .entry(chart_id.to_string())
            .or_default()
            .entry(item_key.to_string())
            .or_insert(false);
        *hidden = !*hidden;
        let hidden = *hidden;

        self.publish(FilterEvent::LegendToggled {
            chart_id: chart_id.to_string(),
            item_key: item_key.to_string(),
            hidden,
        });
        hidden
    }

    pub fn is_legend_item_hidden(&self, chart_id: &str, item_key: &str) -> bool {
        self.hidden_legend_items
            .get(chart_id)
            .and_then(|items| items.get(item_key))
            .copied()
            .unwrap_or(false)
    }

    /// Active filters in insertion order
    pub fn active(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn find(&self, kind: FilterType, value: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.same_constraint(kind, value))
    }

    pub fn get(&self, id: FilterId) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn has_type(&self, kind: FilterType) -> bool {
        self.filters.iter().any(|f| f.kind == kind)
    }

    pub fn of_type(&self, kind: FilterType) -> impl Iterator<Item = &Filter> {
        self.filters.iter().filter(move |f| f.kind == kind)
    }

    /// Change counter for the active filter sequence
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records matching the active filters plus `extra`
    pub fn filtered<'a>(
        &self,
        data: &'a [LogisticsRecord],
        extra: &[FilterSpec],
    ) -> FilteredView<'a> {
        filter_records(data, &self.filters, extra)
    }

    /// Records matching the active non-geographic filters plus `extra`
    pub fn filtered_for_map<'a>(
        &self,
        data: &'a [LogisticsRecord],
        extra: &[FilterSpec],
    ) -> FilteredView<'a> {
        filter_for_map(data, &self.filters, extra)
    }

    fn allocate_id(&mut self) -> FilterId {
        self.next_id += 1;
        FilterId::new(self.next_id)
    }

    fn publish(&self, event: FilterEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
