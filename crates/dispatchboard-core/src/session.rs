//! Dashboard session
//!
//! Bundles everything one open dashboard needs: the filter store, the legend
//! table, the loaded records and a memo cache of filtered views. Sessions are
//! constructed explicitly and passed to whoever renders charts.

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::drilldown::{ChartKind, DrillDownAdvisor, DrillDownOption, Granularity};
use crate::error::CoreError;
use crate::event::EventBus;
use crate::filter::{DateRange, Filter, FilterSpec, FilterStore, FilteredView};
use crate::legend::{LegendBridge, LegendClick, LegendStatus};
use crate::preferences::DashboardPreferences;
use dispatchboard_types::LogisticsRecord;

/// Which consumer a view is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Every active filter applies
    Charts,
    /// Geographic filters are ignored so the map keeps showing all areas
    Map,
}

/// Configuration for the session view cache
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum memoized views
    pub view_cache_capacity: u64,

    /// Idle time after which a memoized view is dropped
    pub view_cache_idle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            view_cache_capacity: 64,
            view_cache_idle: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ViewKey {
    kind: ViewKind,
    generation: u64,
    dataset_version: u64,
}

/// Per-dashboard filter context
pub struct DashboardSession {
    store: FilterStore,
    legend: LegendBridge,
    preferences: DashboardPreferences,
    dataset: Arc<[LogisticsRecord]>,
    dataset_version: u64,

    /// Indices into `dataset` of the records in each view
    view_cache: Cache<ViewKey, Arc<[usize]>>,
}

impl DashboardSession {
    pub fn new(records: Vec<LogisticsRecord>) -> Self {
        Self::with_preferences(records, DashboardPreferences::default())
    }

    pub fn with_preferences(records: Vec<LogisticsRecord>, preferences: DashboardPreferences) -> Self {
        Self::with_config(records, preferences, SessionConfig::default())
    }

    pub fn with_config(
        records: Vec<LogisticsRecord>,
        preferences: DashboardPreferences,
        config: SessionConfig,
    ) -> Self {
        let view_cache = Cache::builder()
            .max_capacity(config.view_cache_capacity)
            .time_to_idle(config.view_cache_idle)
            .build();

        Self {
            store: FilterStore::new(),
            legend: preferences.legend_bridge(),
            preferences,
            dataset: records.into(),
            dataset_version: 0,
            view_cache,
        }
    }

    /// Publish store mutations on `bus`
    ///
    /// Active filters and the store generation are kept.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.store.set_event_bus(bus);
        self
    }

    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FilterStore {
        &mut self.store
    }

    pub fn legend(&self) -> &LegendBridge {
        &self.legend
    }

    pub fn preferences(&self) -> &DashboardPreferences {
        &self.preferences
    }

    pub fn dataset(&self) -> &[LogisticsRecord] {
        &self.dataset
    }

    /// Swap the records and drop every memoized view
    pub fn set_dataset(&mut self, records: Vec<LogisticsRecord>) {
        self.dataset = records.into();
        self.dataset_version += 1;
        self.view_cache.invalidate_all();
        debug!(records = self.dataset.len(), "Dataset replaced");
    }

    /// Validate a resolved interval and make it the active date range
    pub fn apply_date_range(&mut self, range: DateRange) -> Result<Filter, CoreError> {
        range.validate(self.preferences.max_date_range_days)?;
        Ok(self.store.add_spec(range.to_filter_spec()))
    }

    /// Records visible to `kind` under the active filters, memoized per store generation
    pub fn view(&self, kind: ViewKind) -> Vec<&LogisticsRecord> {
        let key = ViewKey {
            kind,
            generation: self.store.generation(),
            dataset_version: self.dataset_version,
        };

        let indices = self
            .view_cache
            .get_with(key, || self.compute_indices(kind));
        indices
            .iter()
            .filter_map(|&index| self.dataset.get(index))
            .collect()
    }

    /// Uncached view with chart-specific `extra` filters
    pub fn view_with<'a>(&'a self, kind: ViewKind, extra: &[FilterSpec]) -> FilteredView<'a> {
        match kind {
            ViewKind::Charts => self.store.filtered(&self.dataset, extra),
            ViewKind::Map => self.store.filtered_for_map(&self.dataset, extra),
        }
    }

    pub fn click_legend(&mut self, chart_id: &str, key: &str, label: Option<&str>) -> LegendClick {
        self.legend
            .on_legend_click(&mut self.store, chart_id, key, label)
    }

    pub fn legend_status(&self, chart_id: &str, key: &str) -> LegendStatus {
        self.legend.legend_status(&self.store, chart_id, key)
    }

    pub fn active_legend_keys(&self, chart_id: &str) -> Vec<String> {
        self.legend.active_legend_keys(&self.store, chart_id)
    }

    pub fn drill_down_options(&self, options: Vec<DrillDownOption>) -> Vec<DrillDownOption> {
        DrillDownAdvisor::for_store(&self.store).restrict_options(options)
    }

    /// Suggested granularity, starting from the preferred default when
    /// `current` is not given
    pub fn suggest_granularity(&self, chart: ChartKind, current: Option<Granularity>) -> Granularity {
        let current = current.unwrap_or(self.preferences.default_granularity);
        DrillDownAdvisor::for_store(&self.store).suggest_granularity(chart, current)
    }

    fn compute_indices(&self, kind: ViewKind) -> Arc<[usize]> {
        let view = self.view_with(kind, &[]);
        debug!(?kind, generation = self.store.generation(), matched = view.len(), "Computing view");

        if view.is_unfiltered() {
            return (0..self.dataset.len()).collect();
        }

        let mut matched = view.iter().peekable();
        self.dataset
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                if matched.peek().is_some_and(|m| std::ptr::eq(*m, record)) {
                    matched.next();
                    Some(index)
                } else {
                    None
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardSession")
            .field("filters", &self.store.len())
            .field("records", &self.dataset.len())
            .field("dataset_version", &self.dataset_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterType;
    use chrono::NaiveDate;
    use dispatchboard_types::DeliveryStatus;

    fn record(day: u32, country: &str, status: DeliveryStatus) -> LogisticsRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        LogisticsRecord::new(date, "Europe", country, status).with_carrier("DHL")
    }

    fn sample() -> Vec<LogisticsRecord> {
        vec![
            record(1, "Germany", DeliveryStatus::Late).with_late_reason("Traffic"),
            record(2, "France", DeliveryStatus::OnTime),
            record(3, "Germany", DeliveryStatus::Early),
            record(4, "Spain", DeliveryStatus::Late).with_late_reason("Weather Delays"),
        ]
    }

    fn owned(view: Vec<&LogisticsRecord>) -> Vec<LogisticsRecord> {
        view.into_iter().cloned().collect()
    }

    #[test]
    fn test_cached_view_matches_uncached() {
        let mut session = DashboardSession::new(sample());
        session
            .store_mut()
            .add(FilterType::Country, "Germany", "");
        session
            .store_mut()
            .add(FilterType::DeliveryStatus, "Late", "");

        for kind in [ViewKind::Charts, ViewKind::Map] {
            let first = owned(session.view(kind));
            let second = owned(session.view(kind));
            let uncached = session.view_with(kind, &[]).to_vec();
            assert_eq!(first, uncached);
            assert_eq!(second, uncached);
        }
        assert_eq!(session.view(ViewKind::Charts).len(), 1);
        assert_eq!(session.view(ViewKind::Map).len(), 2);
    }

    #[test]
    fn test_view_follows_store_mutations() {
        let mut session = DashboardSession::new(sample());
        assert_eq!(session.view(ViewKind::Charts).len(), 4);

        let filter = session.store_mut().add(FilterType::Country, "Spain", "");
        assert_eq!(session.view(ViewKind::Charts).len(), 1);

        session.store_mut().remove(filter.id);
        assert_eq!(session.view(ViewKind::Charts).len(), 4);
    }

    #[test]
    fn test_attaching_event_bus_keeps_cached_views_fresh() {
        let mut session = DashboardSession::new(sample());
        let germany = session.store_mut().add(FilterType::Country, "Germany", "");
        assert_eq!(session.view(ViewKind::Charts).len(), 2);

        let mut session = session.with_event_bus(EventBus::default_capacity());
        assert_eq!(session.store().len(), 1);
        session.store_mut().remove(germany.id);
        session.store_mut().add(FilterType::Country, "Spain", "");

        let cached = owned(session.view(ViewKind::Charts));
        assert_eq!(cached, session.view_with(ViewKind::Charts, &[]).to_vec());
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].country, "Spain");
    }

    #[test]
    fn test_set_dataset_invalidates_views() {
        let mut session = DashboardSession::new(sample());
        session.store_mut().add(FilterType::Country, "Germany", "");
        assert_eq!(session.view(ViewKind::Charts).len(), 2);

        session.set_dataset(vec![record(9, "Germany", DeliveryStatus::OnTime)]);
        let view = session.view(ViewKind::Charts);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn test_legend_click_narrows_view() {
        let mut session = DashboardSession::new(sample());
        session.click_legend("late-delivery-chart", "Traffic", None);

        assert_eq!(session.view(ViewKind::Charts).len(), 1);
        assert_eq!(
            session.legend_status("late-delivery-chart", "Traffic"),
            LegendStatus::Active
        );
        assert_eq!(session.active_legend_keys("late-delivery-chart"), vec!["Traffic"]);

        session.click_legend("late-delivery-chart", "Traffic", None);
        assert_eq!(session.view(ViewKind::Charts).len(), 4);
    }

    #[test]
    fn test_apply_date_range_respects_preferences() {
        let prefs = DashboardPreferences {
            max_date_range_days: 30,
            ..Default::default()
        };
        let mut session = DashboardSession::with_preferences(sample(), prefs);

        let short = DateRange::parse("2024-03-01_2024-03-02").unwrap();
        let filter = session.apply_date_range(short).unwrap();
        assert_eq!(filter.label, "1 Mar to 2 Mar 2024");
        assert_eq!(session.view(ViewKind::Charts).len(), 2);

        let long = DateRange::parse("2024-01-01_2024-03-02").unwrap();
        assert!(matches!(
            session.apply_date_range(long),
            Err(CoreError::DateRangeTooLong { .. })
        ));
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_suggestion_starts_from_preferred_default() {
        let prefs = DashboardPreferences {
            default_granularity: Granularity::Quarterly,
            ..Default::default()
        };
        let mut session = DashboardSession::with_preferences(sample(), prefs);
        assert_eq!(
            session.suggest_granularity(ChartKind::Temporal, None),
            Granularity::Quarterly
        );

        session.store_mut().add(FilterType::Month, "Mar 2024", "");
        assert_eq!(
            session.suggest_granularity(ChartKind::Temporal, None),
            Granularity::Weekly
        );
        let options = session.drill_down_options(DrillDownOption::time_options());
        assert_eq!(options.iter().filter(|o| o.disabled).count(), 2);
    }
}
