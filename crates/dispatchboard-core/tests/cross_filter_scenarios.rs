//! End-to-end cross-filter scenarios through the public API

use chrono::NaiveDate;
use dispatchboard_core::{
    filter_for_map, filter_records, ChartKind, DashboardSession, DeliveryStatus, DrillDownAdvisor,
    DrillDownOption, FilterSpec, FilterStore, FilterType, Granularity, LegendClick, LogisticsRecord,
    ViewKind,
};

fn on(date: &str, country: &str, status: DeliveryStatus) -> LogisticsRecord {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    LogisticsRecord::new(date, "Americas", country, status)
}

fn fleet() -> Vec<LogisticsRecord> {
    vec![
        on("2024-01-03", "Germany", DeliveryStatus::Late)
            .with_late_reason("Traffic")
            .with_carrier("DHL"),
        on("2024-01-15", "France", DeliveryStatus::Late)
            .with_late_reason("Weather Delays")
            .with_carrier("UPS"),
        on("2024-02-02", "Germany", DeliveryStatus::OnTime).with_carrier("DHL"),
        on("2024-02-20", "Spain", DeliveryStatus::Early).with_carrier("FedEx"),
        on("2024-03-08", "France", DeliveryStatus::OnTime).with_carrier("DHL"),
        on("2024-04-11", "Germany", DeliveryStatus::Late)
            .with_late_reason("Weather Delays")
            .with_carrier("UPS"),
    ]
}

#[test]
fn test_date_range_selects_first_two_of_three() {
    let data = vec![
        on("2024-02-10", "US", DeliveryStatus::Late),
        on("2024-02-11", "US", DeliveryStatus::OnTime),
        on("2024-02-12", "DE", DeliveryStatus::Late),
    ];
    let mut store = FilterStore::new();
    store.add(FilterType::DateRange, "2024-02-10_2024-02-11", "10 Feb to 11 Feb 2024");

    let view = store.filtered(&data, &[]);
    assert_eq!(view.to_vec(), data[..2].to_vec());
}

#[test]
fn test_status_and_country_intersect() {
    let data = fleet();
    let mut store = FilterStore::new();
    store.add(FilterType::DeliveryStatus, "Late", "");
    store.add(FilterType::Country, "Germany", "");

    let view = store.filtered(&data, &[]);
    assert_eq!(view.len(), 2);
    assert!(view
        .iter()
        .all(|r| r.country == "Germany" && r.delivery_status == DeliveryStatus::Late));
}

#[test]
fn test_same_type_filters_union() {
    let data = fleet();
    let mut store = FilterStore::new();
    store.add(FilterType::Country, "Germany", "");
    store.add(FilterType::Country, "France", "");

    let view = store.filtered(&data, &[]);
    assert_eq!(view.len(), 5);
    assert!(view.iter().all(|r| r.country != "Spain"));
}

#[test]
fn test_map_view_equals_view_without_geography() {
    let data = fleet();
    let mut store = FilterStore::new();
    let country = store.add(FilterType::Country, "Spain", "");
    store.add(FilterType::Carrier, "DHL", "");

    let map = store.filtered_for_map(&data, &[]).to_vec();
    store.remove(country.id);
    let charts = store.filtered(&data, &[]).to_vec();
    assert_eq!(map, charts);
}

#[test]
fn test_free_functions_match_store_methods() {
    let data = fleet();
    let mut store = FilterStore::new();
    store.add(FilterType::Month, "Jan 2024", "");
    let extra = [FilterSpec::new(FilterType::Carrier, "UPS", "")];

    assert_eq!(
        filter_records(&data, store.active(), &extra).to_vec(),
        store.filtered(&data, &extra).to_vec()
    );
    assert_eq!(
        filter_for_map(&data, store.active(), &extra).len(),
        store.filtered_for_map(&data, &extra).len()
    );
}

#[test]
fn test_no_filters_returns_dataset_unchanged() {
    let data = fleet();
    let store = FilterStore::new();
    let view = store.filtered(&data, &[]);
    assert!(view.is_unfiltered());
    assert_eq!(view.to_vec(), data);
}

#[test]
fn test_foreign_filter_type_fails_open() {
    let data = fleet();
    let spec: FilterSpec =
        serde_json::from_str(r#"{"type": "legendFilter", "value": "lateDelivery"}"#).unwrap();
    let mut store = FilterStore::new();
    store.add_spec(spec);

    assert_eq!(store.filtered(&data, &[]).len(), data.len());
}

#[test]
fn test_malformed_date_range_matches_nothing() {
    let data = fleet();
    let mut store = FilterStore::new();
    store.add(FilterType::DateRange, "2024-01-01", "");
    assert!(store.filtered(&data, &[]).is_empty());
}

#[test]
fn test_drill_down_after_range_selection() {
    let mut store = FilterStore::new();
    store.add(FilterType::DateRange, "2024-01-01_2024-01-05", "");
    let advisor = DrillDownAdvisor::for_store(&store);

    let options = advisor.restrict_options(DrillDownOption::time_options());
    let enabled: Vec<_> = options
        .iter()
        .filter(|o| !o.disabled)
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(enabled, vec!["weekly", "daily"]);
    assert_eq!(
        advisor.suggest_granularity(ChartKind::Temporal, Granularity::Monthly),
        Granularity::Daily
    );
}

#[test]
fn test_dashboard_round_trip() {
    let mut session = DashboardSession::new(fleet());

    // Select a late reason on the legend, then narrow by month
    let click = session.click_legend("late-delivery-chart", "Weather Delays", None);
    assert!(matches!(click, LegendClick::Added(_)));
    session
        .store_mut()
        .add(FilterType::Month, "Apr 2024", "Month: Apr 2024");

    let charts = session.view(ViewKind::Charts);
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].country, "Germany");
    assert_eq!(
        session.suggest_granularity(ChartKind::Temporal, Some(Granularity::Monthly)),
        Granularity::Weekly
    );

    // Second click on the same legend entry toggles it off
    let click = session.click_legend("late-delivery-chart", "Weather Delays", None);
    assert!(matches!(click, LegendClick::Removed(_)));
    assert!(session.active_legend_keys("late-delivery-chart").is_empty());

    assert_eq!(session.store_mut().clear(), 1);
    assert_eq!(session.view(ViewKind::Map).len(), fleet().len());
}
