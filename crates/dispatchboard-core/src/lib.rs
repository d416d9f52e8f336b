//! dispatchboard-core - Cross-filter engine for dispatchboard
//!
//! Holds the active filter set for one dashboard session and derives
//! everything the charts need from it: filtered record views, drill-down
//! granularity decisions and legend highlight state.

pub mod dataset;
pub mod drilldown;
pub mod error;
pub mod event;
pub mod filter;
pub mod legend;
pub mod preferences;
pub mod session;

pub use dataset::{load_records, parse_records, LoadedDataset};
pub use drilldown::{
    analyze_date_range, drill_down_label, ChartKind, DateRangeAnalysis, DrillDownAdvisor,
    DrillDownOption, Granularity, SpanClass,
};
pub use error::{CoreError, ErrorSeverity, LoadError, LoadReport};
pub use event::{EventBus, FilterEvent};
pub use filter::{
    filter_for_map, filter_records, DateRange, Filter, FilterId, FilterSpec, FilterStore,
    FilterType, FilteredView,
};
pub use legend::{LegendBridge, LegendClick, LegendItem, LegendMapping, LegendStatus};
pub use preferences::DashboardPreferences;
pub use session::{DashboardSession, SessionConfig, ViewKind};

pub use dispatchboard_types::{DeliveryStatus, LogisticsRecord, PeriodLabels};
