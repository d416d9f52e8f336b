//! CLI helpers: argument parsing, view summaries and output formatting

use anyhow::{bail, Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use dispatchboard_core::{
    drill_down_label, DeliveryStatus, DrillDownOption, Filter, FilterSpec, FilterType,
    Granularity, LegendClick, LegendStatus, LoadError, LogisticsRecord,
};
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// Argument Parsing
// ============================================================================

/// Parse `TYPE=VALUE` into a filter spec with a generated label
pub fn parse_filter_arg(raw: &str) -> Result<FilterSpec> {
    let Some((kind, value)) = raw.split_once('=') else {
        bail!("Expected TYPE=VALUE, got '{}'", raw);
    };

    let kind: FilterType = kind
        .parse()
        .with_context(|| format!("Invalid filter '{}'", raw))?;
    let value = value.trim();
    if value.is_empty() {
        bail!("Filter '{}' has an empty value", raw);
    }

    Ok(FilterSpec::with_default_label(kind, value))
}

/// Categorical drill-down menu offered by late-reason and carrier charts
pub fn categorical_options() -> Vec<DrillDownOption> {
    [
        "all_reasons",
        "by_month",
        "by_quarter",
        "by_week",
        "by_day",
        "by_country",
        "by_carrier",
    ]
    .into_iter()
    .map(|value| DrillDownOption::new(value, drill_down_label(value).unwrap_or(value)))
    .collect()
}

// ============================================================================
// Summaries
// ============================================================================

/// Aggregate figures for a filtered view
#[derive(Debug, Clone, Serialize)]
pub struct ViewSummary {
    pub matched: usize,
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_country: BTreeMap<String, usize>,
    pub order_value: f64,
    pub avg_delivery_time: Option<f64>,
}

pub fn summarize(view: &[&LogisticsRecord], total: usize) -> ViewSummary {
    let mut by_status: BTreeMap<String, usize> = DeliveryStatus::ALL
        .iter()
        .map(|status| (status.to_string(), 0))
        .collect();
    let mut by_country: BTreeMap<String, usize> = BTreeMap::new();

    for record in view {
        *by_status
            .entry(record.delivery_status.to_string())
            .or_default() += 1;
        let country = if record.country.is_empty() {
            "-".to_string()
        } else {
            record.country.clone()
        };
        *by_country.entry(country).or_default() += 1;
    }

    let order_value = view.iter().map(|r| r.order_value).sum();
    let avg_delivery_time = (!view.is_empty())
        .then(|| view.iter().map(|r| r.delivery_time).sum::<f64>() / view.len() as f64);

    ViewSummary {
        matched: view.len(),
        total,
        by_status,
        by_country,
        order_value,
        avg_delivery_time,
    }
}

/// Outcome of one simulated legend click
#[derive(Debug, Clone, Serialize)]
pub struct ClickOutcome {
    pub key: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl ClickOutcome {
    pub fn new(key: &str, click: LegendClick) -> Self {
        let (outcome, filter) = match click {
            LegendClick::Added(f) => ("added", Some(f)),
            LegendClick::Removed(f) => ("removed", Some(f)),
            LegendClick::Unmapped => ("unmapped", None),
        };
        Self {
            key: key.to_string(),
            outcome,
            filter,
        }
    }
}

/// Legend state of one chart after a sequence of clicks
#[derive(Debug, Clone, Serialize)]
pub struct LegendReport {
    pub chart_id: String,
    pub clicks: Vec<ClickOutcome>,
    pub statuses: Vec<(String, LegendStatus)>,
    pub active_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrillDownReport<'a> {
    pub options: &'a [DrillDownOption],
    pub suggestion: Granularity,
}

// ============================================================================
// Formatters
// ============================================================================

fn header(table: &mut Table, columns: &[&str], no_color: bool) {
    if no_color {
        table.set_header(columns.to_vec());
    } else {
        table.set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

/// Format the active filters as tag list lines
pub fn format_filters(filters: &[Filter]) -> String {
    if filters.is_empty() {
        return "Filters: none".to_string();
    }
    let tags = filters
        .iter()
        .map(|f| format!("[{}]", f.display_label()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("Filters: {}", tags)
}

/// Format a view summary as tables (human) or JSON
pub fn format_summary(summary: &ViewSummary, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![format!(
        "Matched {} of {} records ({})",
        summary.matched,
        summary.total,
        format_percent(summary.matched, summary.total)
    )];
    lines.push(format!("Order value:      {:.2}", summary.order_value));
    lines.push(format!(
        "Avg delivery:     {}",
        summary
            .avg_delivery_time
            .map(|h| format!("{:.1}h", h))
            .unwrap_or_else(|| "-".to_string())
    ));

    let mut status = Table::new();
    status.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut status, &["Status", "Records", "Share"], no_color);
    for (name, count) in &summary.by_status {
        status.add_row(Row::from(vec![
            name.clone(),
            count.to_string(),
            format_percent(*count, summary.matched),
        ]));
    }
    lines.push(status.to_string());

    if !summary.by_country.is_empty() {
        let mut countries = Table::new();
        countries.set_content_arrangement(ContentArrangement::Dynamic);
        header(&mut countries, &["Country", "Records"], no_color);
        let mut rows: Vec<_> = summary.by_country.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (country, count) in rows {
            countries.add_row(Row::from(vec![country.clone(), count.to_string()]));
        }
        lines.push(countries.to_string());
    }

    lines.join("\n")
}

/// Format drill-down options with their disabled flags
pub fn format_drilldown(report: &DrillDownReport<'_>, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Option", "Label", "Available"], no_color);

    for option in report.options {
        let available = if option.disabled { "no" } else { "yes" };
        let cell = if no_color {
            Cell::new(available)
        } else if option.disabled {
            Cell::new(available).fg(Color::DarkGrey)
        } else {
            Cell::new(available).fg(Color::Green)
        };
        table.add_row(Row::from(vec![
            Cell::new(&option.value),
            Cell::new(&option.label),
            cell,
        ]));
    }

    format!(
        "{}\nSuggested granularity: {}",
        table,
        report.suggestion.label()
    )
}

/// Format a legend simulation (human or JSON)
pub fn format_legend(report: &LegendReport, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = Vec::new();
    for click in &report.clicks {
        let detail = click
            .filter
            .as_ref()
            .map(|f| format!(" ({})", f.display_label()))
            .unwrap_or_default();
        lines.push(format!("click {:<20} {}{}", click.key, click.outcome, detail));
    }

    if !report.statuses.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        header(&mut table, &["Legend key", "Status"], no_color);
        for (key, status) in &report.statuses {
            let cell = if !no_color && status.is_highlighted() {
                Cell::new(status.as_str()).fg(Color::Yellow)
            } else {
                Cell::new(status.as_str())
            };
            table.add_row(Row::from(vec![Cell::new(key), cell]));
        }
        lines.push(table.to_string());
    }

    let active = if report.active_keys.is_empty() {
        "none".to_string()
    } else {
        report.active_keys.join(", ")
    };
    lines.push(format!("Highlighted on {}: {}", report.chart_id, active));
    lines.join("\n")
}

/// One-line problem report with an optional hint line
pub fn format_load_error(error: &LoadError) -> String {
    let mut output = format!(
        "{}: {}: {}",
        error.severity.as_str(),
        error.source,
        error.message
    );
    if let Some(suggestion) = &error.suggestion {
        output.push_str(&format!("\n  hint: {}", suggestion));
    }
    output
}

/// Matching records as a JSON array
pub fn format_records_json(records: &[&LogisticsRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

// ============================================================================
// Utilities
// ============================================================================

fn format_percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

// ============================================================================
// Tests
// ============================================================================
