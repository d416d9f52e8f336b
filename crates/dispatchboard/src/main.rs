//! dispatchboard - Cross-filtering engine for logistics dashboards

mod cli;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dispatchboard_core::{
    load_records, ChartKind, CoreError, DashboardPreferences, DashboardSession, DateRange,
    DrillDownOption, FilterSpec, Granularity, LoadError, ViewKind,
};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{ClickOutcome, DrillDownReport, LegendReport};

#[derive(Parser)]
#[command(
    name = "dispatchboard",
    version,
    about = "Cross-filtering engine for logistics dashboards",
    long_about = "Applies dashboard filters to a JSON dataset of delivery records and shows\n\
                  what each chart would display.\n\
                  \n\
                  Filters combine with AND across types and OR within a type. The map view\n\
                  ignores region, country and subdivision filters.\n\
                  \n\
                  Examples:\n\
                    dispatchboard --data deliveries.json filter -f country=Germany -f deliveryStatus=Late\n\
                    dispatchboard --data deliveries.json filter --date-range 2024-02-10_2024-02-11 --map\n\
                    dispatchboard --data deliveries.json drilldown -f \"week=Week of Jan 7, 2024\"\n\
                    dispatchboard --data deliveries.json legend --chart dual-axis-chart --click lateDelivery\n\
                    dispatchboard preferences --granularity weekly\n\
                  \n\
                  Environment Variables:\n\
                    DISPATCHBOARD_DATA               # Default dataset path\n\
                    DISPATCHBOARD_CONFIG_DIR         # Preferences directory\n\
                    DISPATCHBOARD_NO_COLOR           # Disable ANSI colors (log-friendly)\n\
                    RUST_LOG                         # Log filter, e.g. dispatchboard_core=debug"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON array of delivery records
    #[arg(long, global = true, env = "DISPATCHBOARD_DATA")]
    data: Option<PathBuf>,

    /// Preferences directory (default: <config dir>/dispatchboard)
    #[arg(long, global = true, env = "DISPATCHBOARD_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "DISPATCHBOARD_NO_COLOR")]
    no_color: bool,
}

#[derive(Args)]
struct FilterArgs {
    /// Active filter as TYPE=VALUE (repeatable)
    #[arg(long = "filter", short = 'f', value_name = "TYPE=VALUE", value_parser = cli::parse_filter_arg)]
    filters: Vec<FilterSpec>,

    /// Resolved date range START_END (YYYY-MM-DD_YYYY-MM-DD)
    #[arg(long, value_name = "START_END")]
    date_range: Option<DateRange>,
}

#[derive(Subcommand)]
enum Command {
    /// Show what charts (or the map) display under the given filters
    Filter {
        #[command(flatten)]
        filters: FilterArgs,
        /// Compute the map view (geographic filters ignored)
        #[arg(long)]
        map: bool,
        /// Print matching records instead of a summary (always JSON)
        #[arg(long)]
        records: bool,
    },
    /// Show available drill-down options and the suggested granularity
    Drilldown {
        #[command(flatten)]
        filters: FilterArgs,
        /// Chart kind: temporal or categorical
        #[arg(long, default_value = "temporal")]
        chart: ChartKind,
        /// Granularity the chart currently shows (default: from preferences)
        #[arg(long)]
        current: Option<Granularity>,
    },
    /// Simulate legend clicks on a chart
    Legend {
        #[command(flatten)]
        filters: FilterArgs,
        /// Chart id, e.g. dual-axis-chart or late-delivery-chart
        #[arg(long)]
        chart: String,
        /// Legend key to click (repeatable, applied in order)
        #[arg(long = "click", value_name = "KEY")]
        clicks: Vec<String>,
    },
    /// Show or update saved preferences
    Preferences {
        /// Default chart granularity
        #[arg(long)]
        granularity: Option<Granularity>,
        /// Widest accepted date range in days
        #[arg(long)]
        max_range_days: Option<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_dir = cli
        .config_dir
        .or_else(|| dirs::config_dir().map(|d: PathBuf| d.join("dispatchboard")))
        .context("Could not determine config directory")?;
    let preferences = DashboardPreferences::load(&config_dir);

    let json = cli.json;
    let no_color = cli.no_color;

    match cli.command {
        Command::Filter {
            filters,
            map,
            records,
        } => {
            let session = open_session(cli.data.as_deref(), preferences, filters)?;
            run_filter(&session, map, records, json, no_color);
        }
        Command::Drilldown {
            filters,
            chart,
            current,
        } => {
            let session = open_session(cli.data.as_deref(), preferences, filters)?;
            run_drilldown(&session, chart, current, json, no_color);
        }
        Command::Legend {
            filters,
            chart,
            clicks,
        } => {
            let mut session = open_session(cli.data.as_deref(), preferences, filters)?;
            run_legend(&mut session, &chart, &clicks, json, no_color);
        }
        Command::Preferences {
            granularity,
            max_range_days,
        } => {
            run_preferences(&config_dir, preferences, granularity, max_range_days, json)?;
        }
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the dataset and apply the command line filters
fn open_session(
    data: Option<&Path>,
    preferences: DashboardPreferences,
    args: FilterArgs,
) -> Result<DashboardSession> {
    let path = data.context("No dataset given (use --data or DISPATCHBOARD_DATA)")?;
    let dataset = load_records(path)
        .inspect_err(|e| report_error("dataset", e))
        .with_context(|| format!("Failed to load dataset from {}", path.display()))?;

    for warning in dataset.report.warnings() {
        warn!(source = %warning.source, "{}", warning.message);
    }
    if dataset.report.records_skipped > 0 {
        eprintln!(
            "Skipped {} malformed records ({} loaded)",
            dataset.report.records_skipped, dataset.report.records_loaded
        );
    }

    let mut session = DashboardSession::with_preferences(dataset.records, preferences);
    session.store_mut().add_many(args.filters);
    if let Some(range) = args.date_range {
        session
            .apply_date_range(range)
            .inspect_err(|e| report_error("--date-range", e))
            .context("Date range rejected")?;
    }
    Ok(session)
}

fn report_error(source: &str, error: &CoreError) {
    eprintln!(
        "{}",
        cli::format_load_error(&LoadError::from_core_error(source, error))
    );
}

fn run_filter(session: &DashboardSession, map: bool, records: bool, json: bool, no_color: bool) {
    let kind = if map { ViewKind::Map } else { ViewKind::Charts };
    let view = session.view(kind);

    if records {
        println!("{}", cli::format_records_json(&view));
        return;
    }

    let summary = cli::summarize(&view, session.dataset().len());
    if !json {
        println!("{}", cli::format_filters(session.store().active()));
        if map {
            println!("Map view: geographic filters ignored");
        }
    }
    println!("{}", cli::format_summary(&summary, json, no_color));
}

fn run_drilldown(
    session: &DashboardSession,
    chart: ChartKind,
    current: Option<Granularity>,
    json: bool,
    no_color: bool,
) {
    let base = match chart {
        ChartKind::Temporal => DrillDownOption::time_options(),
        ChartKind::Categorical => cli::categorical_options(),
    };
    let options = session.drill_down_options(base);
    let report = DrillDownReport {
        options: &options,
        suggestion: session.suggest_granularity(chart, current),
    };

    if !json {
        println!("{}", cli::format_filters(session.store().active()));
    }
    println!("{}", cli::format_drilldown(&report, json, no_color));
}

fn run_legend(
    session: &mut DashboardSession,
    chart: &str,
    clicks: &[String],
    json: bool,
    no_color: bool,
) {
    let outcomes: Vec<ClickOutcome> = clicks
        .iter()
        .map(|key| ClickOutcome::new(key, session.click_legend(chart, key, None)))
        .collect();

    let mut keys = session.legend().known_keys(chart);
    for key in clicks
        .iter()
        .cloned()
        .chain(session.active_legend_keys(chart))
    {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let report = LegendReport {
        chart_id: chart.to_string(),
        clicks: outcomes,
        statuses: keys
            .into_iter()
            .map(|key| {
                let status = session.legend_status(chart, &key);
                (key, status)
            })
            .collect(),
        active_keys: session.active_legend_keys(chart),
    };
    println!("{}", cli::format_legend(&report, json, no_color));
}

fn run_preferences(
    config_dir: &Path,
    mut preferences: DashboardPreferences,
    granularity: Option<Granularity>,
    max_range_days: Option<i64>,
    json: bool,
) -> Result<()> {
    let changed = granularity.is_some() || max_range_days.is_some();
    if let Some(granularity) = granularity {
        preferences.default_granularity = granularity;
    }
    if let Some(days) = max_range_days {
        preferences.max_date_range_days = days;
    }
    if changed {
        preferences.save(config_dir)?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&preferences).context("Failed to serialize preferences")?
        );
    } else {
        println!("Config dir:          {}", config_dir.display());
        println!("Default granularity: {}", preferences.default_granularity.label());
        println!("Max date range:      {} days", preferences.max_date_range_days);
        println!("Legend overrides:    {}", preferences.legend_overrides.len());
        if changed {
            println!("Saved.");
        }
    }
    Ok(())
}
