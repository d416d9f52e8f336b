//! User preferences persistence for dispatchboard
//!
//! Stores dashboard preferences in `<config_dir>/dispatchboard-preferences.json`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::drilldown::Granularity;
use crate::filter::date_range::DEFAULT_MAX_RANGE_DAYS;
use crate::legend::{LegendBridge, LegendMapping};

const FILE_NAME: &str = "dispatchboard-preferences.json";

/// dispatchboard-specific user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardPreferences {
    /// Granularity charts start at before any time filter is applied
    pub default_granularity: Granularity,

    /// Widest date range accepted from the resolver, in days
    pub max_date_range_days: i64,

    /// Per-chart legend mappings replacing the standard ones
    pub legend_overrides: BTreeMap<String, LegendMapping>,
}

impl Default for DashboardPreferences {
    fn default() -> Self {
        Self {
            default_granularity: Granularity::Monthly,
            max_date_range_days: DEFAULT_MAX_RANGE_DAYS,
            legend_overrides: BTreeMap::new(),
        }
    }
}

impl DashboardPreferences {
    /// Load preferences from `<config_dir>/dispatchboard-preferences.json`.
    /// Returns defaults on any I/O or parse error (graceful degradation).
    pub fn load(config_dir: &Path) -> Self {
        let path = config_dir.join(FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist preferences to `<config_dir>/dispatchboard-preferences.json`.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)
            .context("Failed to create config directory for preferences")?;
        let path = config_dir.join(FILE_NAME);
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize preferences")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write preferences to {}", path.display()))
    }

    /// Standard legend table with this user's overrides applied
    pub fn legend_bridge(&self) -> LegendBridge {
        LegendBridge::standard().with_overrides(&self.legend_overrides)
    }
}
