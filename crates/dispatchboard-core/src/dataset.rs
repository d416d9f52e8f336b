//! Dataset loader for JSON arrays of logistics records

use std::path::Path;
use tracing::{debug, warn};

use crate::error::{CoreError, LoadError, LoadReport};
use dispatchboard_types::{LogisticsRecord, PeriodLabels};

/// Records read from a dataset file plus what went wrong along the way
#[derive(Debug, Default)]
pub struct LoadedDataset {
    pub records: Vec<LogisticsRecord>,
    pub report: LoadReport,
}

impl LoadedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read and parse a dataset file
pub fn load_records(path: &Path) -> Result<LoadedDataset, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoreError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CoreError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    parse_records(&content, path)
}

/// Parse a JSON array of records, skipping entries that do not deserialize
///
/// `origin` only names the source in errors and report entries. Records with
/// empty period labels get them derived from their date.
pub fn parse_records(json: &str, origin: &Path) -> Result<LoadedDataset, CoreError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| CoreError::JsonParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
            source: e,
        })?;

    let source = origin.display().to_string();
    let mut report = LoadReport::new();
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<LogisticsRecord>(entry) {
            Ok(mut record) => {
                fill_missing_periods(&mut record);
                records.push(record);
            }
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed record");
                report.add_error(
                    LoadError::warning(&source, format!("Record {} skipped: {}", index, e))
                        .with_suggestion("Check the record's date and deliveryStatus fields"),
                );
                report.records_skipped += 1;
            }
        }
    }

    report.records_loaded = records.len();
    debug!(
        loaded = report.records_loaded,
        skipped = report.records_skipped,
        source = %source,
        "Dataset parsed"
    );

    Ok(LoadedDataset { records, report })
}

fn fill_missing_periods(record: &mut LogisticsRecord) {
    if !record.quarter.is_empty()
        && !record.month.is_empty()
        && !record.week.is_empty()
        && !record.day.is_empty()
    {
        return;
    }

    let labels = PeriodLabels::for_date(record.date);
    for (field, label) in [
        (&mut record.quarter, labels.quarter),
        (&mut record.month, labels.month),
        (&mut record.week, labels.week),
        (&mut record.day, labels.day),
    ] {
        if field.is_empty() {
            *field = label;
        }
    }
}
