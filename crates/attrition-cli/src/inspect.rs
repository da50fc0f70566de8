use anyhow::{Context, Result};
use attrition_core::config::PreparationConfig;
use attrition_core::data_handling::load_records_from_path;
use attrition_core::dataset::prepare_dataset;
use attrition_core::feature_engineering::FeatureReport;
use serde::Serialize;

use crate::util::validate_tsv_or_csv_file;

/// What `inspect` prints: the feature report and the split it would train on.
#[derive(Debug, Serialize)]
pub struct InspectSummary {
    pub rows: usize,
    pub skipped_rows: usize,
    pub feature_width: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_positives: usize,
    pub test_positives: usize,
    pub features: FeatureReport,
}

pub fn inspect(path: &str, config: &PreparationConfig) -> Result<InspectSummary> {
    validate_tsv_or_csv_file(path)?;
    let dataset = load_records_from_path(path)
        .with_context(|| format!("Failed to load employee data: {}", path))?;
    dataset.log_input_data_summary();

    let features = FeatureReport::from_dataset(&dataset);
    let prepared = prepare_dataset(&dataset, config)?;

    Ok(InspectSummary {
        rows: dataset.summary.rows,
        skipped_rows: dataset.summary.skipped_rows,
        feature_width: prepared.feature_width(),
        train_rows: prepared.x_train.nrows(),
        test_rows: prepared.x_test.nrows(),
        train_positives: prepared.y_train.iter().filter(|&&v| v == 1).count(),
        test_positives: prepared.y_test.iter().filter(|&&v| v == 1).count(),
        features,
    })
}

pub fn run_inspect(path: &str) -> Result<()> {
    let summary = inspect(path, &PreparationConfig::default())?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
