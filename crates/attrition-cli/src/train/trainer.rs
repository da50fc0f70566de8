use anyhow::{Context, Result};
use attrition_core::data_handling::load_records_from_path;
use attrition_core::dataset::prepare_dataset;
use attrition_core::feature_engineering::FeatureReport;
use attrition_core::models::factory::build_model;
use attrition_core::models::ClassifierModel;
use attrition_core::report::{prediction_records, PredictionRecord};
use attrition_core::schema::META_ATTRIBUTES;
use attrition_core::stats::{
    evaluate_probabilities, optimize_threshold, EvaluationReport, ThresholdChoice,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::train::input::TrainConfig;
use crate::util::{get_device, write_bytes_to_file};

/// Test-set metrics at the configured and at the optimised threshold.
#[derive(Debug, Serialize)]
pub struct EvaluationSummary {
    pub configured: EvaluationReport,
    pub optimal_threshold: ThresholdChoice,
    pub optimized: EvaluationReport,
}

pub fn run_training(config: &TrainConfig) -> Result<()> {
    let start_time = Instant::now();
    let pipeline = config.pipeline();
    let output_dir = PathBuf::from(&config.output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let dataset = load_records_from_path(&config.data)
        .with_context(|| format!("Failed to load employee data: {}", config.data))?;
    dataset.log_input_data_summary();

    let feature_report = FeatureReport::from_dataset(&dataset);
    write_json(&output_dir.join("feature_report.json"), &feature_report)?;

    let prepared = prepare_dataset(&dataset, &pipeline.preparation)
        .context("Failed to prepare dataset")?;
    drop(dataset);

    let device = get_device(&config.device)?;
    log::trace!("Building sequence classifier on device: {:?}", device);
    let mut model = build_model(
        prepared.feature_width(),
        &pipeline.model,
        device,
        pipeline.preparation.seed,
    )?;

    let epochs = pipeline.training.epochs;
    let history = model.fit_with_callback(
        &prepared.x_train,
        &prepared.y_train,
        &pipeline.training,
        &mut |record| {
            log::info!(
                "[training] Epoch {}/{}: loss {:.5}, val_loss {:.5}",
                record.epoch + 1,
                epochs,
                record.loss,
                record.val_loss
            );
        },
    )?;
    write_json(&output_dir.join("history.json"), &history)?;

    let probabilities = model.predict(&prepared.x_test)?;
    let labels = prepared.y_test.to_vec();
    let configured = evaluate_probabilities(&probabilities, &labels, pipeline.decision_threshold);
    let optimal_threshold = optimize_threshold(&probabilities, &labels);
    let optimized = evaluate_probabilities(&probabilities, &labels, optimal_threshold.threshold);
    log_evaluation("configured", &configured);
    log_evaluation("optimized", &optimized);

    write_json(
        &output_dir.join("evaluation.json"),
        &EvaluationSummary {
            configured,
            optimal_threshold,
            optimized,
        },
    )?;

    let records = prediction_records(&prepared, &probabilities, pipeline.decision_threshold)?;
    write_predictions(&output_dir.join("predictions.csv"), &records)?;

    model.save(&output_dir, &config.model_name)?;
    write_json(&output_dir.join("pipeline_config.json"), &config.effective())?;

    log::info!("Training completed in {:?}", start_time.elapsed());
    log::info!("Outputs written to: {:?}", output_dir);
    Ok(())
}

fn log_evaluation(label: &str, report: &EvaluationReport) {
    log::info!(
        "[{}] threshold {:.2}: precision {:.4}, recall {:.4}, F1 {:.4}, AUC {:.4} (TP {}, TN {}, FP {}, FN {})",
        label,
        report.threshold,
        report.precision,
        report.recall,
        report.f1,
        report.auc,
        report.confusion.tp,
        report.confusion.tn,
        report.confusion.fp,
        report.confusion.fn_
    );
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes_to_file(path, &bytes)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// One row per test employee: meta columns, then probability, predicted and actual labels.
pub fn write_predictions(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    let mut header: Vec<&str> = META_ATTRIBUTES.to_vec();
    header.extend(["probability", "predicted", "actual"]);
    wtr.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = META_ATTRIBUTES
            .iter()
            .map(|name| record.meta.get(*name).cloned().unwrap_or_default())
            .collect();
        row.push(format!("{:.6}", record.probability));
        row.push(record.predicted.to_string());
        row.push(record.actual.to_string());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
