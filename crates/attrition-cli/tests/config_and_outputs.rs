use attrition_cli::inspect::inspect;
use attrition_cli::train::input::TrainConfig;
use attrition_cli::train::trainer::{run_training, write_predictions};
use attrition_cli::util::{get_device, validate_tsv_or_csv_file};
use attrition_core::config::PreparationConfig;
use attrition_core::report::PredictionRecord;
use std::collections::BTreeMap;
use std::fs;

fn small_table(n: usize) -> String {
    let mut out = String::from(
        "EmployeeNumber,Attrition,Age,MonthlyIncome,JobLevel,JobSatisfaction,OverTime,Gender\n",
    );
    for i in 0..n {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            i + 1,
            if i % 4 == 0 { "Yes" } else { "No" },
            20 + i % 30,
            2000 + (i * 37) % 5000,
            1 + i % 4,
            1 + i % 4,
            if i % 3 == 0 { "Yes" } else { "No" },
            if i % 2 == 0 { "Male" } else { "Female" }
        ));
    }
    out
}

// -----------------------------------------------------------------------------
// Config loading
// -----------------------------------------------------------------------------

#[test]
fn test_missing_fields_use_defaults() {
    let config = TrainConfig::from_json(r#"{"data": "employees.csv"}"#).unwrap();
    assert_eq!(config.data, "employees.csv");
    assert_eq!(config.output_dir, "attrition_output");
    assert_eq!(config.training.patience, 5);
    assert_eq!(config.decision_threshold, 0.5);
}

#[test]
fn test_invalid_field_falls_back() {
    let config =
        TrainConfig::from_json(r#"{"decision_threshold": "high", "training": {"epochs": 7}}"#)
            .unwrap();
    assert_eq!(config.decision_threshold, 0.5);
    assert_eq!(config.training.epochs, 7);
}

#[test]
fn test_invalid_nested_field_keeps_siblings() {
    let config = TrainConfig::from_json(
        r#"{"training": {"epochs": 30, "patience": "x"},
            "preparation": {"seed": 7, "augmentation": {"enabled": true, "noise_std": "bad"}}}"#,
    )
    .unwrap();
    assert_eq!(config.training.epochs, 30);
    assert_eq!(config.training.patience, 5);
    assert_eq!(config.preparation.seed, 7);
    assert!(config.preparation.augmentation.enabled);
    assert_eq!(config.preparation.augmentation.noise_std, 0.05);
    assert_eq!(config.preparation.test_fraction, 0.2);
}

#[test]
fn test_non_object_section_falls_back() {
    let config = TrainConfig::from_json(r#"{"model": 3}"#).unwrap();
    assert_eq!(config.model.units, 64);
}

#[test]
fn test_pipeline_is_clamped() {
    let config = TrainConfig::from_json(
        r#"{"preparation": {"test_fraction": 0.99}, "model": {"units": 1}}"#,
    )
    .unwrap();
    let pipeline = config.pipeline();
    assert_eq!(pipeline.preparation.test_fraction, 0.9);
    assert_eq!(pipeline.model.units, 8);
}

#[test]
fn test_invalid_json_is_an_error() {
    assert!(TrainConfig::from_json("{not json").is_err());
}

// -----------------------------------------------------------------------------
// Utilities
// -----------------------------------------------------------------------------

#[test]
fn test_validate_extension_and_existence() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, "Attrition\nYes\n").unwrap();
    assert!(validate_tsv_or_csv_file(csv.to_str().unwrap()).is_ok());

    let txt = dir.path().join("data.txt");
    fs::write(&txt, "Attrition\nYes\n").unwrap();
    assert!(validate_tsv_or_csv_file(txt.to_str().unwrap()).is_err());
    assert!(validate_tsv_or_csv_file(dir.path().join("missing.csv").to_str().unwrap()).is_err());
}

#[test]
fn test_device_parsing() {
    assert!(get_device("cpu").unwrap().is_cpu());
    assert!(get_device("tpu").is_err());
}

#[test]
fn test_predictions_csv_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("predictions.csv");
    let records = vec![PredictionRecord {
        meta: BTreeMap::from([("EmployeeNumber".to_string(), "17".to_string())]),
        probability: 0.75,
        predicted: 1,
        actual: 0,
    }];
    write_predictions(&path, &records).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("EmployeeNumber,probability,predicted,actual"));
    assert_eq!(lines.next(), Some("17,0.750000,1,0"));
}

// -----------------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------------

#[test]
fn test_inspect_summary() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("employees.csv");
    fs::write(&data, small_table(40)).unwrap();

    let summary = inspect(data.to_str().unwrap(), &PreparationConfig::default()).unwrap();
    assert_eq!(summary.rows, 40);
    assert_eq!(summary.train_rows + summary.test_rows, 40);
    assert_eq!(summary.test_rows, 8);
    // 23 numerics + 7 engineered + OverTime(2) + Gender(2)
    assert_eq!(summary.feature_width, 34);
}

#[test]
fn test_training_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("employees.csv");
    fs::write(&data, small_table(40)).unwrap();
    let out = dir.path().join("out");

    let mut config = TrainConfig::default();
    config.data = data.to_str().unwrap().to_string();
    config.output_dir = out.to_str().unwrap().to_string();
    config.model.units = 1;
    config.model.layers = 1;
    config.training.epochs = 2;
    config.training.batch_size = 16;

    run_training(&config).unwrap();

    for name in [
        "model.safetensors",
        "model.json",
        "evaluation.json",
        "history.json",
        "feature_report.json",
        "predictions.csv",
        "pipeline_config.json",
    ] {
        assert!(out.join(name).exists(), "missing {}", name);
    }

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("pipeline_config.json")).unwrap())
            .unwrap();
    assert_eq!(written["model"]["units"], 8);
    assert_eq!(written["training"]["epochs"], 2);

    let predictions = fs::read_to_string(out.join("predictions.csv")).unwrap();
    // header plus one line per test row
    assert_eq!(predictions.lines().count(), 1 + 8);
}
