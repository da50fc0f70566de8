mod common;

use attrition_core::config::{ModelConfig, PreparationConfig, TrainingConfig};
use attrition_core::data_handling::load_records;
use attrition_core::dataset::prepare_dataset;
use attrition_core::error::AttritionError;
use attrition_core::models::factory::build_model;
use attrition_core::models::{
    ClassifierModel, ModelState, SequenceArchitecture, SequenceClassifier,
};
use attrition_core::report::prediction_records;
use candle_core::Device;
use ndarray::{Array1, Array2};

fn separable(n: usize) -> (Array2<f32>, Array1<u8>) {
    let x = Array2::from_shape_fn((n, 4), |(i, j)| {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        sign * (1.0 + j as f32 * 0.1) + (i as f32 * 0.01)
    });
    let y = Array1::from_iter((0..n).map(|i| u8::from(i % 2 == 0)));
    (x, y)
}

fn arch(learning_rate: f64) -> SequenceArchitecture {
    SequenceArchitecture {
        timesteps: 2,
        features: 2,
        units: 8,
        layers: 2,
        learning_rate,
        dropout: 0.1,
    }
}

fn training(epochs: usize, patience: usize) -> TrainingConfig {
    TrainingConfig {
        epochs,
        batch_size: 8,
        validation_split: 0.25,
        patience,
    }
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[test]
fn test_fit_before_build_fails() {
    let (x, y) = separable(8);
    let mut clf = SequenceClassifier::new(Device::Cpu);
    let err = clf.fit(&x, &y, &training(2, 2)).unwrap_err();
    assert!(matches!(err, AttritionError::Configuration(_)));
}

#[test]
fn test_fit_moves_to_trained() {
    let (x, y) = separable(24);
    let mut clf = SequenceClassifier::new(Device::Cpu);
    clf.build(arch(1e-2)).unwrap();
    assert_eq!(clf.state(), ModelState::Built);

    let mut seen = Vec::new();
    let history = clf
        .fit_with_callback(&x, &y, &training(3, 5), &mut |record| seen.push(record.epoch))
        .unwrap();

    assert_eq!(clf.state(), ModelState::Trained);
    assert_eq!(history.len(), 3);
    assert_eq!(seen, vec![0, 1, 2]);
    assert!(history.epochs.iter().all(|e| e.loss.is_finite() && e.val_loss.is_finite()));
}

#[test]
fn test_early_stopping_without_learning() {
    // A zero learning rate keeps the validation loss flat, so only the first
    // epoch counts as an improvement.
    let (x, y) = separable(20);
    let mut clf = SequenceClassifier::new(Device::Cpu);
    clf.build(arch(0.0)).unwrap();
    let history = clf.fit(&x, &y, &training(50, 3)).unwrap();

    assert!(history.stopped_early);
    assert_eq!(history.len(), 4);
}

#[test]
fn test_patience_is_at_least_two() {
    let (x, y) = separable(20);
    let mut clf = SequenceClassifier::new(Device::Cpu);
    clf.build(arch(0.0)).unwrap();
    let history = clf.fit(&x, &y, &training(50, 0)).unwrap();
    assert_eq!(history.len(), 3);
}

#[test]
fn test_rebuild_replaces_network() {
    let mut clf = SequenceClassifier::new(Device::Cpu);
    clf.build(arch(1e-3)).unwrap();
    let mut wider = arch(1e-3);
    wider.features = 3;
    clf.build(wider).unwrap();
    assert_eq!(clf.architecture().map(|a| a.input_width()), Some(6));
    assert!(clf.predict(&Array2::zeros((1, 4))).is_err());
    assert_eq!(clf.predict(&Array2::zeros((1, 6))).unwrap().len(), 1);
}

// -----------------------------------------------------------------------------
// Evaluation and persistence
// -----------------------------------------------------------------------------

#[test]
fn test_evaluate_counts_every_row() {
    let (x, y) = separable(16);
    let mut clf = SequenceClassifier::new(Device::Cpu);
    clf.build(arch(1e-2)).unwrap();
    clf.fit(&x, &y, &training(2, 2)).unwrap();
    let report = clf.evaluate(&x, &y, 0.5).unwrap();
    assert_eq!(report.confusion.total(), 16);
    assert!((0.0..=1.0).contains(&report.auc));
}

#[test]
fn test_save_and_load_round_trip() {
    let (x, y) = separable(16);
    let mut clf = SequenceClassifier::new(Device::Cpu);
    clf.build(arch(1e-2)).unwrap();
    clf.fit(&x, &y, &training(2, 2)).unwrap();
    let before = clf.predict(&x).unwrap();

    let dir = tempfile::tempdir().unwrap();
    clf.save(dir.path(), "model").unwrap();
    assert!(dir.path().join("model.safetensors").exists());
    assert!(dir.path().join("model.json").exists());

    let restored = SequenceClassifier::load(dir.path(), "model", Device::Cpu).unwrap();
    assert_eq!(restored.state(), ModelState::Trained);
    assert_eq!(restored.architecture(), clf.architecture());
    assert_eq!(restored.predict(&x).unwrap(), before);
}

#[test]
fn test_end_to_end_on_prepared_dataset() {
    let data = load_records(&common::employee_table(60), b',').unwrap();
    let prepared = prepare_dataset(&data, &PreparationConfig::default()).unwrap();
    let model_config = ModelConfig {
        units: 8,
        layers: 1,
        ..Default::default()
    };
    let mut clf = build_model(prepared.feature_width(), &model_config, Device::Cpu, 42).unwrap();
    let history = clf
        .fit(&prepared.x_train, &prepared.y_train, &training(2, 2))
        .unwrap();
    assert!(!history.is_empty());

    let probabilities = clf.predict(&prepared.x_test).unwrap();
    let records = prediction_records(&prepared, &probabilities, 0.5).unwrap();
    assert_eq!(records.len(), prepared.x_test.nrows());
    assert!(records
        .iter()
        .all(|r| r.predicted == u8::from(r.probability >= 0.5)));
    assert!(prediction_records(&prepared, &probabilities[1..], 0.5).is_err());
}
