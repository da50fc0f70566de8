use attrition_core::stats::{evaluate_probabilities, optimize_threshold, roc_auc, ConfusionMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// -----------------------------------------------------------------------------
// ROC-AUC
// -----------------------------------------------------------------------------

#[test]
fn test_perfect_ranking_has_unit_auc() {
    let p: Vec<f32> = (0..50).map(|i| i as f32 / 50.0).collect();
    let y: Vec<u8> = (0..50).map(|i| u8::from(i >= 30)).collect();
    assert_eq!(roc_auc(&p, &y), 1.0);
}

#[test]
fn test_random_scores_are_near_half() {
    let mut rng = StdRng::seed_from_u64(2024);
    let p: Vec<f32> = (0..4000).map(|_| rng.gen::<f32>()).collect();
    let y: Vec<u8> = (0..4000).map(|i| (i % 2) as u8).collect();
    let auc = roc_auc(&p, &y);
    assert!((auc - 0.5).abs() < 0.05, "auc {}", auc);
}

#[test]
fn test_auc_is_bounded() {
    let p = [0.5f32; 6];
    let y = [1u8, 0, 1, 0, 1, 0];
    let auc = roc_auc(&p, &y);
    assert!((0.0..=1.0).contains(&auc));
}

// -----------------------------------------------------------------------------
// Evaluation
// -----------------------------------------------------------------------------

#[test]
fn test_threshold_is_inclusive() {
    let cm = ConfusionMatrix::from_probabilities(&[0.5, 0.49], &[1, 0], 0.5);
    assert_eq!(cm.tp, 1);
    assert_eq!(cm.tn, 1);
}

#[test]
fn test_evaluation_report() {
    let p = [0.8f32, 0.7, 0.4, 0.3, 0.6, 0.1];
    let y = [1u8, 1, 1, 0, 0, 0];
    let report = evaluate_probabilities(&p, &y, 0.5);
    assert_eq!(report.confusion.tp, 2);
    assert_eq!(report.confusion.fp, 1);
    assert_eq!(report.confusion.fn_, 1);
    assert_eq!(report.confusion.tn, 2);
    assert!((report.f1 - 2.0 / 3.0).abs() < 1e-9);
    // 8 of 9 positive/negative pairs ranked correctly
    assert!((report.auc - 8.0 / 9.0).abs() < 1e-9);
}

// -----------------------------------------------------------------------------
// Threshold optimizer
// -----------------------------------------------------------------------------

#[test]
fn test_optimizer_recovers_known_cut() {
    // Positives sit at or above 0.65, negatives below 0.6.
    let mut p = Vec::new();
    let mut y = Vec::new();
    for i in 0..20 {
        p.push(0.65 + i as f32 * 0.01);
        y.push(1u8);
        p.push(0.1 + i as f32 * 0.025);
        y.push(0u8);
    }
    let best = optimize_threshold(&p, &y);
    assert_eq!(best.f1, 1.0);
    assert!(best.threshold > 0.575 && best.threshold <= 0.65);
}

#[test]
fn test_optimizer_ties_keep_lowest_threshold() {
    // Every threshold in range classifies identically.
    let p = [0.95f32, 0.05];
    let y = [1u8, 0];
    let best = optimize_threshold(&p, &y);
    assert_eq!(best.f1, 1.0);
    assert!((best.threshold - 0.10).abs() < 1e-6);
}

#[test]
fn test_optimizer_without_positives() {
    let best = optimize_threshold(&[0.2, 0.4], &[0, 0]);
    assert_eq!(best.f1, 0.0);
    assert!((best.threshold - 0.10).abs() < 1e-6);
}
