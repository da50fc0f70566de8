//! Classification metrics, ROC-AUC, threshold scanning and training history.
use serde::{Deserialize, Serialize};

/// Floor on `precision + recall` when computing F1.
pub const F1_EPSILON: f64 = 1e-9;

/// Threshold scan bounds, in hundredths.
pub const SCAN_START: u32 = 10;
pub const SCAN_END: u32 = 90;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// A row is predicted positive iff its probability is `>= threshold`.
    pub fn from_probabilities(probabilities: &[f32], labels: &[u8], threshold: f32) -> Self {
        let mut cm = ConfusionMatrix::default();
        for (&p, &y) in probabilities.iter().zip(labels) {
            match (p >= threshold, y == 1) {
                (true, true) => cm.tp += 1,
                (true, false) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn precision(&self) -> f64 {
        self.tp as f64 / (self.tp + self.fp).max(1) as f64
    }

    pub fn recall(&self) -> f64 {
        self.tp as f64 / (self.tp + self.fn_).max(1) as f64
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        2.0 * p * r / (p + r).max(F1_EPSILON)
    }
}

/// ROC-AUC by ranking rows on descending probability.
///
/// Walks the sorted rows one at a time from (0, 0), emitting an (FPR, TPR)
/// point per row, and integrates with the trapezoidal rule. Tied
/// probabilities keep their input order.
pub fn roc_auc(probabilities: &[f32], labels: &[u8]) -> f64 {
    let mut order: Vec<usize> = (0..probabilities.len().min(labels.len())).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    let positives = order.iter().filter(|&&i| labels[i] == 1).count();
    let negatives = order.len() - positives;
    let (pos_den, neg_den) = (positives.max(1) as f64, negatives.max(1) as f64);

    let (mut tp, mut fp) = (0usize, 0usize);
    let (mut prev_fpr, mut prev_tpr) = (0.0f64, 0.0f64);
    let mut area = 0.0;
    for i in order {
        if labels[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let fpr = fp as f64 / neg_den;
        let tpr = tp as f64 / pos_den;
        area += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_fpr = fpr;
        prev_tpr = tpr;
    }
    area.clamp(0.0, 1.0)
}

/// Metrics for one decision threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub threshold: f32,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub auc: f64,
    pub confusion: ConfusionMatrix,
}

pub fn evaluate_probabilities(
    probabilities: &[f32],
    labels: &[u8],
    threshold: f32,
) -> EvaluationReport {
    let confusion = ConfusionMatrix::from_probabilities(probabilities, labels, threshold);
    EvaluationReport {
        threshold,
        precision: confusion.precision(),
        recall: confusion.recall(),
        f1: confusion.f1(),
        auc: roc_auc(probabilities, labels),
        confusion,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdChoice {
    pub threshold: f32,
    pub f1: f64,
}

/// Scan thresholds 0.10..=0.90 in steps of 0.01 and keep the one with the
/// strictly highest F1. Ties keep the lowest threshold.
pub fn optimize_threshold(probabilities: &[f32], labels: &[u8]) -> ThresholdChoice {
    let mut best = ThresholdChoice {
        threshold: SCAN_START as f32 / 100.0,
        f1: -1.0,
    };
    for hundredths in SCAN_START..=SCAN_END {
        let threshold = hundredths as f32 / 100.0;
        let f1 = ConfusionMatrix::from_probabilities(probabilities, labels, threshold).f1();
        log::trace!("threshold {:.2}: f1 {:.4}", threshold, f1);
        if f1 > best.f1 {
            best = ThresholdChoice { threshold, f1 };
        }
    }
    log::debug!(
        "Optimal threshold {:.2} (F1 {:.4})",
        best.threshold,
        best.f1
    );
    best
}

/// Losses for one completed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub loss: f32,
    pub val_loss: f32,
}

/// Append-only per-epoch loss history produced by `fit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochRecord>,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn push(&mut self, record: EpochRecord) {
        self.epochs.push(record);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// The epoch with the lowest validation loss.
    pub fn best(&self) -> Option<&EpochRecord> {
        self.epochs
            .iter()
            .min_by(|a, b| a.val_loss.total_cmp(&b.val_loss))
    }
}
